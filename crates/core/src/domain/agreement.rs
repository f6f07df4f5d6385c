use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::normalize;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Prepayment,
    Deferment,
}

impl PaymentType {
    pub const ALL: [Self; 2] = [Self::Prepayment, Self::Deferment];

    pub fn code(self) -> &'static str {
        match self {
            Self::Prepayment => "prepayment",
            Self::Deferment => "deferment",
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            Self::Prepayment => "Предоплата",
            Self::Deferment => "Отсрочка",
        }
    }

    pub fn summary_label(self) -> &'static str {
        match self {
            Self::Prepayment => "предоплата",
            Self::Deferment => "отсрочка",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|value| value.code() == code)
    }

    /// Accepts the machine code or the button label typed by hand.
    pub fn from_input(text: &str) -> Option<Self> {
        let normalized = normalize(text);
        Self::ALL.into_iter().find(|value| {
            normalized == value.code() || normalized == normalize(value.button_label())
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    Pickup,
    Delivery,
}

impl DeliveryType {
    pub const ALL: [Self; 2] = [Self::Pickup, Self::Delivery];

    pub fn code(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Delivery => "delivery",
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            Self::Pickup => "Самовывоз",
            Self::Delivery => "Доставка",
        }
    }

    pub fn summary_label(self) -> &'static str {
        match self {
            Self::Pickup => "самовывоз",
            Self::Delivery => "доставка",
        }
    }

    /// Incoterms-like basis clause inserted verbatim into the agreement.
    pub fn basis_clause(self) -> &'static str {
        match self {
            Self::Pickup => {
                "франко-автотранспортное средство Покупателя на складе Поставщика."
            }
            Self::Delivery => {
                "франко-автотранспортное средство Поставщика на складе Покупателя."
            }
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|value| value.code() == code)
    }

    pub fn from_input(text: &str) -> Option<Self> {
        let normalized = normalize(text);
        Self::ALL.into_iter().find(|value| {
            normalized == value.code() || normalized == normalize(value.button_label())
        })
    }
}

/// Answers collected so far in one dialogue. Each field is written by exactly
/// one step and stays `None` until that step has completed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSet {
    pub company_key: Option<String>,
    pub agreement_number: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub delivery_type: Option<DeliveryType>,
    pub agreement_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub product_key: Option<String>,
    pub tons: Option<u64>,
    pub price: Option<u64>,
    pub location_key: Option<String>,
    pub unload_address: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    pub company_key: String,
    pub agreement_number: String,
    pub payment_type: PaymentType,
    pub delivery_type: DeliveryType,
    pub agreement_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub payment_date: NaiveDate,
    pub product_key: String,
    pub tons: u64,
    pub price: u64,
    pub location_key: String,
    /// Present iff `delivery_type` is `Delivery`.
    pub unload_address: Option<String>,
}

impl FieldSet {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let checks: [(&'static str, bool); 11] = [
            ("company_key", self.company_key.is_some()),
            ("agreement_number", self.agreement_number.is_some()),
            ("payment_type", self.payment_type.is_some()),
            ("delivery_type", self.delivery_type.is_some()),
            ("agreement_date", self.agreement_date.is_some()),
            ("delivery_date", self.delivery_date.is_some()),
            ("payment_date", self.payment_date.is_some()),
            ("product_key", self.product_key.is_some()),
            ("tons", self.tons.is_some()),
            ("price", self.price.is_some()),
            ("location_key", self.location_key.is_some()),
        ];

        let mut missing: Vec<&'static str> =
            checks.into_iter().filter(|(_, present)| !present).map(|(name, _)| name).collect();

        if self.delivery_type == Some(DeliveryType::Delivery) && self.unload_address.is_none() {
            missing.push("unload_address");
        }
        missing
    }

    pub fn complete(&self) -> Result<Agreement, DomainError> {
        let missing = self.missing_fields();
        let (
            Some(company_key),
            Some(agreement_number),
            Some(payment_type),
            Some(delivery_type),
            Some(agreement_date),
            Some(delivery_date),
            Some(payment_date),
            Some(product_key),
            Some(tons),
            Some(price),
            Some(location_key),
        ) = (
            self.company_key.clone(),
            self.agreement_number.clone(),
            self.payment_type,
            self.delivery_type,
            self.agreement_date,
            self.delivery_date,
            self.payment_date,
            self.product_key.clone(),
            self.tons,
            self.price,
            self.location_key.clone(),
        )
        else {
            return Err(DomainError::MissingFields { missing });
        };

        if !missing.is_empty() {
            return Err(DomainError::MissingFields { missing });
        }

        let unload_address = match delivery_type {
            DeliveryType::Delivery => self.unload_address.clone(),
            DeliveryType::Pickup => None,
        };

        Ok(Agreement {
            company_key,
            agreement_number,
            payment_type,
            delivery_type,
            agreement_date,
            delivery_date,
            payment_date,
            product_key,
            tons,
            price,
            location_key,
            unload_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{DeliveryType, FieldSet, PaymentType};
    use crate::errors::DomainError;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn filled(delivery_type: DeliveryType) -> FieldSet {
        FieldSet {
            company_key: Some("sib".to_owned()),
            agreement_number: Some("12".to_owned()),
            payment_type: Some(PaymentType::Prepayment),
            delivery_type: Some(delivery_type),
            agreement_date: Some(date(2024, 6, 1)),
            delivery_date: Some(date(2024, 6, 15)),
            payment_date: Some(date(2024, 6, 1)),
            product_key: Some("дтл".to_owned()),
            tons: Some(25),
            price: Some(62_500),
            location_key: Some("база1".to_owned()),
            unload_address: None,
        }
    }

    #[test]
    fn payment_and_delivery_accept_codes_and_labels() {
        assert_eq!(PaymentType::from_input("prepayment"), Some(PaymentType::Prepayment));
        assert_eq!(PaymentType::from_input("  ОТСРОЧКА "), Some(PaymentType::Deferment));
        assert_eq!(PaymentType::from_input("bank transfer"), None);
        assert_eq!(DeliveryType::from_input("Самовывоз"), Some(DeliveryType::Pickup));
        assert_eq!(DeliveryType::from_code("delivery"), Some(DeliveryType::Delivery));
        assert_eq!(DeliveryType::from_code("Delivery"), None);
    }

    #[test]
    fn complete_pickup_agreement_has_no_unload_address() {
        let mut fields = filled(DeliveryType::Pickup);
        fields.unload_address = Some("ignored".to_owned());

        let agreement = fields.complete().expect("all pickup fields are present");
        assert_eq!(agreement.tons, 25);
        assert_eq!(agreement.unload_address, None);
    }

    #[test]
    fn delivery_requires_unload_address() {
        let fields = filled(DeliveryType::Delivery);

        let error = fields.complete().expect_err("delivery without address must fail");
        assert_eq!(error, DomainError::MissingFields { missing: vec!["unload_address"] });

        let mut fields = fields;
        fields.unload_address = Some("г. Омск, ул. Заводская, 1".to_owned());
        let agreement = fields.complete().expect("address supplied");
        assert_eq!(agreement.unload_address.as_deref(), Some("г. Омск, ул. Заводская, 1"));
    }

    #[test]
    fn empty_field_set_reports_every_required_field() {
        let fields = FieldSet::default();
        assert!(fields.is_empty());

        let DomainError::MissingFields { missing } =
            fields.complete().expect_err("nothing collected yet")
        else {
            panic!("expected missing fields error");
        };
        assert_eq!(missing.len(), 11);
        assert_eq!(missing.first(), Some(&"company_key"));
        assert_eq!(missing.last(), Some(&"location_key"));
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::dates::{format_delivery_term, format_long, format_long_plain, format_short};
use crate::domain::{Agreement, DeliveryType, PaymentType};
use crate::numbers::amount_with_words;

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const FALLBACK_FILE_NAME: &str = "document.html";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    Prepayment,
    DefermentPay,
    PrepaymentDelivery,
    DefermentDelivery,
}

impl TemplateId {
    pub const ALL: [Self; 4] =
        [Self::Prepayment, Self::DefermentPay, Self::PrepaymentDelivery, Self::DefermentDelivery];

    pub fn select(payment: PaymentType, delivery: DeliveryType) -> Self {
        match (payment, delivery) {
            (PaymentType::Prepayment, DeliveryType::Pickup) => Self::Prepayment,
            (PaymentType::Deferment, DeliveryType::Pickup) => Self::DefermentPay,
            (PaymentType::Prepayment, DeliveryType::Delivery) => Self::PrepaymentDelivery,
            (PaymentType::Deferment, DeliveryType::Delivery) => Self::DefermentDelivery,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Prepayment => "prepayment",
            Self::DefermentPay => "deferment_pay",
            Self::PrepaymentDelivery => "prepayment_delivery",
            Self::DefermentDelivery => "deferment_delivery",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.html.tera", self.name())
    }
}

/// Context handed to the document template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFields {
    pub dop_num: String,
    pub contract: String,
    pub current_date: String,
    pub company_name: String,
    pub director_position: String,
    pub director_fio: String,
    pub delivery_month_year: String,
    pub product_name: String,
    pub tons_full: String,
    pub price_full: String,
    pub basis_full: String,
    pub location_full: String,
    pub pay_date: String,
    pub initials: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unload_address: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedContent {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedDocument {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("template `{0}` not found")]
    TemplateNotFound(String),
    #[error("template rendering failed: {0}")]
    Template(String),
    #[error("{kind} `{key}` is no longer in the catalog")]
    MissingCatalogEntry { kind: &'static str, key: String },
    #[error("document staging failed: {0}")]
    Io(String),
}

pub trait DocumentRenderer: Send + Sync {
    fn render(
        &self,
        template: TemplateId,
        fields: &DocumentFields,
    ) -> Result<RenderedContent, RenderError>;
}

pub fn build_document_fields(
    agreement: &Agreement,
    catalog: &Catalog,
) -> Result<DocumentFields, RenderError> {
    let client = catalog.client(&agreement.company_key).ok_or_else(|| {
        RenderError::MissingCatalogEntry { kind: "client", key: agreement.company_key.clone() }
    })?;
    let product_name = catalog.product_label(&agreement.product_key).ok_or_else(|| {
        RenderError::MissingCatalogEntry { kind: "product", key: agreement.product_key.clone() }
    })?;
    let location_full = catalog.location_label(&agreement.location_key).ok_or_else(|| {
        RenderError::MissingCatalogEntry { kind: "location", key: agreement.location_key.clone() }
    })?;

    let delivered = agreement.delivery_type == DeliveryType::Delivery;

    Ok(DocumentFields {
        dop_num: agreement.agreement_number.clone(),
        contract: normalize_contract(&client.contract),
        current_date: format_long(agreement.agreement_date),
        company_name: client.company_name.clone(),
        director_position: client.director_position.clone(),
        director_fio: client.director_fio.clone(),
        delivery_month_year: format_delivery_term(agreement.delivery_date, delivered),
        product_name: product_name.to_owned(),
        tons_full: amount_with_words(agreement.tons),
        price_full: amount_with_words(agreement.price),
        basis_full: agreement.delivery_type.basis_clause().to_owned(),
        location_full: location_full.to_owned(),
        pay_date: format_short(agreement.payment_date),
        initials: client.initials.clone(),
        unload_address: if delivered { agreement.unload_address.clone() } else { None },
    })
}

/// `5 марта 2024_Доп_соглашение_№12_дтл_sib.html`, made safe for any filesystem.
pub fn output_file_name(agreement: &Agreement) -> String {
    sanitize_filename(&format!(
        "{}_Доп_соглашение_№{}_{}_{}.html",
        format_long_plain(agreement.agreement_date),
        agreement.agreement_number,
        agreement.product_key,
        agreement.company_key,
    ))
}

pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|ch| match ch {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            ch if (ch as u32) < 0x20 => '_',
            ch => ch,
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches(|ch| ch == ' ' || ch == '.');

    if trimmed.is_empty() {
        FALLBACK_FILE_NAME.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Drops a leading `№` from contract numbers; templates add their own.
pub fn normalize_contract(raw: &str) -> String {
    let contract = raw.trim();
    contract.strip_prefix('№').map(str::trim).unwrap_or(contract).to_owned()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{
        build_document_fields, normalize_contract, output_file_name, sanitize_filename,
        RenderError, TemplateId,
    };
    use crate::catalog::fixtures::sample_catalog;
    use crate::domain::{Agreement, DeliveryType, PaymentType};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn agreement(delivery_type: DeliveryType) -> Agreement {
        Agreement {
            company_key: "sib".to_owned(),
            agreement_number: "12".to_owned(),
            payment_type: PaymentType::Deferment,
            delivery_type,
            agreement_date: date(2024, 3, 5),
            delivery_date: date(2024, 6, 15),
            payment_date: date(2024, 7, 1),
            product_key: "дтл".to_owned(),
            tons: 25,
            price: 62_500,
            location_key: "база1".to_owned(),
            unload_address: match delivery_type {
                DeliveryType::Delivery => Some("г. Омск, ул. Заводская, 1".to_owned()),
                DeliveryType::Pickup => None,
            },
        }
    }

    #[test]
    fn template_selection_covers_all_combinations() {
        assert_eq!(
            TemplateId::select(PaymentType::Prepayment, DeliveryType::Pickup).name(),
            "prepayment"
        );
        assert_eq!(
            TemplateId::select(PaymentType::Deferment, DeliveryType::Pickup).name(),
            "deferment_pay"
        );
        assert_eq!(
            TemplateId::select(PaymentType::Prepayment, DeliveryType::Delivery).name(),
            "prepayment_delivery"
        );
        assert_eq!(
            TemplateId::select(PaymentType::Deferment, DeliveryType::Delivery).file_name(),
            "deferment_delivery.html.tera"
        );
    }

    #[test]
    fn pickup_fields_are_formatted_in_russian() {
        let catalog = sample_catalog();
        let fields =
            build_document_fields(&agreement(DeliveryType::Pickup), &catalog).expect("fields");

        assert_eq!(fields.contract, "15/2023");
        assert_eq!(fields.current_date, "5 марта 2024 г.");
        assert_eq!(fields.delivery_month_year, "15 июня 2024 года");
        assert_eq!(fields.tons_full, "25 (двадцать пять)");
        assert_eq!(fields.price_full, "62 500 (шестьдесят две тысячи пятьсот)");
        assert_eq!(
            fields.basis_full,
            "франко-автотранспортное средство Покупателя на складе Поставщика."
        );
        assert_eq!(fields.location_full, "Нефтебаза №1, г. Омск");
        assert_eq!(fields.pay_date, "01.07.2024");
        assert_eq!(fields.unload_address, None);
    }

    #[test]
    fn delivery_fields_carry_deadline_and_address() {
        let catalog = sample_catalog();
        let fields =
            build_document_fields(&agreement(DeliveryType::Delivery), &catalog).expect("fields");

        assert_eq!(fields.delivery_month_year, "до 15 июня 2024 года");
        assert_eq!(fields.unload_address.as_deref(), Some("г. Омск, ул. Заводская, 1"));
        assert!(fields.basis_full.contains("Поставщика на складе Покупателя"));
    }

    #[test]
    fn unknown_catalog_key_is_a_render_error() {
        let catalog = sample_catalog();
        let mut agreement = agreement(DeliveryType::Pickup);
        agreement.product_key = "мазут".to_owned();

        let error = build_document_fields(&agreement, &catalog).expect_err("must fail");
        assert_eq!(
            error,
            RenderError::MissingCatalogEntry { kind: "product", key: "мазут".to_owned() }
        );
    }

    #[test]
    fn file_name_is_built_from_keys_and_sanitized() {
        let mut agreement = agreement(DeliveryType::Pickup);
        assert_eq!(
            output_file_name(&agreement),
            "5 марта 2024_Доп_соглашение_№12_дтл_sib.html"
        );

        agreement.agreement_number = "7/2 ".to_owned();
        assert_eq!(
            output_file_name(&agreement),
            "5 марта 2024_Доп_соглашение_№7_2 _дтл_sib.html"
        );
    }

    #[test]
    fn sanitize_handles_control_chars_and_empty_names() {
        assert_eq!(sanitize_filename("a<b>c:d\"e|f?g*h"), "a_b_c_d_e_f_g_h");
        assert_eq!(sanitize_filename("line\u{1}break"), "line_break");
        assert_eq!(sanitize_filename("  many   spaces . "), "many spaces");
        assert_eq!(sanitize_filename(" ..  "), "document.html");
    }

    #[test]
    fn contract_prefix_is_stripped() {
        assert_eq!(normalize_contract("№ 15/2023"), "15/2023");
        assert_eq!(normalize_contract(" №7-П"), "7-П");
        assert_eq!(normalize_contract("7-П"), "7-П");
    }
}

pub mod agreement;

pub use agreement::{Agreement, DeliveryType, FieldSet, PaymentType};

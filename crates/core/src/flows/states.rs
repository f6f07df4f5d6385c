use serde::{Deserialize, Serialize};

use crate::errors::StepError;
use crate::render::RenderedDocument;

pub const MENU_BUTTON: &str = "Создать допсоглашение";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialogueStep {
    #[default]
    Start,
    MenuConfirm,
    CompanyInput,
    CompanySelect,
    AgreementNumber,
    PaymentType,
    DeliveryType,
    CurrentDate,
    DeliveryDate,
    PayDate,
    ProductInput,
    ProductSelect,
    Tons,
    Price,
    LocationInput,
    LocationSelect,
    UnloadAddress,
    Confirm,
}

impl DialogueStep {
    pub fn name(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::MenuConfirm => "MENU_CONFIRM",
            Self::CompanyInput => "COMPANY_INPUT",
            Self::CompanySelect => "COMPANY_SELECT",
            Self::AgreementNumber => "AGREEMENT_NUMBER",
            Self::PaymentType => "PAYMENT_TYPE",
            Self::DeliveryType => "DELIVERY_TYPE",
            Self::CurrentDate => "CURRENT_DATE",
            Self::DeliveryDate => "DELIVERY_DATE",
            Self::PayDate => "PAY_DATE",
            Self::ProductInput => "PRODUCT_INPUT",
            Self::ProductSelect => "PRODUCT_SELECT",
            Self::Tons => "TONS",
            Self::Price => "PRICE",
            Self::LocationInput => "LOCATION_INPUT",
            Self::LocationSelect => "LOCATION_SELECT",
            Self::UnloadAddress => "UNLOAD_ADDRESS",
            Self::Confirm => "CONFIRM",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Start,
    Cancel,
}

impl Command {
    /// Recognizes `/start` and `/cancel`, including the `@botname` suffix
    /// Telegram appends in group chats.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        match name {
            "start" => Some(Self::Start),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceKind {
    Company,
    Product,
    Location,
    Payment,
    Delivery,
    Confirm,
}

impl ChoiceKind {
    pub const ALL: [Self; 6] = [
        Self::Company,
        Self::Product,
        Self::Location,
        Self::Payment,
        Self::Delivery,
        Self::Confirm,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Product => "product",
            Self::Location => "location",
            Self::Payment => "payment",
            Self::Delivery => "delivery",
            Self::Confirm => "confirm",
        }
    }
}

/// Payload carried by an inline button, encoded as `<kind>:<value>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceData {
    pub kind: ChoiceKind,
    pub value: String,
}

impl ChoiceData {
    pub fn new(kind: ChoiceKind, value: impl Into<String>) -> Self {
        Self { kind, value: value.into() }
    }

    pub fn encode(&self) -> String {
        format!("{}:{}", self.kind.prefix(), self.value)
    }

    pub fn parse(data: &str) -> Option<Self> {
        let (prefix, value) = data.split_once(':')?;
        let kind = ChoiceKind::ALL.into_iter().find(|kind| kind.prefix() == prefix)?;
        Some(Self { kind, value: value.to_owned() })
    }
}

pub const CONFIRM_GENERATE: &str = "generate";
pub const CONFIRM_CANCEL: &str = "cancel";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserAction {
    Command(Command),
    Text(String),
    Choice(ChoiceData),
}

impl UserAction {
    pub fn from_text(text: &str) -> Self {
        match Command::parse(text) {
            Some(command) => Self::Command(command),
            None => Self::Text(text.to_owned()),
        }
    }

    /// `None` for payloads this bot never issues.
    pub fn from_callback(data: &str) -> Option<Self> {
        ChoiceData::parse(data).map(Self::Choice)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Command(_) => "command",
            Self::Text(_) => "text",
            Self::Choice(_) => "choice",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceOption {
    pub label: String,
    pub data: ChoiceData,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, data: ChoiceData) -> Self {
        Self { label: label.into(), data }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Keyboard {
    None,
    /// Persistent reply keyboard with one button.
    Menu(String),
    RemoveMenu,
    Choices(Vec<ChoiceOption>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Message { text: String, keyboard: Keyboard },
    /// Rewrites the message whose button was pressed. Sent as a plain message
    /// when the action did not come from a button.
    ReplaceSource(String),
    Document(RenderedDocument),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Message { text: text.into(), keyboard: Keyboard::None }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::Message { text: text.into(), keyboard }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    Generated { file_name: String },
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    pub from: DialogueStep,
    pub to: DialogueStep,
    pub replies: Vec<Reply>,
    pub completion: Option<Completion>,
    pub error: Option<StepError>,
}

#[cfg(test)]
mod tests {
    use super::{ChoiceData, ChoiceKind, Command, UserAction};

    #[test]
    fn commands_accept_bot_suffix_and_arguments() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse(" /cancel@dopgen_bot now"), Some(Command::Cancel));
        assert_eq!(Command::parse("/help"), None);
        assert_eq!(Command::parse("start"), None);
    }

    #[test]
    fn choice_payload_keeps_colons_in_value() {
        let data = ChoiceData::new(ChoiceKind::Location, "склад:3");
        assert_eq!(data.encode(), "location:склад:3");
        assert_eq!(ChoiceData::parse("location:склад:3"), Some(data));
        assert_eq!(ChoiceData::parse("unknown:x"), None);
        assert_eq!(ChoiceData::parse("no-separator"), None);
    }

    #[test]
    fn text_that_looks_like_a_command_becomes_one() {
        assert_eq!(UserAction::from_text("/start"), UserAction::Command(Command::Start));
        assert_eq!(UserAction::from_text("сиб, 12"), UserAction::Text("сиб, 12".to_owned()));
        assert_eq!(UserAction::from_text("/start").kind(), "command");
    }
}

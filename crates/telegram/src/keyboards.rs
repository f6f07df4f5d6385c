use dopgen_core::flows::{ChoiceOption, Keyboard};
use serde::Serialize;
use tracing::warn;

pub const BUTTON_LABEL_LIMIT: usize = 60;
/// Bot API limit for `callback_data`, in bytes.
pub const CALLBACK_DATA_LIMIT: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Inline {
        inline_keyboard: Vec<Vec<InlineButton>>,
    },
    Reply {
        keyboard: Vec<Vec<KeyboardButton>>,
        resize_keyboard: bool,
        is_persistent: bool,
    },
    Remove {
        remove_keyboard: bool,
    },
}

impl ReplyMarkup {
    pub fn menu(label: impl Into<String>) -> Self {
        Self::Reply {
            keyboard: vec![vec![KeyboardButton { text: label.into() }]],
            resize_keyboard: true,
            is_persistent: true,
        }
    }

    pub fn remove() -> Self {
        Self::Remove { remove_keyboard: true }
    }

    /// One button per row, in the order given.
    pub fn choices(options: &[ChoiceOption]) -> Self {
        let rows = options
            .iter()
            .filter_map(|option| {
                let callback_data = option.data.encode();
                if callback_data.len() > CALLBACK_DATA_LIMIT {
                    warn!(
                        event_name = "egress.telegram.button_skipped",
                        callback_data = %callback_data,
                        "callback data exceeds the bot api limit; button not offered"
                    );
                    return None;
                }
                Some(vec![InlineButton { text: button_label(&option.label), callback_data }])
            })
            .collect();

        Self::Inline { inline_keyboard: rows }
    }
}

pub fn reply_markup(keyboard: &Keyboard) -> Option<ReplyMarkup> {
    match keyboard {
        Keyboard::None => None,
        Keyboard::Menu(label) => Some(ReplyMarkup::menu(label.clone())),
        Keyboard::RemoveMenu => Some(ReplyMarkup::remove()),
        Keyboard::Choices(options) => Some(ReplyMarkup::choices(options)),
    }
}

/// Labels longer than the limit keep their first 57 characters plus `...`.
pub fn button_label(label: &str) -> String {
    if label.chars().count() <= BUTTON_LABEL_LIMIT {
        return label.to_owned();
    }
    let mut truncated: String = label.chars().take(BUTTON_LABEL_LIMIT - 3).collect();
    truncated.push_str("...");
    truncated
}

//! Bot API wire types. Only the fields the bot reads are modelled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::events::{CallbackQueryEvent, MessageEvent, TelegramEvent, TelegramUpdate};
use crate::keyboards::ReplyMarkup;

/// Envelope every Bot API method answers with.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// Absent when the originating message is too old to be delivered.
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl From<Update> for TelegramUpdate {
    fn from(update: Update) -> Self {
        let event = if let Some(message) = update.message {
            TelegramEvent::Message(MessageEvent {
                chat_id: message.chat.id,
                message_id: message.message_id,
                user_id: message.from.map(|user| user.id),
                text: message.text,
            })
        } else if let Some(query) = update.callback_query {
            TelegramEvent::CallbackQuery(CallbackQueryEvent {
                callback_id: query.id,
                user_id: query.from.id,
                chat_id: query.message.as_ref().map(|message| message.chat.id),
                message_id: query.message.as_ref().map(|message| message.message_id),
                data: query.data,
            })
        } else {
            let kind = update.other.keys().next().cloned().unwrap_or_else(|| "empty".to_owned());
            TelegramEvent::Unsupported { kind }
        };

        TelegramUpdate { update_id: update.update_id, event }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct GetUpdatesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: &'a [&'a str],
}

pub const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

#[derive(Clone, Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<&'a ReplyMarkup>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EditMessageTextRequest<'a> {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnswerCallbackQueryRequest<'a> {
    pub callback_query_id: &'a str,
}

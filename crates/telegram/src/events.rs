use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use dopgen_core::{ChatId, SessionStoreError};
use thiserror::Error;

use crate::client::ChatClientError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub event: TelegramEvent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelegramEvent {
    Message(MessageEvent),
    CallbackQuery(CallbackQueryEvent),
    Unsupported { kind: String },
}

impl TelegramEvent {
    pub fn event_type(&self) -> TelegramEventType {
        match self {
            Self::Message(_) => TelegramEventType::Message,
            Self::CallbackQuery(_) => TelegramEventType::CallbackQuery,
            Self::Unsupported { .. } => TelegramEventType::Unsupported,
        }
    }

    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            Self::Message(event) => Some(event.chat_id),
            Self::CallbackQuery(event) => event.chat_id,
            Self::Unsupported { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TelegramEventType {
    Message,
    CallbackQuery,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEvent {
    pub chat_id: ChatId,
    pub message_id: i64,
    pub user_id: Option<i64>,
    /// `None` for stickers, photos and other non-text messages.
    pub text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackQueryEvent {
    pub callback_id: String,
    pub user_id: i64,
    pub chat_id: Option<ChatId>,
    pub message_id: Option<i64>,
    pub data: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl EventContext {
    pub fn for_update(update: &TelegramUpdate) -> Self {
        Self { correlation_id: format!("update-{}", update.update_id) }
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    /// Number of replies delivered to the chat.
    Responded(usize),
    Processed,
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventHandlerError {
    #[error(transparent)]
    Session(#[from] SessionStoreError),
    #[error(transparent)]
    Delivery(#[from] ChatClientError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> TelegramEventType;
    async fn handle(
        &self,
        update: &TelegramUpdate,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<TelegramEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        update: &TelegramUpdate,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&update.event.event_type()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(update, ctx).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

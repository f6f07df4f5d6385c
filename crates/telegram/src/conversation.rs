use std::sync::Arc;

use async_trait::async_trait;
use dopgen_core::flows::Completion;
use dopgen_core::{ChatId, DialogueEngine, Reply, Session, SessionStore, UserAction};
use tracing::{info, warn};

use crate::client::{ChatClient, ChatClientError};
use crate::events::{
    CallbackQueryEvent, EventContext, EventDispatcher, EventHandler, EventHandlerError,
    HandlerResult, MessageEvent, TelegramEvent, TelegramEventType, TelegramUpdate,
};
use crate::keyboards::reply_markup;

const DOCUMENT_FAILED_PREFIX: &str = "Ошибка генерации документа";
const RETRY_HINT: &str = "Данные сохранены, нажмите «Сгенерировать» ещё раз.";

/// Runs one chat turn per event: load the session, let the engine consume the
/// action, persist the result, deliver the replies. A generated document is
/// sent before anything is persisted.
pub struct ConversationService {
    engine: Arc<DialogueEngine>,
    sessions: Arc<dyn SessionStore>,
    chat: Arc<dyn ChatClient>,
}

impl ConversationService {
    pub fn new(
        engine: Arc<DialogueEngine>,
        sessions: Arc<dyn SessionStore>,
        chat: Arc<dyn ChatClient>,
    ) -> Self {
        Self { engine, sessions, chat }
    }

    pub async fn handle_message(
        &self,
        event: &MessageEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let Some(text) = event.text.as_deref() else {
            return Ok(HandlerResult::Ignored);
        };

        let delivered = self.run_turn(event.chat_id, UserAction::from_text(text), None, ctx).await?;
        Ok(HandlerResult::Responded(delivered))
    }

    pub async fn handle_callback(
        &self,
        event: &CallbackQueryEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        if let Err(error) = self.chat.answer_callback_query(&event.callback_id).await {
            warn!(
                event_name = "egress.telegram.callback_answered",
                correlation_id = %ctx.correlation_id,
                callback_id = %event.callback_id,
                error = %error,
                "failed to answer callback query"
            );
        }

        let Some(chat_id) = event.chat_id else {
            return Ok(HandlerResult::Ignored);
        };
        let Some(action) = event.data.as_deref().and_then(UserAction::from_callback) else {
            warn!(
                correlation_id = %ctx.correlation_id,
                chat_id,
                data = event.data.as_deref().unwrap_or(""),
                "unrecognized callback data ignored"
            );
            return Ok(HandlerResult::Ignored);
        };

        let delivered = self.run_turn(chat_id, action, event.message_id, ctx).await?;
        Ok(HandlerResult::Responded(delivered))
    }

    async fn run_turn(
        &self,
        chat_id: ChatId,
        action: UserAction,
        source_message: Option<i64>,
        ctx: &EventContext,
    ) -> Result<usize, EventHandlerError> {
        let mut session = self.sessions.load(chat_id).await?;
        let previous = session.clone();
        let outcome = self.engine.handle(&mut session, &action);

        info!(
            event_name = "conversation.turn_completed",
            correlation_id = %ctx.correlation_id,
            chat_id,
            action = action.kind(),
            from_step = outcome.from.name(),
            step = outcome.to.name(),
            error_kind = outcome.error.as_ref().map(|error| error.kind()).unwrap_or("none"),
            "dialogue turn completed"
        );

        let (documents, replies): (Vec<&Reply>, Vec<&Reply>) =
            outcome.replies.iter().partition(|reply| matches!(reply, Reply::Document(_)));

        // The confirmed form is only dropped once the document reached the chat.
        for document in &documents {
            if let Err(error) = self.deliver_one(chat_id, document, source_message).await {
                warn!(
                    event_name = "conversation.document_delivery_failed",
                    correlation_id = %ctx.correlation_id,
                    chat_id,
                    error = %error,
                    "document delivery failed, confirmation kept"
                );
                self.sessions.save(chat_id, previous).await?;
                let text = format!("{DOCUMENT_FAILED_PREFIX}: {error}. {RETRY_HINT}");
                self.chat.send_message(chat_id, &text, None).await?;
                return Ok(1);
            }
        }

        match &outcome.completion {
            Some(Completion::Generated { file_name }) => info!(
                event_name = "conversation.document_generated",
                correlation_id = %ctx.correlation_id,
                chat_id,
                file_name = %file_name,
                "agreement document generated"
            ),
            Some(Completion::Cancelled) => info!(
                event_name = "conversation.cancelled",
                correlation_id = %ctx.correlation_id,
                chat_id,
                "dialogue cancelled"
            ),
            None => {}
        }

        if session == Session::default() {
            self.sessions.discard(chat_id).await?;
        } else {
            self.sessions.save(chat_id, session).await?;
        }

        for reply in replies {
            self.deliver_one(chat_id, reply, source_message).await?;
        }
        Ok(outcome.replies.len())
    }

    async fn deliver_one(
        &self,
        chat_id: ChatId,
        reply: &Reply,
        source_message: Option<i64>,
    ) -> Result<(), ChatClientError> {
        match reply {
            Reply::Message { text, keyboard } => {
                let markup = reply_markup(keyboard);
                self.chat.send_message(chat_id, text, markup.as_ref()).await?;
            }
            Reply::ReplaceSource(text) => match source_message {
                Some(message_id) => self.chat.edit_message_text(chat_id, message_id, text).await?,
                None => {
                    self.chat.send_message(chat_id, text, None).await?;
                }
            },
            Reply::Document(document) => self.chat.send_document(chat_id, document).await?,
        }
        Ok(())
    }
}

pub struct MessageHandler {
    service: Arc<ConversationService>,
}

impl MessageHandler {
    pub fn new(service: Arc<ConversationService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl EventHandler for MessageHandler {
    fn event_type(&self) -> TelegramEventType {
        TelegramEventType::Message
    }

    async fn handle(
        &self,
        update: &TelegramUpdate,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let TelegramEvent::Message(event) = &update.event else {
            return Ok(HandlerResult::Ignored);
        };
        self.service.handle_message(event, ctx).await
    }
}

pub struct CallbackQueryHandler {
    service: Arc<ConversationService>,
}

impl CallbackQueryHandler {
    pub fn new(service: Arc<ConversationService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl EventHandler for CallbackQueryHandler {
    fn event_type(&self) -> TelegramEventType {
        TelegramEventType::CallbackQuery
    }

    async fn handle(
        &self,
        update: &TelegramUpdate,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let TelegramEvent::CallbackQuery(event) = &update.event else {
            return Ok(HandlerResult::Ignored);
        };
        self.service.handle_callback(event, ctx).await
    }
}

pub fn conversation_dispatcher(service: Arc<ConversationService>) -> EventDispatcher {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(MessageHandler::new(service.clone()));
    dispatcher.register(CallbackQueryHandler::new(service));
    dispatcher
}

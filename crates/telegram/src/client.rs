use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dopgen_core::config::TelegramConfig;
use dopgen_core::{ChatId, RenderedDocument};
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::api::{
    AnswerCallbackQueryRequest, ApiResponse, EditMessageTextRequest, GetUpdatesRequest, Message,
    SendMessageRequest, Update, User, ALLOWED_UPDATES,
};
use crate::events::TelegramUpdate;
use crate::keyboards::ReplyMarkup;
use crate::polling::{TransportError, UpdateSource};

/// Extra time on top of the long-poll timeout before the HTTP request gives up.
const POLL_GRACE_SECS: u64 = 10;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChatClientError {
    #[error("telegram request failed: {0}")]
    Http(String),
    #[error("telegram method `{method}` rejected ({code:?}): {description}")]
    Api { method: &'static str, code: Option<i64>, description: String },
    #[error("telegram response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ChatClientError {
    fn from(error: reqwest::Error) -> Self {
        // Request URLs embed the bot token.
        Self::Http(error.without_url().to_string())
    }
}

/// Outgoing side of a chat: everything the conversation service needs to reply.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Returns the id of the sent message.
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<i64, ChatClientError>;
    async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: i64,
        text: &str,
    ) -> Result<(), ChatClientError>;
    async fn answer_callback_query(&self, callback_id: &str) -> Result<(), ChatClientError>;
    async fn send_document(
        &self,
        chat_id: ChatId,
        document: &RenderedDocument,
    ) -> Result<(), ChatClientError>;
}

pub struct BotApiClient {
    http: reqwest::Client,
    method_base: String,
    poll_timeout_secs: u64,
    /// Next `getUpdates` offset; zero until the first update is acknowledged.
    offset: AtomicI64,
}

impl BotApiClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, ChatClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + POLL_GRACE_SECS))
            .build()?;
        let method_base = format!(
            "{}/bot{}",
            config.api_base_url.trim_end_matches('/'),
            config.bot_token.expose_secret()
        );

        Ok(Self {
            http,
            method_base,
            poll_timeout_secs: config.poll_timeout_secs,
            offset: AtomicI64::new(0),
        })
    }

    pub fn offset(&self) -> i64 {
        self.offset.load(Ordering::SeqCst)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.method_base)
    }

    async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T, ChatClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!(event_name = "egress.telegram.request", method, "calling telegram method");
        let response = self.http.post(self.method_url(method)).json(body).send().await?;
        Self::decode(method, response).await
    }

    async fn decode<T>(
        method: &'static str,
        response: reqwest::Response,
    ) -> Result<T, ChatClientError>
    where
        T: DeserializeOwned,
    {
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|error| ChatClientError::Decode(error.without_url().to_string()))?;

        if !envelope.ok {
            return Err(ChatClientError::Api {
                method,
                code: envelope.error_code,
                description: envelope.description.unwrap_or_else(|| "no description".to_owned()),
            });
        }

        envelope.result.ok_or_else(|| {
            ChatClientError::Decode(format!("`{method}` returned ok without result"))
        })
    }

    pub async fn get_me(&self) -> Result<User, ChatClientError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    pub async fn get_updates(&self) -> Result<Vec<TelegramUpdate>, ChatClientError> {
        let offset = self.offset();
        let request = GetUpdatesRequest {
            offset: (offset > 0).then_some(offset),
            timeout: self.poll_timeout_secs,
            allowed_updates: ALLOWED_UPDATES,
        };
        let updates: Vec<Update> = self.call("getUpdates", &request).await?;
        Ok(updates.into_iter().map(TelegramUpdate::from).collect())
    }
}

#[async_trait]
impl ChatClient for BotApiClient {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<i64, ChatClientError> {
        let request = SendMessageRequest { chat_id, text, reply_markup: markup };
        let message: Message = self.call("sendMessage", &request).await?;
        Ok(message.message_id)
    }

    async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: i64,
        text: &str,
    ) -> Result<(), ChatClientError> {
        let request = EditMessageTextRequest { chat_id, message_id, text };
        let _: serde_json::Value = self.call("editMessageText", &request).await?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<(), ChatClientError> {
        let request = AnswerCallbackQueryRequest { callback_query_id: callback_id };
        let _: bool = self.call("answerCallbackQuery", &request).await?;
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        document: &RenderedDocument,
    ) -> Result<(), ChatClientError> {
        let part = Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone())
            .mime_str(&document.content_type)?;
        let form = Form::new().text("chat_id", chat_id.to_string()).part("document", part);

        debug!(
            event_name = "egress.telegram.request",
            method = "sendDocument",
            file_name = %document.file_name,
            size = document.bytes.len(),
            "uploading document"
        );
        let response =
            self.http.post(self.method_url("sendDocument")).multipart(form).send().await?;
        let _: Message = Self::decode("sendDocument", response).await?;
        Ok(())
    }
}

#[async_trait]
impl UpdateSource for BotApiClient {
    async fn connect(&self) -> Result<(), TransportError> {
        let me = self.get_me().await.map_err(|error| TransportError::Connect(error.to_string()))?;
        info!(
            event_name = "ingress.telegram.connected",
            bot_id = me.id,
            bot_username = me.username.as_deref().unwrap_or("unknown"),
            "telegram bot identity confirmed"
        );
        Ok(())
    }

    async fn next_batch(&self) -> Result<Option<Vec<TelegramUpdate>>, TransportError> {
        self.get_updates()
            .await
            .map(Some)
            .map_err(|error| TransportError::Receive(error.to_string()))
    }

    async fn acknowledge(&self, update_id: i64) -> Result<(), TransportError> {
        self.offset.fetch_max(update_id + 1, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

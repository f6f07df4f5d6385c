use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::{EventContext, EventDispatcher, TelegramUpdate};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("update source failed to connect: {0}")]
    Connect(String),
    #[error("update poll failed: {0}")]
    Receive(String),
    #[error("update ack failed: {0}")]
    Acknowledge(String),
    #[error("update source disconnect failed: {0}")]
    Disconnect(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// A stream of bot updates. Acknowledging an update confirms it so the
/// next batch starts after it.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    /// `Ok(None)` once the source is closed; an empty batch means the poll
    /// timed out without updates.
    async fn next_batch(&self) -> Result<Option<Vec<TelegramUpdate>>, TransportError>;
    async fn acknowledge(&self, update_id: i64) -> Result<(), TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

pub struct PollingRunner {
    source: Arc<dyn UpdateSource>,
    dispatcher: EventDispatcher,
    reconnect_policy: ReconnectPolicy,
}

impl PollingRunner {
    pub fn new(
        source: Arc<dyn UpdateSource>,
        dispatcher: EventDispatcher,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { source, dispatcher, reconnect_policy }
    }

    /// Runs until the source closes or retries are exhausted. Never fails;
    /// a connection that delivered at least one batch resets the retry count.
    pub async fn start(&self) -> Result<()> {
        let mut attempt = 0;

        loop {
            let mut received = false;
            let Err(transport_error) = self.connect_and_pump(attempt, &mut received).await else {
                return Ok(());
            };

            if received {
                attempt = 0;
            }

            warn!(
                attempt,
                max_retries = self.reconnect_policy.max_retries,
                error = %transport_error,
                "telegram update source failed"
            );

            if attempt >= self.reconnect_policy.max_retries {
                warn!(
                    max_retries = self.reconnect_policy.max_retries,
                    "telegram polling retries exhausted; continuing process without crash"
                );
                return Ok(());
            }

            let delay = self.reconnect_policy.backoff(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }

    async fn connect_and_pump(
        &self,
        attempt: u32,
        received: &mut bool,
    ) -> Result<(), TransportError> {
        info!(attempt, "connecting telegram update source");
        self.source.connect().await?;
        info!(attempt, "telegram update source connected");

        loop {
            let Some(batch) = self.source.next_batch().await? else {
                info!(attempt, "telegram update source closed");
                self.source.disconnect().await?;
                return Ok(());
            };
            *received = true;

            for update in batch {
                self.process(update).await;
            }
        }
    }

    async fn process(&self, update: TelegramUpdate) {
        let context = EventContext::for_update(&update);
        let chat_id = update.event.chat_id();

        info!(
            event_name = "ingress.telegram.update_received",
            update_id = update.update_id,
            event_type = ?update.event.event_type(),
            chat_id = ?chat_id,
            correlation_id = %context.correlation_id,
            "received telegram update"
        );

        if let Err(error) = self.source.acknowledge(update.update_id).await {
            warn!(
                event_name = "ingress.telegram.ack_sent",
                update_id = update.update_id,
                correlation_id = %context.correlation_id,
                error = %error,
                "failed to acknowledge telegram update"
            );
        } else {
            debug!(
                event_name = "ingress.telegram.ack_sent",
                update_id = update.update_id,
                correlation_id = %context.correlation_id,
                "acknowledged telegram update"
            );
        }

        if let Err(error) = self.dispatcher.dispatch(&update, &context).await {
            warn!(
                update_id = update.update_id,
                chat_id = ?chat_id,
                correlation_id = %context.correlation_id,
                error = %error,
                "event dispatch failed; continuing polling loop"
            );
        }
    }
}

//! Telegram integration - long-polling bot interface
//!
//! This crate connects the dialogue engine to the Telegram Bot API:
//! - **Polling** (`polling`) - `getUpdates` long polling with reconnection
//! - **Events** (`events`) - messages and inline button presses, routed by type
//! - **Conversation** (`conversation`) - runs the engine against per-chat sessions
//! - **Keyboards** (`keyboards`) - reply and inline keyboard markup
//! - **Client** (`client`) - `reqwest` Bot API client
//!
//! # Architecture
//!
//! ```text
//! getUpdates → PollingRunner → EventDispatcher → ConversationService → DialogueEngine
//!                                                      ↓
//!                              sendMessage / editMessageText / sendDocument
//! ```

pub mod api;
pub mod client;
pub mod conversation;
pub mod events;
pub mod keyboards;
pub mod polling;

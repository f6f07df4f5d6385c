use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::catalog::MatchCandidate;
use crate::domain::FieldSet;
use crate::flows::DialogueStep;

pub type ChatId = i64;

/// Candidates offered by an open `_SELECT` step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSelection {
    pub candidates: Vec<MatchCandidate>,
    /// Agreement number typed together with the company query, applied once
    /// the company is chosen.
    pub agreement_number: Option<String>,
}

/// Leading key characters carried in a selection button next to the index.
const KEY_CHECK_CHARS: usize = 12;

impl PendingSelection {
    /// Callback value for the candidate at `index`: `#<index>:<key prefix>`.
    /// Keys can be arbitrarily long, so only a short prefix travels with the
    /// button to tell apart a selection offered by an older keyboard.
    pub fn choice_value(index: usize, key: &str) -> String {
        format!("#{index}:{}", key_prefix(key))
    }

    /// Resolves a callback value produced by [`Self::choice_value`] against the
    /// candidates offered now.
    pub fn selected(&self, value: &str) -> Option<&MatchCandidate> {
        let (index, prefix) = value.strip_prefix('#')?.split_once(':')?;
        let candidate = self.candidates.get(index.parse::<usize>().ok()?)?;
        (key_prefix(&candidate.key) == prefix).then_some(candidate)
    }
}

fn key_prefix(key: &str) -> &str {
    match key.char_indices().nth(KEY_CHECK_CHARS) {
        Some((end, _)) => &key[..end],
        None => key,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub step: DialogueStep,
    pub fields: FieldSet,
    pub pending: Option<PendingSelection>,
}

impl Session {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns a fresh session when the chat has none yet.
    async fn load(&self, chat_id: ChatId) -> Result<Session, SessionStoreError>;
    async fn save(&self, chat_id: ChatId, session: Session) -> Result<(), SessionStoreError>;
    async fn discard(&self, chat_id: ChatId) -> Result<(), SessionStoreError>;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<ChatId, Session>>,
}

impl InMemorySessionStore {
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, chat_id: ChatId) -> Result<Session, SessionStoreError> {
        Ok(self.sessions.read().await.get(&chat_id).cloned().unwrap_or_default())
    }

    async fn save(&self, chat_id: ChatId, session: Session) -> Result<(), SessionStoreError> {
        self.sessions.write().await.insert(chat_id, session);
        Ok(())
    }

    async fn discard(&self, chat_id: ChatId) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(&chat_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemorySessionStore, PendingSelection, Session, SessionStore};
    use crate::catalog::MatchCandidate;
    use crate::flows::DialogueStep;

    #[test]
    fn selection_value_checks_index_and_key_prefix() {
        let long_key = "очень длинное название склада на окраине";
        let pending = PendingSelection {
            candidates: vec![
                MatchCandidate { key: "склад".to_owned(), label: "Склад".to_owned() },
                MatchCandidate { key: long_key.to_owned(), label: "Окраина".to_owned() },
            ],
            agreement_number: None,
        };

        let value = PendingSelection::choice_value(1, long_key);
        assert_eq!(value, "#1:очень длинно");
        assert_eq!(pending.selected(&value).map(|c| c.key.as_str()), Some(long_key));
        assert_eq!(
            pending.selected(&PendingSelection::choice_value(0, "склад")).map(|c| c.label.as_str()),
            Some("Склад")
        );
        assert_eq!(pending.selected("#0:другой"), None);
        assert_eq!(pending.selected("#5:склад"), None);
        assert_eq!(pending.selected("склад"), None);
    }

    #[tokio::test]
    async fn unknown_chat_gets_fresh_session() {
        let store = InMemorySessionStore::default();

        let session = store.load(7).await.expect("load");
        assert_eq!(session, Session::default());
        assert_eq!(session.step, DialogueStep::Start);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_chat() {
        let store = InMemorySessionStore::default();

        let mut first = Session::default();
        first.step = DialogueStep::Tons;
        first.fields.tons = Some(3);
        store.save(1, first.clone()).await.expect("save first");
        store.save(2, Session::default()).await.expect("save second");

        assert_eq!(store.load(1).await.expect("load first"), first);
        assert_eq!(store.load(2).await.expect("load second").fields.tons, None);

        store.discard(1).await.expect("discard");
        assert_eq!(store.load(1).await.expect("reload").step, DialogueStep::Start);
        assert_eq!(store.len().await, 1);
    }
}

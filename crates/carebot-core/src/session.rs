//! Per-session conversation history, held in memory for the process lifetime.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::assistant::HealthcareAssistant;
use crate::generator::TextGenerator;
use crate::types::{ChatTurn, Reply, Role};

/// Shown instead of a reply when the submitted text is blank.
pub const EMPTY_QUERY_WARNING: &str = "Please enter a query.";

pub type SessionId = String;

/// Append-only transcript of one session.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, message: impl Into<String>) {
        self.turns.push(ChatTurn::new(Role::User, message));
    }

    pub fn push_assistant(&mut self, message: impl Into<String>) {
        self.turns.push(ChatTurn::new(Role::Assistant, message));
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// All live sessions, keyed by session id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Conversation>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_session_id() -> SessionId {
        uuid::Uuid::new_v4().to_string()
    }

    /// Snapshot of a session's transcript (empty for unknown sessions).
    pub async fn history(&self, id: &str) -> Vec<ChatTurn> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .map(|c| c.turns().to_vec())
            .unwrap_or_default()
    }

    pub async fn append(&self, id: &str, turn: ChatTurn) {
        let mut sessions = self.sessions.write().await;
        sessions.entry(id.to_string()).or_default().turns.push(turn);
    }

    /// Run one user message through the assistant and record both turns.
    /// Returns `None` (and records nothing) when the input is blank.
    pub async fn submit<G: TextGenerator>(
        &self,
        id: &str,
        user_input: &str,
        assistant: &HealthcareAssistant<G>,
    ) -> Option<Reply> {
        if user_input.trim().is_empty() {
            debug!("session {}: blank query ignored", id);
            return None;
        }

        // The lock is not held across the model call
        let reply = assistant.reply(user_input).await;

        {
            let mut sessions = self.sessions.write().await;
            let conversation = sessions.entry(id.to_string()).or_default();
            conversation.push_user(user_input);
            conversation.push_assistant(reply.text.clone());
            debug!("session {}: {} turns", id, conversation.len());
        }

        Some(reply)
    }

    pub async fn clear(&self, id: &str) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(id).is_some() {
            info!("session {} cleared", id);
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

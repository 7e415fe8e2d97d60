//! ChatSession -- a windowed conversation with a committed agent.
//!
//! The log is seeded with a system preamble built from the agent record and
//! the agent's first message, even when that message is blank. It never holds more than [`MAX_MESSAGES`]
//! entries; the oldest are dropped first, preamble included.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use agentmint_types::agent::AgentRecord;
use agentmint_types::error::ChatError;
use agentmint_types::llm::{ChatMessage, MessageRole};

use crate::llm::box_provider::BoxTextGenerator;
use crate::wizard::prompt::chat_preamble;

/// Upper bound on the number of messages kept and sent.
pub const MAX_MESSAGES: usize = 50;

pub struct ChatSession {
    id: Uuid,
    agent: AgentRecord,
    text: Arc<BoxTextGenerator>,
    log: Mutex<Vec<ChatMessage>>,
    /// Held for the whole round trip of a send.
    in_flight: Mutex<()>,
}

impl ChatSession {
    pub fn new(agent: AgentRecord, text: Arc<BoxTextGenerator>) -> Self {
        let log = vec![
            ChatMessage::system(chat_preamble(&agent)),
            ChatMessage::assistant(agent.first_message.clone()),
        ];

        let id = Uuid::now_v7();
        info!(session_id = %id, token_address = %agent.token_address, "chat session opened");

        Self {
            id,
            agent,
            text,
            log: Mutex::new(log),
            in_flight: Mutex::new(()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn agent(&self) -> &AgentRecord {
        &self.agent
    }

    /// Snapshot of the full log, oldest first.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.log.lock().await.clone()
    }

    /// Snapshot without system entries.
    pub async fn visible_messages(&self) -> Vec<ChatMessage> {
        self.log
            .lock()
            .await
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .cloned()
            .collect()
    }

    /// Send one user message and return the agent's reply.
    ///
    /// Only one send may be pending; a second one fails with
    /// [`ChatError::Busy`]. A failed send keeps the user message but never
    /// appends an assistant message. A cancelled send leaves the log unchanged.
    pub async fn send(&self, user_text: &str) -> Result<String, ChatError> {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let _guard = self.in_flight.try_lock().map_err(|_| ChatError::Busy)?;

        let mut pending = self.log.lock().await.clone();
        pending.push(ChatMessage::user(user_text));
        truncate_to_window(&mut pending);

        debug!(session_id = %self.id, messages = pending.len(), "sending chat turn");
        let reply = match self.text.chat(&pending).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(session_id = %self.id, "chat turn failed: {e}");
                *self.log.lock().await = pending;
                return Err(e.into());
            }
        };

        pending.push(ChatMessage::assistant(reply.clone()));
        truncate_to_window(&mut pending);
        *self.log.lock().await = pending;
        Ok(reply)
    }
}

/// Drop the oldest entries until at most [`MAX_MESSAGES`] remain.
pub fn truncate_to_window(log: &mut Vec<ChatMessage>) {
    if log.len() > MAX_MESSAGES {
        let excess = log.len() - MAX_MESSAGES;
        log.drain(..excess);
    }
}

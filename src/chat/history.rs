//! History loading for the active session

use crate::api::{ChatBackend, ChatHistoryResponse};
use crate::chat::Conversation;
use crate::error::{is_session_not_found, Result};
use crate::types::Message;

/// Error shown when the URL referenced an unknown session
pub const HISTORY_NOT_FOUND_MESSAGE: &str =
    "This chat session does not exist. Please create a new chat.";

/// Error shown when history could not be loaded for any other reason
pub const HISTORY_FAILED_MESSAGE: &str = "Failed to load chat history. Please try again.";

/// Result of a history load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOutcome {
    /// Messages replaced with the backend's history
    Loaded {
        /// Session owner reported by the backend
        owner_id: Option<String>,
        /// Whether the caller owns the session
        is_owner: bool,
    },
    /// The session does not exist; it has been marked invalid
    NotFound,
    /// Transient failure; retryable
    Failed,
}

impl Conversation {
    /// Mark a history load as started
    pub fn begin_history_load(&mut self) {
        self.loading = true;
        self.error = None;
        self.invalid_chat_id = false;
    }

    /// Apply the result of a history load
    ///
    /// Successful loads replace the message list wholesale.
    pub fn complete_history_load(&mut self, result: Result<ChatHistoryResponse>) -> HistoryOutcome {
        self.loading = false;
        match result {
            Ok(response) => {
                self.messages = response.history.into_iter().map(Message::from).collect();
                tracing::debug!("Loaded {} history messages", self.messages.len());
                HistoryOutcome::Loaded {
                    owner_id: response.owner_id,
                    is_owner: response.is_owner,
                }
            }
            Err(err) if is_session_not_found(&err) => {
                tracing::warn!("Error loading chat history: {}", err);
                self.invalid_chat_id = true;
                self.error = Some(HISTORY_NOT_FOUND_MESSAGE.to_string());
                HistoryOutcome::NotFound
            }
            Err(err) => {
                tracing::error!("Error loading chat history: {:#}", err);
                self.error = Some(HISTORY_FAILED_MESSAGE.to_string());
                HistoryOutcome::Failed
            }
        }
    }

    /// Load the history of `chat_id` from the backend
    pub async fn load_history(&mut self, backend: &dyn ChatBackend, chat_id: &str) -> HistoryOutcome {
        self.begin_history_load();
        let result = backend.chat_history(chat_id).await;
        self.complete_history_load(result)
    }
}

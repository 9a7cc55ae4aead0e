//! Message exchange controller
//!
//! [`Conversation`] holds the visible message list and the flags the input
//! form depends on. Sending is split in two so the optimistic user message
//! is observable before the backend answers:
//!
//! 1. [`Conversation::begin_send`] validates the input and appends the user
//!    message
//! 2. [`Conversation::complete_send`] appends the reply, or an error bubble,
//!    or invalidates the session
//!
//! [`Conversation::send`] runs both around the backend call.

use crate::api::{ChatBackend, QueryResponse};
use crate::error::{is_session_not_found, Result};
use crate::types::Message;

mod history;

pub use history::{HistoryOutcome, HISTORY_FAILED_MESSAGE, HISTORY_NOT_FOUND_MESSAGE};

/// Assistant bubble shown when a query fails
pub const SEND_FAILED_MESSAGE: &str = "Sorry, I couldn't get a response. Please try again.";

/// Error shown when the backend no longer knows the session
pub const SESSION_EXPIRED_MESSAGE: &str =
    "This chat session is no longer valid. Please create a new chat.";

/// A send that passed validation and awaits the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    /// Session the query goes to
    pub chat_id: String,
    /// Text exactly as typed
    pub text: String,
}

/// Result of a completed exchange
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The assistant answered; the reply was appended
    Replied(Message),
    /// The session is gone; further sends are disabled
    SessionInvalid,
    /// Any other failure; an error bubble was appended
    Failed,
}

/// Visible conversation state
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    loading: bool,
    error: Option<String>,
    invalid_chat_id: bool,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in insertion order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True while a query or history load is outstanding
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Inline error banner, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True once the backend reported the session unknown
    pub fn invalid_chat_id(&self) -> bool {
        self.invalid_chat_id
    }

    /// True when the input form should accept text
    pub fn accepts_input(&self) -> bool {
        !self.loading && !self.invalid_chat_id
    }

    /// Forget everything; used when a different session becomes active
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Validate and optimistically append a user message
    ///
    /// Returns `None`, without touching state, when the text is blank, the
    /// session is invalid, or no session is active.
    ///
    /// # Examples
    ///
    /// ```
    /// use pokegpt::chat::Conversation;
    ///
    /// let mut conversation = Conversation::new();
    /// assert!(conversation.begin_send(Some("c1"), "   ").is_none());
    /// assert!(conversation.messages().is_empty());
    ///
    /// let pending = conversation.begin_send(Some("c1"), "Who is Mew?").unwrap();
    /// assert_eq!(pending.chat_id, "c1");
    /// assert_eq!(conversation.messages().len(), 1);
    /// assert!(conversation.is_loading());
    /// ```
    pub fn begin_send(&mut self, chat_id: Option<&str>, text: &str) -> Option<PendingSend> {
        if text.trim().is_empty() || self.invalid_chat_id {
            return None;
        }
        let chat_id = chat_id?;

        self.messages.push(Message::user(text));
        self.loading = true;
        self.error = None;

        Some(PendingSend {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        })
    }

    /// Apply the backend's answer to a pending send
    pub fn complete_send(
        &mut self,
        pending: PendingSend,
        result: Result<QueryResponse>,
    ) -> SendOutcome {
        self.loading = false;
        match result {
            Ok(response) => {
                let reply = response.into_message();
                tracing::debug!(
                    "Reply received for chat {} ({} tool calls)",
                    pending.chat_id,
                    reply.tool_calls.len()
                );
                self.messages.push(reply.clone());
                SendOutcome::Replied(reply)
            }
            Err(err) if is_session_not_found(&err) => {
                tracing::warn!("Chat {} is no longer valid: {}", pending.chat_id, err);
                self.invalid_chat_id = true;
                self.error = Some(SESSION_EXPIRED_MESSAGE.to_string());
                SendOutcome::SessionInvalid
            }
            Err(err) => {
                tracing::error!("Error sending message: {:#}", err);
                self.messages.push(Message::assistant_error(SEND_FAILED_MESSAGE));
                SendOutcome::Failed
            }
        }
    }

    /// Send a message and wait for the exchange to complete
    ///
    /// Returns `None` when the input was rejected and nothing was sent.
    pub async fn send(
        &mut self,
        backend: &dyn ChatBackend,
        chat_id: Option<&str>,
        text: &str,
    ) -> Option<SendOutcome> {
        let pending = self.begin_send(chat_id, text)?;
        let result = backend.query(&pending.chat_id, &pending.text).await;
        Some(self.complete_send(pending, result))
    }
}

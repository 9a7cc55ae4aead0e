//! Domain types shared by the controllers and the presentation layer
//!
//! These are the client-side shapes of sessions, chat messages, tool-call
//! traces and favorite entries. Wire formats live in [`crate::api::types`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Active chat session as the client knows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque backend identifier
    pub id: String,
    /// Owning user, when the backend reported one
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Whether the current client owns the session
    #[serde(default)]
    pub is_owner: bool,
}

impl Session {
    /// Create a session known only by its identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner_id: None,
            is_owner: false,
        }
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the user
    User,
    /// Produced by the assistant (or synthesized on failure)
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Trace of an auxiliary backend action taken while answering
///
/// Passed through from the backend untouched and rendered verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Name of the tool the assistant invoked
    pub tool_name: String,
    /// Arguments the tool was invoked with
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
    /// Raw tool output
    #[serde(default)]
    pub output: String,
}

/// A single entry in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message author
    pub role: Role,
    /// Text content (markdown for assistant replies)
    pub content: String,
    /// Tool calls performed while producing this message
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
    /// True for synthesized failure messages
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    /// Create a user message
    ///
    /// # Examples
    ///
    /// ```
    /// use pokegpt::types::{Message, Role};
    ///
    /// let msg = Message::user("What type is Charizard?");
    /// assert_eq!(msg.role, Role::User);
    /// assert!(msg.tool_calls.is_empty());
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            is_error: false,
        }
    }

    /// Create an assistant reply carrying its tool-call trace
    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCallRecord>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls,
            is_error: false,
        }
    }

    /// Create an assistant-role error bubble
    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
            is_error: true,
        }
    }
}

/// A favorite Pokémon as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    /// Backend identifier, normalized to a string
    pub id: String,
    /// Display name
    pub name: String,
}

impl FavoriteEntry {
    /// Create a favorite entry
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

//! Wire types for the PokéGPT backend
//!
//! Request and response bodies exactly as the backend speaks them, plus
//! conversions into the client's domain types.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::types::{FavoriteEntry, Message, Role, ToolCallRecord};

/// Response from `POST /create_chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChatResponse {
    /// Identifier of the new session
    pub chat_id: String,
}

/// Body of `POST /query`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct QueryRequest<'a> {
    pub query: &'a str,
    pub chat_id: &'a str,
}

/// Response from `POST /query`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Assistant reply text
    #[serde(default)]
    pub response: String,
    /// Tool calls performed while answering
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_calls: Vec<WireToolCall>,
}

impl QueryResponse {
    /// Convert the reply into an assistant message
    pub fn into_message(self) -> Message {
        Message::assistant(
            self.response,
            self.tool_calls.into_iter().map(ToolCallRecord::from).collect(),
        )
    }
}

/// Tool call as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireToolCall {
    /// Tool name
    pub tool_name: String,
    /// Invocation arguments
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: BTreeMap<String, serde_json::Value>,
    /// Tool output; non-string outputs are kept as their JSON text
    #[serde(default, deserialize_with = "output_as_text")]
    pub output: String,
}

impl From<WireToolCall> for ToolCallRecord {
    fn from(call: WireToolCall) -> Self {
        Self {
            tool_name: call.tool_name,
            parameters: call.parameters,
            output: call.output,
        }
    }
}

/// Message as stored in the backend history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// `user` or `assistant`
    pub role: Role,
    /// Message text
    #[serde(default)]
    pub content: String,
    /// Tool calls attached to assistant messages
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_calls: Vec<WireToolCall>,
}

impl From<WireMessage> for Message {
    fn from(msg: WireMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content,
            tool_calls: msg.tool_calls.into_iter().map(ToolCallRecord::from).collect(),
            is_error: false,
        }
    }
}

/// Response from `GET /chat_history/{chat_id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    /// Messages in insertion order
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<WireMessage>,
    /// Owner of the session
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Whether the caller owns the session
    #[serde(default)]
    pub is_owner: bool,
}

/// Favorite as reported by the backend; ids may be numbers or strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFavorite {
    /// Identifier normalized to a string
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
}

impl From<WireFavorite> for FavoriteEntry {
    fn from(fav: WireFavorite) -> Self {
        Self {
            id: fav.id,
            name: fav.name,
        }
    }
}

/// Response from `GET /favorites`
///
/// `favorites` is required: a body without it is treated as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesResponse {
    /// Complete favorites list
    pub favorites: Vec<WireFavorite>,
    /// Backend-assigned user id
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Body of `POST /favorites/add`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AddFavoriteRequest<'a> {
    pub pokemon_name: &'a str,
}

/// Body of `POST /favorites/remove`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RemoveFavoriteRequest {
    pub pokemon_id: serde_json::Value,
}

impl RemoveFavoriteRequest {
    /// Numeric ids go back to the backend as numbers, anything else as text
    pub fn new(id: &str) -> Self {
        let pokemon_id = id
            .parse::<i64>()
            .map(serde_json::Value::from)
            .unwrap_or_else(|_| serde_json::Value::from(id));
        Self { pokemon_id }
    }
}

/// Response from `POST /favorites/remove`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveFavoriteResponse {
    /// Count after removal, when the backend reports it
    #[serde(default)]
    pub favorites_count: Option<usize>,
}

/// Error body returned by the backend on failures
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn id_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

fn output_as_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

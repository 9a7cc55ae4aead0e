//! Backend access for PokéGPT
//!
//! The [`ChatBackend`] trait is the seam between the controllers and the
//! network. Concrete implementations live in submodules:
//!
//! - [`http::HttpBackend`]: reqwest client speaking the backend's JSON API
//! - [`fake::FakeBackend`]: scripted in-process backend (cfg(test) only)
//!
//! Implementations surface a missing chat session as
//! [`crate::error::PokeGptError::SessionNotFound`] so controllers can tell it
//! apart from transient failures.

use async_trait::async_trait;

use crate::error::Result;

pub mod http;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use http::HttpBackend;
pub use types::{
    ChatHistoryResponse, CreateChatResponse, FavoritesResponse, QueryResponse,
    RemoveFavoriteResponse,
};

/// Operations the client needs from the backend service
///
/// Used polymorphically through `Arc<dyn ChatBackend>`.
#[async_trait]
pub trait ChatBackend: Send + Sync + std::fmt::Debug {
    /// Create a new chat session
    async fn create_chat(&self) -> Result<CreateChatResponse>;

    /// Fetch the history of a chat session
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` when the backend answers 404.
    async fn chat_history(&self, chat_id: &str) -> Result<ChatHistoryResponse>;

    /// Send a user query within a chat session
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` when the backend answers 404.
    async fn query(&self, chat_id: &str, query: &str) -> Result<QueryResponse>;

    /// List the current user's favorites
    async fn list_favorites(&self) -> Result<FavoritesResponse>;

    /// Add a Pokémon to the favorites by name
    async fn add_favorite(&self, pokemon_name: &str) -> Result<serde_json::Value>;

    /// Remove a favorite by id
    async fn remove_favorite(&self, pokemon_id: &str) -> Result<RemoveFavoriteResponse>;
}

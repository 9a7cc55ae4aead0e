//! Scripted in-process backend for unit tests
//!
//! [`FakeBackend`] replaces real network I/O in tests. Each endpoint has a
//! queue of scripted [`Reply`] values consumed one per call, and an optional
//! sticky fallback used once the queue is empty. Every call is counted and
//! its arguments recorded so tests can assert on traffic.
//!
//! # Example
//!
//! ```ignore
//! let backend = FakeBackend::new();
//! backend.push_create(Reply::Fail("down".into()));
//! backend.push_create(Reply::Ok(CreateChatResponse { chat_id: "c1".into() }));
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{
    ChatBackend, ChatHistoryResponse, CreateChatResponse, FavoritesResponse, QueryResponse,
    RemoveFavoriteResponse,
};
use crate::error::{PokeGptError, Result};

/// A scripted outcome for one backend call
#[derive(Debug, Clone)]
pub enum Reply<T> {
    /// Successful response
    Ok(T),
    /// 404 on a session-scoped endpoint
    NotFound,
    /// Any other failure
    Fail(String),
}

#[derive(Debug)]
struct Script<T> {
    queue: VecDeque<Reply<T>>,
    fallback: Option<Reply<T>>,
    calls: usize,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            fallback: None,
            calls: 0,
        }
    }
}

impl<T: Clone> Script<T> {
    fn next(&mut self, endpoint: &str, chat_id: Option<&str>) -> Result<T> {
        self.calls += 1;
        let reply = self
            .queue
            .pop_front()
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| Reply::Fail(format!("no scripted reply for {}", endpoint)));
        match reply {
            Reply::Ok(value) => Ok(value),
            Reply::NotFound => match chat_id {
                Some(id) => Err(PokeGptError::SessionNotFound(id.to_string()).into()),
                None => Err(PokeGptError::Api {
                    status: 404,
                    message: "Not Found".to_string(),
                }
                .into()),
            },
            Reply::Fail(message) => Err(PokeGptError::Api {
                status: 500,
                message,
            }
            .into()),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    create: Script<CreateChatResponse>,
    history: Script<ChatHistoryResponse>,
    query: Script<QueryResponse>,
    list: Script<FavoritesResponse>,
    add: Script<serde_json::Value>,
    remove: Script<RemoveFavoriteResponse>,
    queries: Vec<(String, String)>,
    added: Vec<String>,
    removed: Vec<String>,
}

/// Scripted backend implementing [`ChatBackend`]
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

macro_rules! script_accessors {
    ($field:ident, $ty:ty, $push:ident, $always:ident, $count:ident) => {
        /// Queue a reply for the next call
        pub fn $push(&self, reply: Reply<$ty>) {
            self.state.lock().unwrap().$field.queue.push_back(reply);
        }

        /// Reply used whenever the queue is empty
        pub fn $always(&self, reply: Reply<$ty>) {
            self.state.lock().unwrap().$field.fallback = Some(reply);
        }

        /// Number of calls made so far
        pub fn $count(&self) -> usize {
            self.state.lock().unwrap().$field.calls
        }
    };
}

impl FakeBackend {
    /// Create a backend with no scripted replies
    pub fn new() -> Self {
        Self::default()
    }

    script_accessors!(create, CreateChatResponse, push_create, always_create, create_calls);
    script_accessors!(history, ChatHistoryResponse, push_history, always_history, history_calls);
    script_accessors!(query, QueryResponse, push_query, always_query, query_calls);
    script_accessors!(list, FavoritesResponse, push_list, always_list, list_calls);
    script_accessors!(add, serde_json::Value, push_add, always_add, add_calls);
    script_accessors!(remove, RemoveFavoriteResponse, push_remove, always_remove, remove_calls);

    /// `(chat_id, query)` pairs received by `query`
    pub fn queries(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().queries.clone()
    }

    /// Names received by `add_favorite`
    pub fn added(&self) -> Vec<String> {
        self.state.lock().unwrap().added.clone()
    }

    /// Ids received by `remove_favorite`
    pub fn removed(&self) -> Vec<String> {
        self.state.lock().unwrap().removed.clone()
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn create_chat(&self) -> Result<CreateChatResponse> {
        self.state.lock().unwrap().create.next("create_chat", None)
    }

    async fn chat_history(&self, chat_id: &str) -> Result<ChatHistoryResponse> {
        self.state
            .lock()
            .unwrap()
            .history
            .next("chat_history", Some(chat_id))
    }

    async fn query(&self, chat_id: &str, query: &str) -> Result<QueryResponse> {
        let mut state = self.state.lock().unwrap();
        state
            .queries
            .push((chat_id.to_string(), query.to_string()));
        state.query.next("query", Some(chat_id))
    }

    async fn list_favorites(&self) -> Result<FavoritesResponse> {
        self.state.lock().unwrap().list.next("favorites", None)
    }

    async fn add_favorite(&self, pokemon_name: &str) -> Result<serde_json::Value> {
        let mut state = self.state.lock().unwrap();
        state.added.push(pokemon_name.to_string());
        state.add.next("favorites/add", None)
    }

    async fn remove_favorite(&self, pokemon_id: &str) -> Result<RemoveFavoriteResponse> {
        let mut state = self.state.lock().unwrap();
        state.removed.push(pokemon_id.to_string());
        state.remove.next("favorites/remove", None)
    }
}

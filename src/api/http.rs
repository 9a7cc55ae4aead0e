//! HTTP implementation of [`ChatBackend`]
//!
//! Every call is logged at debug level on the way out and on the way back
//! (method, URL, status, latency). Non-success statuses are turned into
//! [`PokeGptError::Api`], except a 404 on a session-scoped endpoint which
//! becomes [`PokeGptError::SessionNotFound`].
//!
//! The underlying client keeps a cookie store so the backend's user cookie
//! is sent back on every request, the terminal equivalent of a browser
//! request made with credentials included.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::api::types::{
    AddFavoriteRequest, ErrorBody, QueryRequest, RemoveFavoriteRequest,
};
use crate::api::{
    ChatBackend, ChatHistoryResponse, CreateChatResponse, FavoritesResponse, QueryResponse,
    RemoveFavoriteResponse,
};
use crate::config::BackendConfig;
use crate::error::{PokeGptError, Result};

/// reqwest-backed client for the PokéGPT backend
///
/// # Examples
///
/// ```
/// use pokegpt::api::HttpBackend;
/// use pokegpt::config::BackendConfig;
///
/// let backend = HttpBackend::new(&BackendConfig::default());
/// assert!(backend.is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a client for the configured backend
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client cannot
    /// be built
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("pokegpt/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(|e| PokeGptError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized backend client: base_url={}", base_url);

        Ok(Self { client, base_url })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                PokeGptError::Config(format!("Backend URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        session: Option<&str>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        tracing::debug!("-> {} {}", method, url);

        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", method, url, e);
            PokeGptError::Http(e)
        })?;

        let status = response.status();
        tracing::debug!(
            "<- {} {} {} ({} ms)",
            method,
            url,
            status.as_u16(),
            started.elapsed().as_millis()
        );

        let text = response.text().await.map_err(PokeGptError::Http)?;

        if !status.is_success() {
            if status == StatusCode::NOT_FOUND {
                if let Some(chat_id) = session {
                    tracing::warn!("Backend does not know chat session {}", chat_id);
                    return Err(PokeGptError::SessionNotFound(chat_id.to_string()).into());
                }
            }
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            tracing::error!("{} {} returned {}: {}", method, url, status, message);
            return Err(PokeGptError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to parse response from {}: {}", url, e);
            PokeGptError::InvalidResponse(format!("{}: {}", url.path(), e)).into()
        })
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn create_chat(&self) -> Result<CreateChatResponse> {
        let body = serde_json::json!({});
        self.call(Method::POST, &["create_chat"], Some(&body), None)
            .await
    }

    async fn chat_history(&self, chat_id: &str) -> Result<ChatHistoryResponse> {
        self.call::<(), _>(
            Method::GET,
            &["chat_history", chat_id],
            None,
            Some(chat_id),
        )
        .await
    }

    async fn query(&self, chat_id: &str, query: &str) -> Result<QueryResponse> {
        let body = QueryRequest { query, chat_id };
        self.call(Method::POST, &["query"], Some(&body), Some(chat_id))
            .await
    }

    async fn list_favorites(&self) -> Result<FavoritesResponse> {
        self.call::<(), _>(Method::GET, &["favorites"], None, None)
            .await
    }

    async fn add_favorite(&self, pokemon_name: &str) -> Result<serde_json::Value> {
        let body = AddFavoriteRequest { pokemon_name };
        self.call(Method::POST, &["favorites", "add"], Some(&body), None)
            .await
    }

    async fn remove_favorite(&self, pokemon_id: &str) -> Result<RemoveFavoriteResponse> {
        let body = RemoveFavoriteRequest::new(pokemon_id);
        self.call(Method::POST, &["favorites", "remove"], Some(&body), None)
            .await
    }
}

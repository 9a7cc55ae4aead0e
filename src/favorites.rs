//! Favorites coordinator
//!
//! Mirrors the backend's favorites list in a local cache. The cache is only
//! ever replaced wholesale by [`FavoritesCoordinator::fetch_all`]; removal
//! filters the removed entry out locally so the view updates without a
//! second round trip.
//!
//! Refreshes are triggered from outside (poll timer, tab switch) or by
//! [`FavoriteActionDetector`] spotting an add/remove in an assistant reply.

use crate::api::ChatBackend;
use crate::config::FavoritesConfig;
use crate::types::{FavoriteEntry, Message, Role};

/// Error shown when the list cannot be fetched
pub const FAVORITES_LOAD_FAILED_MESSAGE: &str =
    "Failed to load favorites. Please try again later.";

/// Error shown when removal fails
pub const FAVORITES_REMOVE_FAILED_MESSAGE: &str =
    "Failed to remove from favorites. Please try again.";

/// Error shown when adding fails
pub const FAVORITES_ADD_FAILED_MESSAGE: &str = "Failed to add to favorites. Please try again.";

/// Decides whether an assistant reply changed the favorites
///
/// Tool-call names are checked first since they are structured; reply text
/// is matched case-insensitively against known phrases as a fallback.
#[derive(Debug, Clone)]
pub struct FavoriteActionDetector {
    phrases: Vec<String>,
    tools: Vec<String>,
}

impl FavoriteActionDetector {
    /// Build a detector from configuration
    pub fn new(config: &FavoritesConfig) -> Self {
        Self {
            phrases: config
                .refresh_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            tools: config.refresh_tools.clone(),
        }
    }

    /// True when `message` is an assistant reply reporting a favorite change
    ///
    /// # Examples
    ///
    /// ```
    /// use pokegpt::config::FavoritesConfig;
    /// use pokegpt::favorites::FavoriteActionDetector;
    /// use pokegpt::types::Message;
    ///
    /// let detector = FavoriteActionDetector::new(&FavoritesConfig::default());
    /// let reply = Message::assistant("Pikachu was added to your favorites.", Vec::new());
    /// assert!(detector.detects(&reply));
    /// assert!(!detector.detects(&Message::assistant("Pikachu is yellow.", Vec::new())));
    /// ```
    pub fn detects(&self, message: &Message) -> bool {
        if message.role != Role::Assistant || message.is_error {
            return false;
        }

        if message
            .tool_calls
            .iter()
            .any(|call| self.tools.iter().any(|tool| tool == &call.tool_name))
        {
            return true;
        }

        let text = message.content.to_lowercase();
        self.phrases.iter().any(|phrase| text.contains(phrase.as_str()))
    }
}

impl Default for FavoriteActionDetector {
    fn default() -> Self {
        Self::new(&FavoritesConfig::default())
    }
}

/// Local mirror of the user's favorites
#[derive(Debug, Clone, Default)]
pub struct FavoritesCoordinator {
    entries: Vec<FavoriteEntry>,
    count: usize,
    user_id: Option<String>,
    loading: bool,
    error: Option<String>,
    detector: FavoriteActionDetector,
}

impl FavoritesCoordinator {
    /// Create an empty coordinator
    pub fn new(detector: FavoriteActionDetector) -> Self {
        Self {
            detector,
            ..Self::default()
        }
    }

    /// Cached entries in backend order
    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    /// Favorites count shown in the header
    pub fn count(&self) -> usize {
        self.count
    }

    /// User id reported by the backend
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// True while a fetch is outstanding
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Inline error, if the last operation failed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch the whole list and replace the cache
    ///
    /// On failure the previous cache is kept and an error is recorded.
    /// Returns true on success.
    pub async fn fetch_all(&mut self, backend: &dyn ChatBackend) -> bool {
        self.loading = true;
        self.error = None;
        tracing::debug!("Fetching favorites");

        let result = backend.list_favorites().await;
        self.loading = false;

        match result {
            Ok(response) => {
                self.entries = response
                    .favorites
                    .into_iter()
                    .map(FavoriteEntry::from)
                    .collect();
                self.count = self.entries.len();
                if response.user_id.is_some() {
                    self.user_id = response.user_id;
                }
                tracing::debug!("Favorites fetched: {} entries", self.count);
                true
            }
            Err(err) => {
                tracing::error!("Error fetching favorites: {:#}", err);
                self.error = Some(FAVORITES_LOAD_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    /// Remove a favorite and update the cache locally
    ///
    /// The new count is the backend's when reported, otherwise the local
    /// count minus one.
    pub async fn remove(&mut self, backend: &dyn ChatBackend, id: &str) -> bool {
        match backend.remove_favorite(id).await {
            Ok(response) => {
                self.entries.retain(|entry| entry.id != id);
                self.count = response
                    .favorites_count
                    .unwrap_or_else(|| self.count.saturating_sub(1));
                self.error = None;
                tracing::info!("Removed favorite {} ({} left)", id, self.count);
                true
            }
            Err(err) => {
                tracing::error!("Error removing favorite {}: {:#}", id, err);
                self.error = Some(FAVORITES_REMOVE_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    /// Add a favorite by name, then refresh the list
    ///
    /// Returns true once the backend accepted the add. A failed refresh
    /// afterwards only records the load error.
    pub async fn add(&mut self, backend: &dyn ChatBackend, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        match backend.add_favorite(name).await {
            Ok(_) => {
                tracing::info!("Added {} to favorites", name);
                if !self.fetch_all(backend).await {
                    tracing::warn!("Favorite {} added but the list could not be refreshed", name);
                }
                true
            }
            Err(err) => {
                tracing::error!("Error adding favorite {}: {:#}", name, err);
                self.error = Some(FAVORITES_ADD_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    /// Refresh once if `message` reports a favorite change
    ///
    /// Returns true when a refresh was issued.
    pub async fn refresh_if_changed(&mut self, backend: &dyn ChatBackend, message: &Message) -> bool {
        if !self.detector.detects(message) {
            return false;
        }
        tracing::info!("Assistant reply changed favorites, refreshing");
        self.fetch_all(backend).await;
        true
    }
}

//! Navigable URL carrying the active chat id
//!
//! The chat id is the only client state that survives a restart: it lives in
//! the `chatId` query parameter of the shareable link. Writing it never
//! triggers a reload, it only replaces the current entry.

use url::Url;

use crate::error::Result;

/// Query parameter holding the active chat id
pub const CHAT_ID_PARAM: &str = "chatId";

/// Current navigable URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    /// Parse a location from a link
    ///
    /// # Examples
    ///
    /// ```
    /// use pokegpt::location::Location;
    ///
    /// let location = Location::parse("http://localhost:5173/?chatId=abc").unwrap();
    /// assert_eq!(location.chat_id().as_deref(), Some("abc"));
    /// ```
    pub fn parse(link: &str) -> Result<Self> {
        Ok(Self {
            url: Url::parse(link)?,
        })
    }

    /// Chat id carried by the URL; empty values count as absent
    pub fn chat_id(&self) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == CHAT_ID_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.trim().is_empty())
    }

    /// Write the chat id into the URL, replacing any previous one
    pub fn set_chat_id(&mut self, chat_id: &str) {
        let mut pairs = self.other_pairs();
        pairs.push((CHAT_ID_PARAM.to_string(), chat_id.to_string()));
        self.replace_query(pairs);
        tracing::debug!("Location updated: {}", self.url);
    }

    /// Remove the chat id from the URL, keeping other parameters
    pub fn remove_chat_id(&mut self) {
        let pairs = self.other_pairs();
        self.replace_query(pairs);
        tracing::debug!("Chat id removed from location: {}", self.url);
    }

    /// The full link
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn other_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .filter(|(key, _)| key != CHAT_ID_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    fn replace_query(&mut self, pairs: Vec<(String, String)>) {
        self.url.set_query(None);
        if !pairs.is_empty() {
            self.url.query_pairs_mut().extend_pairs(pairs);
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

//! PokéGPT - terminal client library for the Pokémon chat assistant
//!
//! This library provides the client side of PokéGPT: chat session lifecycle,
//! message exchange, history loading and favorites synchronization against
//! the PokéGPT HTTP backend.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: backend trait and its reqwest implementation
//! - `session`: session lifecycle state machine and retry policy
//! - `chat`: message exchange and history loading
//! - `favorites`: favorites cache and change detection
//! - `scheduler`: injectable timers
//! - `location`: the shareable link carrying the chat id
//! - `app`: composition of the above, publishing change notifications
//! - `ui`: terminal rendering
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pokegpt::{App, Config, HttpBackend, Location, TokioScheduler};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let backend = Arc::new(HttpBackend::new(&config.backend)?);
//!     let (scheduler, _timers) = TokioScheduler::new();
//!     let location = Location::parse(&config.app.base_url)?;
//!
//!     let mut app = App::new(config, backend, Box::new(scheduler), location);
//!     app.start().await;
//!     app.send("What type is Charizard?").await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod favorites;
pub mod location;
pub mod scheduler;
pub mod session;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use api::{ChatBackend, HttpBackend};
pub use app::{App, AppNotification, Tab};
pub use chat::Conversation;
pub use config::Config;
pub use error::{PokeGptError, Result};
pub use favorites::FavoritesCoordinator;
pub use location::Location;
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
pub use session::SessionController;
pub use types::{FavoriteEntry, Message, Role, Session, ToolCallRecord};

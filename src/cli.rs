//! Command-line interface definition for PokéGPT
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, session inspection and
//! favorites management.

use clap::{Parser, Subcommand};

/// PokéGPT - terminal client for the Pokémon chat assistant
///
/// Chat with the assistant, resume sessions by id or link, and manage
/// your favorite Pokémon.
#[derive(Parser, Debug, Clone)]
#[command(name = "pokegpt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Override the backend base URL from config
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for PokéGPT
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Resume an existing session by id
        #[arg(long, conflicts_with = "url")]
        chat_id: Option<String>,

        /// Resume from a shared link carrying a `chatId` parameter
        #[arg(long, value_name = "LINK")]
        url: Option<String>,
    },

    /// Create a new session and print its link
    New,

    /// Print the message history of a session
    History {
        /// Session identifier
        chat_id: String,

        /// Print raw JSON instead of formatted messages
        #[arg(long)]
        json: bool,
    },

    /// Manage favorite Pokémon
    Favorites {
        /// Favorites subcommand
        #[command(subcommand)]
        command: FavoritesCommand,
    },
}

/// Favorites management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum FavoritesCommand {
    /// List favorites
    List {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add a Pokémon by name
    Add {
        /// Pokémon name
        name: String,
    },

    /// Remove a favorite by id
    Remove {
        /// Pokémon id
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            api_url: None,
            command: Commands::Chat {
                chat_id: None,
                url: None,
            },
        }
    }
}

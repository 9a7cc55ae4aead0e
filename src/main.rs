//! PokéGPT - terminal client for the Pokémon chat assistant
//!
#![doc = "PokéGPT - terminal client for the Pokémon chat assistant"]
#![doc = "Main entry point for the PokéGPT client application."]

use anyhow::Result;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pokegpt::cli::{Cli, Commands};
use pokegpt::commands;
use pokegpt::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs)?;

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Chat { chat_id, url } => {
            if let Some(id) = &chat_id {
                tracing::debug!("Resuming chat id: {}", id);
            }
            if let Some(link) = &url {
                tracing::debug!("Resuming from link: {}", link);
            }
            commands::chat::run_chat(config, chat_id, url).await?;
            Ok(())
        }
        Commands::New => {
            commands::new_chat::run_new(config).await?;
            Ok(())
        }
        Commands::History { chat_id, json } => {
            tracing::info!("Loading history for {}", chat_id);
            commands::history::handle_history(config, chat_id, json).await?;
            Ok(())
        }
        Commands::Favorites { command } => {
            tracing::info!("Starting favorites command");
            commands::favorites::handle_favorites(config, command).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
/// takes precedence over `--verbose`.
fn init_tracing(verbose: bool, json: bool) -> Result<()> {
    let default_level = if verbose { "pokegpt=debug" } else { "pokegpt=info" };
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

use crate::cli::FavoritesCommand;
use crate::commands::build_backend;
use crate::config::Config;
use crate::error::{PokeGptError, Result};
use crate::favorites::{
    FavoriteActionDetector, FavoritesCoordinator, FAVORITES_REMOVE_FAILED_MESSAGE,
};
use crate::ui;
use colored::Colorize;

/// Handle favorites commands
///
/// # Errors
///
/// Returns an error when the backend call fails; the message is the same one
/// the interactive view shows.
pub async fn handle_favorites(config: Config, command: FavoritesCommand) -> Result<()> {
    let backend = build_backend(&config)?;

    match command {
        FavoritesCommand::List { json: true } => {
            let response = backend.list_favorites().await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        FavoritesCommand::List { json: false } => {
            let mut favorites =
                FavoritesCoordinator::new(FavoriteActionDetector::new(&config.favorites));
            if !favorites.fetch_all(backend.as_ref()).await {
                return Err(failure(&favorites));
            }
            println!("{}", ui::render_favorites(&favorites));
        }
        FavoritesCommand::Add { name } => {
            let mut favorites = FavoritesCoordinator::default();
            if !favorites.add(backend.as_ref(), &name).await {
                return Err(failure(&favorites));
            }
            let message = match favorites.error() {
                Some(_) => format!("Added {} to your favorites", name.trim()),
                None => format!(
                    "Added {} to your favorites ({} total)",
                    name.trim(),
                    favorites.count()
                ),
            };
            println!("{}", message.green());
        }
        FavoritesCommand::Remove { id } => {
            let response = backend.remove_favorite(&id).await.map_err(|err| {
                tracing::error!("Error removing favorite {}: {:#}", id, err);
                PokeGptError::Favorites(FAVORITES_REMOVE_FAILED_MESSAGE.to_string())
            })?;
            let message = match response.favorites_count {
                Some(left) => format!("Removed {} from your favorites ({} left)", id, left),
                None => format!("Removed {} from your favorites", id),
            };
            println!("{}", message.green());
        }
    }

    Ok(())
}

fn failure(favorites: &FavoritesCoordinator) -> anyhow::Error {
    let message = favorites
        .error()
        .unwrap_or("Favorites request failed")
        .to_string();
    PokeGptError::Favorites(message).into()
}

use crate::chat::HISTORY_NOT_FOUND_MESSAGE;
use crate::commands::build_backend;
use crate::config::Config;
use crate::error::{is_session_not_found, PokeGptError, Result};
use crate::types::Message;
use crate::ui;
use colored::Colorize;

/// Print the history of a session
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `chat_id` - Session to print
/// * `json` - Print the backend response as JSON
///
/// # Errors
///
/// Returns an error if the session does not exist or the backend call fails.
pub async fn handle_history(config: Config, chat_id: String, json: bool) -> Result<()> {
    let backend = build_backend(&config)?;

    let response = match backend.chat_history(&chat_id).await {
        Ok(response) => response,
        Err(err) if is_session_not_found(&err) => {
            return Err(PokeGptError::SessionNotFound(format!(
                "{} ({})",
                chat_id, HISTORY_NOT_FOUND_MESSAGE
            ))
            .into());
        }
        Err(err) => return Err(err),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if let Some(owner) = &response.owner_id {
        let ownership = if response.is_owner { "you" } else { "someone else" };
        println!(
            "{}",
            format!("Session {} owned by {} ({})", chat_id, ui::short_user_id(owner), ownership)
                .dimmed()
        );
    }

    if response.history.is_empty() {
        println!("{}", "No messages in this session yet.".yellow());
        return Ok(());
    }

    for message in response.history.into_iter().map(Message::from) {
        println!("{}\n", ui::render_message(&message));
    }
    Ok(())
}

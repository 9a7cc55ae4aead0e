//! Terminal rendering
//!
//! Pure functions turning controller state into colored text. Nothing here
//! reads input or mutates state; the interactive loop prints what these
//! return.

use colored::Colorize;
use prettytable::{format, row, Table};

use crate::app::{AppNotification, Tab};
use crate::chat::Conversation;
use crate::favorites::FavoritesCoordinator;
use crate::session::{SessionController, SessionPhase};
use crate::types::{Message, Role, ToolCallRecord};

const APP_NAME: &str = "PokéGPT";
const USER_ID_PREFIX_LEN: usize = 8;

/// Example questions shown on an empty conversation
pub const EXAMPLE_QUESTIONS: [&str; 4] = [
    "What are the abilities of Pikachu?",
    "Tell me about the Stench ability",
    "List the first 5 Pokémon",
    "What type is Charizard?",
];

/// Header line with the title, tabs and favorites count
pub fn render_header(tab: Tab, favorites_count: usize) -> String {
    let chat = "Chat".to_string();
    let favorites = format!("Favorites ({})", favorites_count);
    let (chat, favorites) = match tab {
        Tab::Chat => (format!("[{}]", chat).bold().to_string(), favorites.dimmed().to_string()),
        Tab::Favorites => (chat.dimmed().to_string(), format!("[{}]", favorites).bold().to_string()),
    };
    format!("{}  {}  {}", APP_NAME.bold().yellow(), chat, favorites)
}

/// One-line session status, if there is anything to say
pub fn render_session_status(session: &SessionController) -> Option<String> {
    match session.phase() {
        SessionPhase::Idle | SessionPhase::Ready => None,
        SessionPhase::Creating => Some("Creating chat session...".cyan().to_string()),
        SessionPhase::Failed => Some(render_session_failure(
            session.error().unwrap_or("Chat session unavailable."),
            session.awaiting_manual_retry(),
        )),
    }
}

/// Session creation failure with the next step for the user
pub fn render_session_failure(error: &str, awaiting_manual_retry: bool) -> String {
    let hint = if awaiting_manual_retry {
        "Type /retry to try again."
    } else {
        "Retrying automatically..."
    };
    format!("{} {}", error.red(), hint.yellow())
}

/// Greeting shown while the conversation is empty
pub fn render_welcome() -> String {
    let mut out = format!(
        "{}\nAsk any question about Pokémon to get started.\n\n{}\n",
        format!("Welcome to {}!", APP_NAME).bold(),
        "Examples:".bold()
    );
    for example in EXAMPLE_QUESTIONS {
        out.push_str(&format!("  - {}\n", example));
    }
    out
}

/// Card describing one backend tool invocation
pub fn render_tool_call(call: &ToolCallRecord) -> String {
    let parameters = serde_json::to_string_pretty(&call.parameters)
        .unwrap_or_else(|_| "{}".to_string());
    format!(
        "  {} {}\n  {}\n{}\n  {}\n{}\n",
        "Tool Called:".bold(),
        call.tool_name.cyan(),
        "Parameters:".bold(),
        indent(&parameters, 4),
        "Output:".bold(),
        indent(&call.output, 4)
    )
}

/// A single chat bubble, tool cards first
pub fn render_message(message: &Message) -> String {
    let mut out = String::new();
    for call in &message.tool_calls {
        out.push_str(&render_tool_call(call));
    }
    match message.role {
        Role::User => {
            out.push_str(&format!("{} {}", "You:".green().bold(), message.content));
        }
        Role::Assistant if message.is_error => {
            out.push_str(&format!("{} {}", format!("{}:", APP_NAME).yellow().bold(), message.content.red()));
        }
        Role::Assistant => {
            out.push_str(&format!("{} {}", format!("{}:", APP_NAME).yellow().bold(), message.content));
        }
    }
    out
}

/// Indicator shown while a query or history load is outstanding
pub fn render_loading() -> String {
    format!("{} is thinking...", APP_NAME).dimmed().to_string()
}

/// Full conversation view
pub fn render_conversation(conversation: &Conversation) -> String {
    let mut sections = Vec::new();
    if conversation.messages().is_empty() && !conversation.is_loading() {
        sections.push(render_welcome());
    }
    for message in conversation.messages() {
        sections.push(render_message(message));
    }
    if conversation.is_loading() {
        sections.push(render_loading());
    }
    if let Some(error) = conversation.error() {
        sections.push(error.red().to_string());
    }
    sections.join("\n")
}

/// First characters of a user id followed by an ellipsis
///
/// # Examples
///
/// ```
/// use pokegpt::ui::short_user_id;
///
/// assert_eq!(short_user_id("0123456789abcdef"), "01234567...");
/// assert_eq!(short_user_id("abc"), "abc...");
/// ```
pub fn short_user_id(user_id: &str) -> String {
    let prefix: String = user_id.chars().take(USER_ID_PREFIX_LEN).collect();
    format!("{}...", prefix)
}

/// Favorites view: a table of entries, or guidance when empty
pub fn render_favorites(favorites: &FavoritesCoordinator) -> String {
    let mut out = format!("{}\n", "Your Favorite Pokémon".bold());

    if let Some(error) = favorites.error() {
        out.push_str(&format!("{} {}\n", error.red(), "Type /refresh to try again.".yellow()));
    }

    if favorites.entries().is_empty() {
        if favorites.is_loading() {
            out.push_str(&format!("{}\n", "Loading favorites...".dimmed()));
            return out;
        }
        out.push_str("You haven't added any Pokémon to your favorites yet.\n");
        out.push_str(
            "To add a Pokémon to your favorites, ask about a Pokémon and then ask to add it to your favorites.\n",
        );
        if let Some(user_id) = favorites.user_id() {
            out.push_str(&format!("Your user ID: {}\n", short_user_id(user_id)));
        }
        return out;
    }

    out.push_str(&format!("{} Pokémon in favorites", favorites.count()));
    if let Some(user_id) = favorites.user_id() {
        out.push_str(&format!("  User: {}", short_user_id(user_id).cyan()));
    }
    out.push('\n');

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row!["ID".bold(), "Name".bold()]);
    for entry in favorites.entries() {
        table.add_row(row![entry.id.cyan(), entry.name]);
    }
    out.push_str(&table.to_string());
    out
}

/// Line to print for a notification, if it is worth showing
pub fn render_notification(notification: &AppNotification) -> Option<String> {
    match notification {
        AppNotification::SessionChanged {
            phase: SessionPhase::Ready,
            chat_id: Some(chat_id),
        } => Some(format!("Session {}", chat_id.cyan()).dimmed().to_string()),
        AppNotification::SessionChanged { .. } => None,
        AppNotification::LocationChanged(link) => Some(format!("Link: {}", link).dimmed().to_string()),
        AppNotification::RetryScheduled { attempt, delay } => Some(
            format!(
                "Failed to create chat session. Retrying in {:.1}s (attempt {})...",
                delay.as_secs_f64(),
                attempt
            )
            .yellow()
            .to_string(),
        ),
        AppNotification::SessionFailed { error } => Some(render_session_failure(error, true)),
        AppNotification::MessageAppended(message) if message.role == Role::Assistant => {
            Some(render_message(message))
        }
        AppNotification::MessageAppended(_) => None,
        AppNotification::HistoryLoaded { count } if *count > 0 => {
            Some(format!("Loaded {} messages", count).dimmed().to_string())
        }
        AppNotification::HistoryLoaded { .. } => Some(render_welcome()),
        AppNotification::ConversationError(error) => Some(error.red().to_string()),
        AppNotification::ReloadScheduled { delay } => Some(
            format!("Starting a new chat in {}s...", delay.as_secs())
                .yellow()
                .to_string(),
        ),
        AppNotification::FavoritesChanged { .. } => None,
        AppNotification::FavoritesError(error) => Some(error.red().to_string()),
        AppNotification::TabChanged(tab) => Some(format!("Switched to {}", tab).dimmed().to_string()),
    }
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}

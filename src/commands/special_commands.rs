//! Special commands parser for interactive chat
//!
//! Special commands are prefixed with `/` and let the user start a new
//! session, retry failures, switch between the chat and favorites views,
//! manage favorites and leave. Command names are case-insensitive;
//! arguments keep their case.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an argument it does not take
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a fresh chat session
    NewChat,

    /// Retry whatever failed last (session creation or history load)
    Retry,

    /// Switch to the chat view and print the conversation
    ShowChat,

    /// Switch to the favorites view and print the list
    ShowFavorites,

    /// Refetch favorites
    RefreshFavorites,

    /// Add a Pokémon to favorites by name
    AddFavorite(String),

    /// Remove a favorite by id
    RemoveFavorite(String),

    /// Print the shareable link of the session
    ShowLink,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a chat message
    None,
}

/// Parse a user input string into a special command
///
/// # Arguments
///
/// * `input` - The user input string to parse
///
/// # Returns
///
/// Returns Ok(SpecialCommand) for valid commands or SpecialCommand::None for
/// regular chat text.
///
/// # Errors
///
/// Returns CommandError::UnknownCommand for an unrecognized `/` command,
/// CommandError::MissingArgument when `/add` or `/remove` lack their
/// argument, and CommandError::UnsupportedArgument when an argument is given
/// to a command that takes none.
///
/// # Examples
///
/// ```
/// use pokegpt::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewChat);
/// assert_eq!(
///     parse_special_command("/add Mr. Mime").unwrap(),
///     SpecialCommand::AddFavorite("Mr. Mime".to_string())
/// );
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (head, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };
    let name = head.to_lowercase();

    let command = match name.as_str() {
        "/new" => SpecialCommand::NewChat,
        "/retry" => SpecialCommand::Retry,
        "/chat" => SpecialCommand::ShowChat,
        "/favorites" | "/favs" => SpecialCommand::ShowFavorites,
        "/refresh" => SpecialCommand::RefreshFavorites,
        "/link" => SpecialCommand::ShowLink,
        "/help" | "/?" => SpecialCommand::Help,
        "exit" | "quit" | "/exit" | "/quit" => SpecialCommand::Exit,
        "/add" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "/add".to_string(),
                    usage: "/add <pokemon name>".to_string(),
                });
            }
            return Ok(SpecialCommand::AddFavorite(arg.to_string()));
        }
        "/remove" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "/remove".to_string(),
                    usage: "/remove <pokemon id>".to_string(),
                });
            }
            return Ok(SpecialCommand::RemoveFavorite(arg.to_string()));
        }
        _ => return Err(CommandError::UnknownCommand(name)),
    };

    if !arg.is_empty() {
        return Err(CommandError::UnsupportedArgument {
            command: name,
            arg: arg.to_string(),
        });
    }
    Ok(command)
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for PokéGPT
============================

SESSION:
  /new            - Start a new chat session
  /retry          - Retry a failed session creation or history load
  /link           - Show the shareable link for this session

VIEWS:
  /chat           - Show the conversation
  /favorites      - Show your favorite Pokémon
  /favs           - Same as /favorites

FAVORITES:
  /refresh        - Reload favorites from the server
  /add <name>     - Add a Pokémon to favorites
  /remove <id>    - Remove a Pokémon from favorites

OTHER:
  /help           - Show this help message
  /?              - Same as /help
  exit            - Leave PokéGPT
  quit            - Same as exit

NOTES:
  - Commands are case-insensitive
  - Anything else is sent to the assistant
  - Asking the assistant to add or remove a favorite refreshes the list
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_commands() {
        assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewChat);
        assert_eq!(parse_special_command("/retry").unwrap(), SpecialCommand::Retry);
        assert_eq!(parse_special_command("/link").unwrap(), SpecialCommand::ShowLink);
    }

    #[test]
    fn test_parse_view_commands() {
        assert_eq!(parse_special_command("/chat").unwrap(), SpecialCommand::ShowChat);
        assert_eq!(
            parse_special_command("/favorites").unwrap(),
            SpecialCommand::ShowFavorites
        );
        assert_eq!(
            parse_special_command("/favs").unwrap(),
            SpecialCommand::ShowFavorites
        );
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(parse_special_command("/NEW").unwrap(), SpecialCommand::NewChat);
        assert_eq!(parse_special_command("Exit").unwrap(), SpecialCommand::Exit);
        assert_eq!(parse_special_command("/Help").unwrap(), SpecialCommand::Help);
    }

    #[test]
    fn test_parse_add_keeps_argument_case() {
        assert_eq!(
            parse_special_command("/ADD  Mr. Mime ").unwrap(),
            SpecialCommand::AddFavorite("Mr. Mime".to_string())
        );
    }

    #[test]
    fn test_parse_remove_with_id() {
        assert_eq!(
            parse_special_command("/remove 25").unwrap(),
            SpecialCommand::RemoveFavorite("25".to_string())
        );
    }

    #[test]
    fn test_parse_add_without_name() {
        assert!(matches!(
            parse_special_command("/add"),
            Err(CommandError::MissingArgument { .. })
        ));
        assert!(matches!(
            parse_special_command("/remove   "),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_argument_on_plain_command() {
        assert_eq!(
            parse_special_command("/new now"),
            Err(CommandError::UnsupportedArgument {
                command: "/new".to_string(),
                arg: "now".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_special_command("/teleport somewhere"),
            Err(CommandError::UnknownCommand("/teleport".to_string()))
        );
    }

    #[test]
    fn test_parse_regular_text_returns_none() {
        assert_eq!(
            parse_special_command("What type is Charizard?").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(parse_special_command("exit now").unwrap(), SpecialCommand::None);
        assert_eq!(parse_special_command("").unwrap(), SpecialCommand::None);
    }
}

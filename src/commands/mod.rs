/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`: Interactive chat session
- `new`: Create a session and print its link
- `history`: Print a session's messages
- `favorites`: List, add and remove favorites

Handlers build an [`HttpBackend`] from the configuration and drive the
library controllers; they own all terminal output.
*/

use std::sync::Arc;

use crate::api::{ChatBackend, HttpBackend};
use crate::config::Config;
use crate::error::Result;
use crate::location::Location;

// Special commands parser for the interactive loop
pub mod special_commands;

// History command handler
pub mod history;

// Favorites command handler
pub mod favorites;

/// Build the backend client described by `config`
pub fn build_backend(config: &Config) -> Result<Arc<dyn ChatBackend>> {
    Ok(Arc::new(HttpBackend::new(&config.backend)?))
}

/// Resolve the starting location from CLI arguments
///
/// A full link wins; otherwise the configured app URL is used, carrying
/// `chat_id` when one is given.
///
/// # Errors
///
/// Returns an error if the link or the configured app URL is not a valid URL.
///
/// # Examples
///
/// ```
/// use pokegpt::commands::resolve_location;
/// use pokegpt::config::Config;
///
/// let config = Config::default();
/// let location = resolve_location(&config, Some("abc"), None).unwrap();
/// assert_eq!(location.chat_id().as_deref(), Some("abc"));
/// ```
pub fn resolve_location(
    config: &Config,
    chat_id: Option<&str>,
    link: Option<&str>,
) -> Result<Location> {
    if let Some(link) = link {
        return Location::parse(link);
    }
    let mut location = Location::parse(&config.app.base_url)?;
    match chat_id {
        Some(chat_id) => location.set_chat_id(chat_id),
        None => location.remove_chat_id(),
    }
    Ok(location)
}

// New session command handler
pub mod new_chat {
    //! Non-interactive session creation.

    use super::*;

    /// Create a session and print its shareable link
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot create a session.
    pub async fn run_new(config: Config) -> Result<()> {
        let backend = build_backend(&config)?;
        let created = backend.create_chat().await?;
        tracing::info!("Chat session created: {}", created.chat_id);

        let location = resolve_location(&config, Some(&created.chat_id), None)?;
        println!("{}", location);
        Ok(())
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Lines are read by rustyline on a dedicated thread and forwarded over a
    //! channel. The reader only shows the next prompt once the loop asks for
    //! it, so input stays disabled while an exchange is in flight. Timer
    //! deliveries from the [`TokioScheduler`] are multiplexed with input via
    //! `tokio::select!`.

    use super::*;
    use crate::app::{App, AppNotification, Tab};
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::scheduler::TokioScheduler;
    use crate::session::SessionPhase;
    use crate::ui;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use tokio::sync::{broadcast, mpsc};

    enum InputEvent {
        Line(String),
        Closed,
        Failed(String),
    }

    /// Blocking line reader running on its own thread
    struct LineReader {
        prompts: std::sync::mpsc::Sender<String>,
        events: mpsc::Receiver<InputEvent>,
    }

    impl LineReader {
        fn spawn() -> Self {
            let (prompts, prompt_rx) = std::sync::mpsc::channel::<String>();
            let (event_tx, events) = mpsc::channel(1);

            std::thread::spawn(move || {
                let mut editor = match DefaultEditor::new() {
                    Ok(editor) => editor,
                    Err(err) => {
                        let _ = event_tx.blocking_send(InputEvent::Failed(err.to_string()));
                        return;
                    }
                };

                while let Ok(prompt) = prompt_rx.recv() {
                    let event = match editor.readline(&prompt) {
                        Ok(line) => {
                            if !line.trim().is_empty() {
                                let _ = editor.add_history_entry(line.trim());
                            }
                            InputEvent::Line(line)
                        }
                        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                            InputEvent::Closed
                        }
                        Err(err) => InputEvent::Failed(err.to_string()),
                    };
                    let stop = !matches!(event, InputEvent::Line(_));
                    if event_tx.blocking_send(event).is_err() || stop {
                        break;
                    }
                }
            });

            Self { prompts, events }
        }

        fn prompt(&self, prompt: String) {
            let _ = self.prompts.send(prompt);
        }

        async fn next(&mut self) -> InputEvent {
            self.events.recv().await.unwrap_or(InputEvent::Closed)
        }
    }

    /// Start interactive chat
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `chat_id` - Resume this session instead of creating one
    /// * `link` - Resume from a shareable link
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client or the starting location cannot
    /// be built. Failures during the session are shown inline and never end
    /// the loop.
    pub async fn run_chat(
        config: Config,
        chat_id: Option<String>,
        link: Option<String>,
    ) -> Result<()> {
        tracing::info!("Starting interactive chat");

        let location = resolve_location(&config, chat_id.as_deref(), link.as_deref())?;
        let backend = build_backend(&config)?;
        let (scheduler, mut timers) = TokioScheduler::new();

        let mut app = App::new(config, backend, Box::new(scheduler), location);
        let mut notifications = app.subscribe();

        print_welcome_banner();
        app.start().await;
        print_notifications(&mut notifications);

        let mut reader = LineReader::spawn();
        reader.prompt(prompt_for(&app));

        loop {
            tokio::select! {
                event = reader.next() => match event {
                    InputEvent::Line(line) => {
                        if !handle_line(&mut app, &line, &mut notifications).await {
                            break;
                        }
                        reader.prompt(prompt_for(&app));
                    }
                    InputEvent::Closed => break,
                    InputEvent::Failed(err) => {
                        tracing::error!("Readline error: {}", err);
                        break;
                    }
                },
                Some((id, timer)) = timers.recv() => {
                    app.on_timer(id, timer).await;
                    print_notifications(&mut notifications);
                }
            }
        }

        app.shutdown();
        println!("Goodbye!");
        Ok(())
    }

    /// Handle one input line; returns false when the session should end
    async fn handle_line(
        app: &mut App,
        line: &str,
        notifications: &mut broadcast::Receiver<AppNotification>,
    ) -> bool {
        let command = match parse_special_command(line) {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{}", err.to_string().red());
                return true;
            }
        };

        match command {
            SpecialCommand::None => {
                if line.trim().is_empty() {
                    return true;
                }
                if app.send(line).await.is_none() {
                    println!("{}", send_rejected_hint(app).yellow());
                }
                print_notifications(notifications);
            }
            SpecialCommand::NewChat => {
                app.new_chat().await;
                print_notifications(notifications);
                if app.session().phase() == SessionPhase::Ready {
                    println!("{}", ui::render_conversation(app.conversation()));
                }
            }
            SpecialCommand::Retry => {
                app.retry().await;
                print_notifications(notifications);
            }
            SpecialCommand::ShowChat => {
                app.switch_tab(Tab::Chat).await;
                drain(notifications);
                println!("{}", ui::render_header(app.tab(), app.favorites().count()));
                if let Some(status) = ui::render_session_status(app.session()) {
                    println!("{}", status);
                }
                println!("{}", ui::render_conversation(app.conversation()));
            }
            SpecialCommand::ShowFavorites => {
                app.switch_tab(Tab::Favorites).await;
                drain(notifications);
                println!("{}", ui::render_header(app.tab(), app.favorites().count()));
                println!("{}", ui::render_favorites(app.favorites()));
            }
            SpecialCommand::RefreshFavorites => {
                app.refresh_favorites().await;
                drain(notifications);
                println!("{}", ui::render_favorites(app.favorites()));
            }
            SpecialCommand::AddFavorite(name) => {
                if app.add_favorite(&name).await {
                    println!("{}", format!("Added {} to your favorites", name).green());
                }
                print_notifications(notifications);
            }
            SpecialCommand::RemoveFavorite(id) => {
                if app.remove_favorite(&id).await {
                    println!(
                        "{}",
                        format!(
                            "Removed {} from your favorites ({} left)",
                            id,
                            app.favorites().count()
                        )
                        .green()
                    );
                }
                print_notifications(notifications);
            }
            SpecialCommand::ShowLink => println!("{}", app.location()),
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit => return false,
        }
        true
    }

    fn send_rejected_hint(app: &App) -> &'static str {
        if app.conversation().invalid_chat_id() {
            "This chat session is no longer valid. Type /new to start a new chat."
        } else if app.session().phase() == SessionPhase::Failed {
            "No chat session. Type /retry to try again."
        } else {
            "No chat session yet. Please wait..."
        }
    }

    fn prompt_for(app: &App) -> String {
        let label = match app.tab() {
            Tab::Chat => "pokegpt",
            Tab::Favorites => "pokegpt:favorites",
        };
        if app.conversation().accepts_input() && app.session().phase() == SessionPhase::Ready {
            format!("{}> ", label.yellow().bold())
        } else {
            format!("{}> ", label.dimmed())
        }
    }

    fn print_notifications(notifications: &mut broadcast::Receiver<AppNotification>) {
        loop {
            match notifications.try_recv() {
                Ok(notification) => {
                    if let Some(line) = ui::render_notification(&notification) {
                        println!("{}", line);
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("Skipped {} notifications", skipped);
                }
                Err(_) => break,
            }
        }
    }

    fn drain(notifications: &mut broadcast::Receiver<AppNotification>) {
        while !matches!(
            notifications.try_recv(),
            Err(broadcast::error::TryRecvError::Empty) | Err(broadcast::error::TryRecvError::Closed)
        ) {}
    }

    fn print_welcome_banner() {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                 PokéGPT - Your Pokémon Assistant             ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }
}

//! Application state and effect execution
//!
//! [`App`] composes the session controller, the conversation and the
//! favorites coordinator. User actions and fired timers come in through its
//! methods; every visible change goes out as an [`AppNotification`] on a
//! broadcast channel so any surface can re-render from it.
//!
//! All mutation happens on the task that owns the `App`. Network calls are
//! awaited inline, and timers go through the injected
//! [`Scheduler`](crate::scheduler::Scheduler).

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::api::ChatBackend;
use crate::chat::{Conversation, HistoryOutcome, SendOutcome};
use crate::config::Config;
use crate::favorites::{FavoriteActionDetector, FavoritesCoordinator};
use crate::location::Location;
use crate::scheduler::{Scheduler, Timer, TimerId};
use crate::session::{
    RetryPolicy, SessionController, SessionEffect, SessionEvent, SessionPhase,
    CREATE_FAILED_MESSAGE,
};
use crate::types::Message;

const NOTIFICATION_CAPACITY: usize = 256;

/// Top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Conversation view
    #[default]
    Chat,
    /// Favorites list
    Favorites,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat => write!(f, "Chat"),
            Self::Favorites => write!(f, "Favorites"),
        }
    }
}

/// Change published to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum AppNotification {
    /// Session phase or id changed
    SessionChanged {
        /// New phase
        phase: SessionPhase,
        /// Active chat id
        chat_id: Option<String>,
    },
    /// The navigable URL changed
    LocationChanged(String),
    /// Session creation failed; an automatic retry is pending
    RetryScheduled {
        /// 1-based retry number
        attempt: u32,
        /// Delay before the retry
        delay: Duration,
    },
    /// Session creation failed and no automatic retry remains
    SessionFailed {
        /// User-visible error
        error: String,
    },
    /// A message was appended to the conversation
    MessageAppended(Message),
    /// The conversation was replaced by loaded history
    HistoryLoaded {
        /// Number of messages loaded
        count: usize,
    },
    /// The conversation shows an error banner
    ConversationError(String),
    /// The session was invalidated and will reload after a delay
    ReloadScheduled {
        /// Delay before reload
        delay: Duration,
    },
    /// Favorites cache was updated
    FavoritesChanged {
        /// New favorites count
        count: usize,
    },
    /// A favorites operation failed
    FavoritesError(String),
    /// The active tab changed
    TabChanged(Tab),
}

/// The PokéGPT client application
pub struct App {
    config: Config,
    backend: Arc<dyn ChatBackend>,
    scheduler: Box<dyn Scheduler>,
    location: Location,
    session: SessionController,
    conversation: Conversation,
    favorites: FavoritesCoordinator,
    tab: Tab,
    retry_timer: Option<TimerId>,
    reload_timer: Option<TimerId>,
    poll_timer: Option<TimerId>,
    notifier: broadcast::Sender<AppNotification>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("location", &self.location)
            .field("phase", &self.session.phase())
            .field("tab", &self.tab)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create an application; nothing happens until [`App::start`]
    pub fn new(
        config: Config,
        backend: Arc<dyn ChatBackend>,
        scheduler: Box<dyn Scheduler>,
        location: Location,
    ) -> Self {
        let (notifier, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        let session = SessionController::new(RetryPolicy::from(&config.session));
        let favorites =
            FavoritesCoordinator::new(FavoriteActionDetector::new(&config.favorites));
        Self {
            config,
            backend,
            scheduler,
            location,
            session,
            conversation: Conversation::new(),
            favorites,
            tab: Tab::Chat,
            retry_timer: None,
            reload_timer: None,
            poll_timer: None,
            notifier,
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<AppNotification> {
        self.notifier.subscribe()
    }

    /// Session lifecycle state
    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// Visible conversation
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Favorites cache
    pub fn favorites(&self) -> &FavoritesCoordinator {
        &self.favorites
    }

    /// Current navigable URL
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Active tab
    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Initial load: resume or create the session, start favorites polling
    pub async fn start(&mut self) {
        let url_chat_id = self.location.chat_id();
        self.run_session(SessionEvent::Boot { url_chat_id }).await;
        self.refresh_favorites().await;
        self.schedule_poll();
    }

    /// Start a fresh chat session
    pub async fn new_chat(&mut self) {
        self.run_session(SessionEvent::NewChat).await;
    }

    /// Manual retry of whatever failed last
    ///
    /// A failed session creation is retried with a fresh attempt budget;
    /// otherwise a failed history load is reloaded.
    pub async fn retry(&mut self) {
        if self.session.phase() == SessionPhase::Failed {
            self.run_session(SessionEvent::ManualRetry).await;
            return;
        }
        if let Some(chat_id) = self.ready_chat_id().map(str::to_string) {
            if self.conversation.error().is_some() && !self.conversation.invalid_chat_id() {
                self.load_history(&chat_id).await;
            }
        }
    }

    /// Send a user message
    ///
    /// Returns `None` when the input was rejected (blank text, invalid or
    /// missing session) and nothing was sent.
    pub async fn send(&mut self, text: &str) -> Option<SendOutcome> {
        let chat_id = self.ready_chat_id().map(str::to_string);
        let pending = self.conversation.begin_send(chat_id.as_deref(), text)?;
        self.notify(AppNotification::MessageAppended(Message::user(
            pending.text.clone(),
        )));

        let result = self.backend.query(&pending.chat_id, &pending.text).await;
        let outcome = self.conversation.complete_send(pending, result);

        match &outcome {
            SendOutcome::Replied(reply) => {
                self.notify(AppNotification::MessageAppended(reply.clone()));
                if self
                    .favorites
                    .refresh_if_changed(self.backend.as_ref(), reply)
                    .await
                {
                    self.notify_favorites();
                }
            }
            SendOutcome::SessionInvalid => {
                if let Some(error) = self.conversation.error() {
                    self.notify(AppNotification::ConversationError(error.to_string()));
                }
            }
            SendOutcome::Failed => {
                if let Some(bubble) = self.conversation.messages().last() {
                    self.notify(AppNotification::MessageAppended(bubble.clone()));
                }
            }
        }

        Some(outcome)
    }

    /// Switch the active tab; entering favorites refreshes them
    pub async fn switch_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.notify(AppNotification::TabChanged(tab));
        }
        if tab == Tab::Favorites {
            self.refresh_favorites().await;
        }
    }

    /// Refetch the favorites list
    pub async fn refresh_favorites(&mut self) {
        self.favorites.fetch_all(self.backend.as_ref()).await;
        self.notify_favorites();
    }

    /// Remove a favorite by id
    pub async fn remove_favorite(&mut self, id: &str) -> bool {
        let removed = self.favorites.remove(self.backend.as_ref(), id).await;
        self.notify_favorites();
        removed
    }

    /// Add a favorite by name
    pub async fn add_favorite(&mut self, name: &str) -> bool {
        let added = self.favorites.add(self.backend.as_ref(), name).await;
        self.notify_favorites();
        added
    }

    /// Handle a fired timer
    ///
    /// Cancelled or superseded timers are ignored.
    pub async fn on_timer(&mut self, id: TimerId, timer: Timer) {
        if !self.scheduler.fired(id) {
            tracing::debug!("Ignoring stale timer {:?} ({:?})", id, timer);
            return;
        }

        match timer {
            Timer::SessionRetry { attempt } => {
                if self.retry_timer != Some(id) {
                    return;
                }
                self.retry_timer = None;
                self.run_session(SessionEvent::RetryDue { attempt }).await;
            }
            Timer::FavoritesPoll => {
                if self.poll_timer != Some(id) {
                    return;
                }
                self.poll_timer = None;
                self.refresh_favorites().await;
                self.schedule_poll();
            }
            Timer::InvalidSessionReload => {
                if self.reload_timer != Some(id) {
                    return;
                }
                self.reload_timer = None;
                self.reload().await;
            }
        }
    }

    /// Cancel all timers
    pub fn shutdown(&mut self) {
        self.scheduler.cancel_all();
        self.retry_timer = None;
        self.reload_timer = None;
        self.poll_timer = None;
        tracing::debug!("Application timers cleared");
    }

    fn ready_chat_id(&self) -> Option<&str> {
        if self.session.phase() == SessionPhase::Ready {
            self.session.chat_id()
        } else {
            None
        }
    }

    async fn reload(&mut self) {
        tracing::info!("Reloading after invalid session");
        self.run_session(SessionEvent::Reset).await;
        self.conversation.reset();
        let url_chat_id = self.location.chat_id();
        self.run_session(SessionEvent::Boot { url_chat_id }).await;
    }

    async fn run_session(&mut self, event: SessionEvent) {
        let mut queue: VecDeque<SessionEffect> = self.session.apply(event).into();
        self.notify_session();

        while let Some(effect) = queue.pop_front() {
            match effect {
                SessionEffect::CreateSession => {
                    tracing::info!("Creating new chat session");
                    let event = match self.backend.create_chat().await {
                        Ok(response) => SessionEvent::CreateSucceeded {
                            chat_id: response.chat_id,
                        },
                        Err(err) => SessionEvent::CreateFailed {
                            reason: format!("{:#}", err),
                        },
                    };
                    queue.extend(self.session.apply(event));
                    self.notify_session();
                    if self.session.awaiting_manual_retry() {
                        let error = self
                            .session
                            .error()
                            .unwrap_or(CREATE_FAILED_MESSAGE)
                            .to_string();
                        self.notify(AppNotification::SessionFailed { error });
                    }
                }
                SessionEffect::PersistChatId(chat_id) => {
                    self.location.set_chat_id(&chat_id);
                    self.notify(AppNotification::LocationChanged(self.location.to_string()));
                }
                SessionEffect::ScheduleRetry { attempt, delay } => {
                    if let Some(previous) = self.retry_timer.take() {
                        self.scheduler.cancel(previous);
                    }
                    self.retry_timer = Some(
                        self.scheduler
                            .schedule(delay, Timer::SessionRetry { attempt }),
                    );
                    self.notify(AppNotification::RetryScheduled { attempt, delay });
                }
                SessionEffect::CancelRetry => {
                    if let Some(previous) = self.retry_timer.take() {
                        self.scheduler.cancel(previous);
                    }
                }
                SessionEffect::ShowChatTab => {
                    if self.tab != Tab::Chat {
                        self.tab = Tab::Chat;
                        self.notify(AppNotification::TabChanged(Tab::Chat));
                    }
                }
                SessionEffect::LoadHistory(chat_id) => {
                    if let Some(reload) = self.reload_timer.take() {
                        self.scheduler.cancel(reload);
                    }
                    self.conversation.reset();
                    self.load_history(&chat_id).await;
                }
            }
        }
    }

    async fn load_history(&mut self, chat_id: &str) {
        let outcome = self
            .conversation
            .load_history(self.backend.as_ref(), chat_id)
            .await;

        match outcome {
            HistoryOutcome::Loaded { owner_id, is_owner } => {
                self.session.set_owner(owner_id, is_owner);
                self.notify(AppNotification::HistoryLoaded {
                    count: self.conversation.messages().len(),
                });
            }
            HistoryOutcome::NotFound => {
                self.location.remove_chat_id();
                self.notify(AppNotification::LocationChanged(self.location.to_string()));
                self.notify_conversation_error();

                let delay = self.config.session.invalid_session_reload();
                if let Some(previous) = self.reload_timer.take() {
                    self.scheduler.cancel(previous);
                }
                self.reload_timer = Some(self.scheduler.schedule(delay, Timer::InvalidSessionReload));
                self.notify(AppNotification::ReloadScheduled { delay });
            }
            HistoryOutcome::Failed => self.notify_conversation_error(),
        }
    }

    fn schedule_poll(&mut self) {
        if let Some(previous) = self.poll_timer.take() {
            self.scheduler.cancel(previous);
        }
        let interval = self.config.favorites.poll_interval();
        self.poll_timer = Some(self.scheduler.schedule(interval, Timer::FavoritesPoll));
    }

    fn notify(&self, notification: AppNotification) {
        // No subscribers is fine.
        let _ = self.notifier.send(notification);
    }

    fn notify_session(&self) {
        self.notify(AppNotification::SessionChanged {
            phase: self.session.phase(),
            chat_id: self.session.chat_id().map(str::to_string),
        });
    }

    fn notify_conversation_error(&self) {
        if let Some(error) = self.conversation.error() {
            self.notify(AppNotification::ConversationError(error.to_string()));
        }
    }

    fn notify_favorites(&self) {
        match self.favorites.error() {
            Some(error) => self.notify(AppNotification::FavoritesError(error.to_string())),
            None => self.notify(AppNotification::FavoritesChanged {
                count: self.favorites.count(),
            }),
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

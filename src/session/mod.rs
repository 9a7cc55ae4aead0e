//! Session lifecycle controller
//!
//! Owns the active chat id and walks it through
//! `Idle -> Creating -> Ready | Failed`. The controller is a reducer:
//! [`SessionController::apply`] takes an event, updates state and returns the
//! [`SessionEffect`]s the application must carry out (network calls, URL
//! writes, timers). It never performs I/O itself.

use std::fmt;
use std::time::Duration;

use crate::types::Session;

mod retry;

pub use retry::{RetryDecision, RetryPolicy};

/// User-visible message after a failed creation
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create chat session. Please try again.";

/// Lifecycle phase of the active session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Nothing started yet
    #[default]
    Idle,
    /// Waiting on the create-session call
    Creating,
    /// A chat id is active
    Ready,
    /// The last creation attempt failed
    Failed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Creating => write!(f, "creating"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Inputs to the session reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Initial load, with the chat id found in the URL if any
    Boot {
        /// Chat id carried by the navigable URL
        url_chat_id: Option<String>,
    },
    /// User asked for a fresh chat
    NewChat,
    /// Create-session call returned an id
    CreateSucceeded {
        /// Identifier of the new session
        chat_id: String,
    },
    /// Create-session call failed
    CreateFailed {
        /// Failure description, for logs
        reason: String,
    },
    /// Automatic retry timer fired
    RetryDue {
        /// 1-based retry number
        attempt: u32,
    },
    /// User pressed retry
    ManualRetry,
    /// Drop the session entirely (used before a reload)
    Reset,
}

/// Work the application performs on behalf of the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    /// Call the create-session endpoint
    CreateSession,
    /// Write the chat id into the navigable URL
    PersistChatId(String),
    /// Schedule an automatic retry
    ScheduleRetry {
        /// 1-based retry number
        attempt: u32,
        /// Delay before the retry
        delay: Duration,
    },
    /// Cancel a pending automatic retry, if any
    CancelRetry,
    /// Switch the view back to the chat tab
    ShowChatTab,
    /// Load the history of this chat id
    LoadHistory(String),
}

/// Session lifecycle state machine
#[derive(Debug, Clone)]
pub struct SessionController {
    phase: SessionPhase,
    session: Option<Session>,
    error: Option<String>,
    retries: u32,
    policy: RetryPolicy,
}

impl SessionController {
    /// Create an idle controller
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            phase: SessionPhase::Idle,
            session: None,
            error: None,
            retries: 0,
            policy,
        }
    }

    /// Current phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Active session, if any
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Active chat id, if any
    pub fn chat_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.id.as_str())
    }

    /// User-visible error from the last creation attempt
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Automatic retries run since the last success or manual retry
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// True when creation failed and no automatic retry remains
    pub fn awaiting_manual_retry(&self) -> bool {
        self.phase == SessionPhase::Failed && self.policy.next(self.retries).is_none()
    }

    /// Record owner information reported alongside the history
    pub fn set_owner(&mut self, owner_id: Option<String>, is_owner: bool) {
        if let Some(session) = self.session.as_mut() {
            session.owner_id = owner_id;
            session.is_owner = is_owner;
        }
    }

    /// Apply an event and return the effects to execute, in order
    pub fn apply(&mut self, event: SessionEvent) -> Vec<SessionEffect> {
        match event {
            SessionEvent::Boot { url_chat_id } => {
                if self.phase != SessionPhase::Idle {
                    tracing::warn!("Ignoring boot while session is {}", self.phase);
                    return Vec::new();
                }
                match url_chat_id {
                    Some(chat_id) => {
                        tracing::info!("Using chat id from URL: {}", chat_id);
                        self.phase = SessionPhase::Ready;
                        self.session = Some(Session::new(chat_id.clone()));
                        vec![SessionEffect::LoadHistory(chat_id)]
                    }
                    None => {
                        tracing::info!("No chat id in URL, creating new chat");
                        self.begin_create()
                    }
                }
            }
            SessionEvent::NewChat => {
                let mut effects = vec![SessionEffect::CancelRetry];
                effects.extend(self.begin_create());
                effects
            }
            SessionEvent::CreateSucceeded { chat_id } => {
                tracing::info!("Chat session created: {}", chat_id);
                self.phase = SessionPhase::Ready;
                self.session = Some(Session::new(chat_id.clone()));
                self.error = None;
                self.retries = 0;
                vec![
                    SessionEffect::PersistChatId(chat_id.clone()),
                    SessionEffect::ShowChatTab,
                    SessionEffect::LoadHistory(chat_id),
                ]
            }
            SessionEvent::CreateFailed { reason } => {
                tracing::error!("Error creating chat: {}", reason);
                self.phase = SessionPhase::Failed;
                self.error = Some(CREATE_FAILED_MESSAGE.to_string());
                match self.policy.next(self.retries) {
                    Some(decision) => vec![SessionEffect::ScheduleRetry {
                        attempt: decision.attempt,
                        delay: decision.delay,
                    }],
                    None => {
                        tracing::warn!(
                            "Chat creation failed {} automatic retries, waiting for manual retry",
                            self.retries
                        );
                        Vec::new()
                    }
                }
            }
            SessionEvent::RetryDue { attempt } => {
                if self.phase != SessionPhase::Failed {
                    tracing::debug!("Dropping retry {} while session is {}", attempt, self.phase);
                    return Vec::new();
                }
                tracing::info!("Retrying chat creation (attempt {})", attempt);
                self.retries = attempt;
                self.begin_create()
            }
            SessionEvent::ManualRetry => {
                self.retries = 0;
                let mut effects = vec![SessionEffect::CancelRetry];
                effects.extend(self.begin_create());
                effects
            }
            SessionEvent::Reset => {
                self.phase = SessionPhase::Idle;
                self.session = None;
                self.error = None;
                self.retries = 0;
                vec![SessionEffect::CancelRetry]
            }
        }
    }

    fn begin_create(&mut self) -> Vec<SessionEffect> {
        self.phase = SessionPhase::Creating;
        self.error = None;
        vec![SessionEffect::CreateSession]
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(controller: &mut SessionController) -> Vec<SessionEffect> {
        controller.apply(SessionEvent::CreateFailed {
            reason: "connection refused".to_string(),
        })
    }

    #[test]
    fn test_boot_with_url_chat_id_is_ready_without_create() {
        let mut controller = SessionController::default();
        let effects = controller.apply(SessionEvent::Boot {
            url_chat_id: Some("abc".to_string()),
        });
        assert_eq!(controller.phase(), SessionPhase::Ready);
        assert_eq!(controller.chat_id(), Some("abc"));
        assert_eq!(effects, vec![SessionEffect::LoadHistory("abc".to_string())]);
    }

    #[test]
    fn test_boot_without_chat_id_creates() {
        let mut controller = SessionController::default();
        let effects = controller.apply(SessionEvent::Boot { url_chat_id: None });
        assert_eq!(controller.phase(), SessionPhase::Creating);
        assert_eq!(effects, vec![SessionEffect::CreateSession]);
    }

    #[test]
    fn test_second_boot_is_ignored() {
        let mut controller = SessionController::default();
        controller.apply(SessionEvent::Boot { url_chat_id: None });
        let effects = controller.apply(SessionEvent::Boot {
            url_chat_id: Some("x".to_string()),
        });
        assert!(effects.is_empty());
        assert_eq!(controller.phase(), SessionPhase::Creating);
    }

    #[test]
    fn test_create_success_persists_and_resets() {
        let mut controller = SessionController::default();
        controller.apply(SessionEvent::Boot { url_chat_id: None });
        failed(&mut controller);
        controller.apply(SessionEvent::RetryDue { attempt: 1 });
        let effects = controller.apply(SessionEvent::CreateSucceeded {
            chat_id: "new-id".to_string(),
        });

        assert_eq!(controller.phase(), SessionPhase::Ready);
        assert_eq!(controller.retries(), 0);
        assert!(controller.error().is_none());
        assert_eq!(
            effects,
            vec![
                SessionEffect::PersistChatId("new-id".to_string()),
                SessionEffect::ShowChatTab,
                SessionEffect::LoadHistory("new-id".to_string()),
            ]
        );
    }

    #[test]
    fn test_failure_schedules_retry_with_fixed_delay() {
        let mut controller = SessionController::default();
        controller.apply(SessionEvent::Boot { url_chat_id: None });
        let effects = failed(&mut controller);

        assert_eq!(controller.phase(), SessionPhase::Failed);
        assert_eq!(controller.error(), Some(CREATE_FAILED_MESSAGE));
        assert_eq!(
            effects,
            vec![SessionEffect::ScheduleRetry {
                attempt: 1,
                delay: Duration::from_millis(2000),
            }]
        );
    }

    #[test]
    fn test_three_failed_retries_wait_for_manual_retry() {
        let mut controller = SessionController::default();
        controller.apply(SessionEvent::Boot { url_chat_id: None });

        let mut effects = failed(&mut controller);
        for attempt in 1..=3 {
            assert_eq!(
                effects,
                vec![SessionEffect::ScheduleRetry {
                    attempt,
                    delay: Duration::from_millis(2000),
                }]
            );
            assert_eq!(
                controller.apply(SessionEvent::RetryDue { attempt }),
                vec![SessionEffect::CreateSession]
            );
            effects = failed(&mut controller);
        }

        assert!(effects.is_empty());
        assert_eq!(controller.phase(), SessionPhase::Failed);
        assert!(controller.awaiting_manual_retry());

        let effects = controller.apply(SessionEvent::ManualRetry);
        assert_eq!(
            effects,
            vec![SessionEffect::CancelRetry, SessionEffect::CreateSession]
        );
        assert_eq!(controller.retries(), 0);
        assert_eq!(controller.phase(), SessionPhase::Creating);

        assert_eq!(
            failed(&mut controller),
            vec![SessionEffect::ScheduleRetry {
                attempt: 1,
                delay: Duration::from_millis(2000),
            }]
        );
    }

    #[test]
    fn test_retry_due_outside_failed_is_dropped() {
        let mut controller = SessionController::default();
        controller.apply(SessionEvent::Boot {
            url_chat_id: Some("abc".to_string()),
        });
        assert!(controller
            .apply(SessionEvent::RetryDue { attempt: 1 })
            .is_empty());
        assert_eq!(controller.phase(), SessionPhase::Ready);
    }

    #[test]
    fn test_new_chat_cancels_pending_retry() {
        let mut controller = SessionController::default();
        controller.apply(SessionEvent::Boot { url_chat_id: None });
        failed(&mut controller);
        let effects = controller.apply(SessionEvent::NewChat);
        assert_eq!(
            effects,
            vec![SessionEffect::CancelRetry, SessionEffect::CreateSession]
        );
        assert!(controller.error().is_none());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut controller = SessionController::default();
        controller.apply(SessionEvent::Boot {
            url_chat_id: Some("abc".to_string()),
        });
        controller.apply(SessionEvent::Reset);
        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert!(controller.chat_id().is_none());

        let effects = controller.apply(SessionEvent::Boot { url_chat_id: None });
        assert_eq!(effects, vec![SessionEffect::CreateSession]);
    }

    #[test]
    fn test_set_owner() {
        let mut controller = SessionController::default();
        controller.apply(SessionEvent::Boot {
            url_chat_id: Some("abc".to_string()),
        });
        controller.set_owner(Some("u1".to_string()), true);
        let session = controller.session().unwrap();
        assert_eq!(session.owner_id.as_deref(), Some("u1"));
        assert!(session.is_owner);
    }
}

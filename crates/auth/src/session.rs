//! Session state machine.
//!
//! ```text
//! LoggedOut --login(ok)--> LoggedIn --logout(confirmed)--> LoggedOut
//! ```
//!
//! The gate always starts `LoggedOut`. The `logged_in` marker it writes is
//! informational only and is never used to restore a session.

use chrono::{DateTime, Utc};
use thiserror::Error;

use stockroom_core::{Confirmation, Entity, Notification, Notifier, SessionId};
use stockroom_storage::{KeyValueStore, StorageError};

use crate::credentials::CredentialPolicy;

pub const KEY_LOGGED_IN: &str = "logged_in";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("not logged in")]
    NotLoggedIn,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub username: String,
    pub started_at: DateTime<Utc>,
}

impl Entity for Session {
    type Id = SessionId;

    fn id(&self) -> &SessionId {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn(Session),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut(Session),
    Cancelled,
}

/// Login gate.
#[derive(Debug)]
pub struct SessionGate<S, N> {
    storage: S,
    notifier: N,
    policy: CredentialPolicy,
    state: SessionState,
    login_error: bool,
}

impl<S: KeyValueStore, N: Notifier> SessionGate<S, N> {
    pub fn new(storage: S, notifier: N, policy: CredentialPolicy) -> Self {
        match storage.get(KEY_LOGGED_IN) {
            Ok(Some(_)) => tracing::debug!("ignoring login marker from a previous run"),
            Ok(None) => {}
            Err(err) => tracing::debug!(error = %err, "could not read login marker"),
        }

        Self {
            storage,
            notifier,
            policy,
            state: SessionState::LoggedOut,
            login_error: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::LoggedIn(session) => Some(session),
            SessionState::LoggedOut => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.session().is_some()
    }

    /// Set by a failed login, cleared by a successful one.
    pub fn login_error(&self) -> bool {
        self.login_error
    }

    /// Check the credentials and open a session.
    ///
    /// Logging in while already logged in replaces the session.
    pub fn login(&mut self, username: &str, password: &str) -> Result<Session, AuthError> {
        if !self.policy.accepts(username, password) {
            tracing::info!(username, "login rejected");
            self.login_error = true;
            return Err(AuthError::InvalidCredentials);
        }

        self.storage.set(KEY_LOGGED_IN, "true")?;

        let session = Session {
            id: SessionId::new(),
            username: username.to_string(),
            started_at: Utc::now(),
        };
        tracing::info!(username, session_id = %session.id, "login accepted");

        self.login_error = false;
        self.notifier.notify(Notification::success("Login Successful"));

        self.state = SessionState::LoggedIn(session.clone());
        Ok(session)
    }

    /// Ask for confirmation, then close the session.
    pub fn logout(&mut self) -> Result<LogoutOutcome, AuthError> {
        if !self.is_logged_in() {
            return Err(AuthError::NotLoggedIn);
        }

        if !self.notifier.confirm(&Confirmation::logout()) {
            tracing::debug!("logout cancelled");
            return Ok(LogoutOutcome::Cancelled);
        }

        self.storage.remove(KEY_LOGGED_IN)?;

        let SessionState::LoggedIn(session) = std::mem::take(&mut self.state) else {
            return Err(AuthError::NotLoggedIn);
        };
        tracing::info!(session_id = %session.id, "logged out");
        self.notifier.notify(Notification::warning("Logged out"));
        Ok(LogoutOutcome::LoggedOut(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::{RecordingNotifier, Severity};
    use stockroom_storage::InMemoryStore;

    fn gate<'a>(
        storage: &'a InMemoryStore,
        notifier: &'a RecordingNotifier,
    ) -> SessionGate<&'a InMemoryStore, &'a RecordingNotifier> {
        SessionGate::new(storage, notifier, CredentialPolicy::default())
    }

    #[test]
    fn correct_credentials_log_in() {
        let storage = InMemoryStore::new();
        let notifier = RecordingNotifier::new();
        let mut gate = gate(&storage, &notifier);

        let session = gate.login("admin", "admin123").unwrap();
        assert_eq!(session.username, "admin");

        assert!(gate.is_logged_in());
        assert!(!gate.login_error());
        assert_eq!(storage.get(KEY_LOGGED_IN).unwrap().as_deref(), Some("true"));
        assert_eq!(
            notifier.messages(),
            vec![(Severity::Success, "Login Successful".to_string())]
        );
    }

    #[test]
    fn wrong_password_sets_error_flag_only() {
        let storage = InMemoryStore::new();
        let notifier = RecordingNotifier::new();
        let mut gate = gate(&storage, &notifier);

        let err = gate.login("admin", "wrong").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(!gate.is_logged_in());
        assert!(gate.login_error());
        assert!(storage.get(KEY_LOGGED_IN).unwrap().is_none());
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn successful_login_clears_previous_error() {
        let storage = InMemoryStore::new();
        let notifier = RecordingNotifier::new();
        let mut gate = gate(&storage, &notifier);

        gate.login("admin", "nope").unwrap_err();
        gate.login("admin", "admin123").unwrap();
        assert!(!gate.login_error());
    }

    #[test]
    fn stale_marker_does_not_restore_session() {
        let storage = InMemoryStore::with_entries([(KEY_LOGGED_IN, "true")]);
        let notifier = RecordingNotifier::new();
        let gate = gate(&storage, &notifier);

        assert_eq!(gate.state(), &SessionState::LoggedOut);
    }

    #[test]
    fn confirmed_logout_removes_marker() {
        let storage = InMemoryStore::new();
        let notifier = RecordingNotifier::accepting();
        let mut gate = gate(&storage, &notifier);
        let session_id = gate.login("admin", "admin123").unwrap().id;

        let outcome = gate.logout().unwrap();
        assert!(matches!(outcome, LogoutOutcome::LoggedOut(ref s) if s.is(&session_id)));
        assert!(!gate.is_logged_in());
        assert!(storage.get(KEY_LOGGED_IN).unwrap().is_none());
        assert_eq!(notifier.prompts(), vec![Confirmation::logout()]);
        let last = notifier.last().unwrap();
        assert_eq!((last.severity, last.message.as_str()), (Severity::Warning, "Logged out"));
    }

    #[test]
    fn cancelled_logout_keeps_session() {
        let storage = InMemoryStore::new();
        let notifier = RecordingNotifier::declining();
        let mut gate = gate(&storage, &notifier);
        gate.login("admin", "admin123").unwrap();
        notifier.clear();

        assert_eq!(gate.logout().unwrap(), LogoutOutcome::Cancelled);
        assert!(gate.is_logged_in());
        assert_eq!(storage.get(KEY_LOGGED_IN).unwrap().as_deref(), Some("true"));
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn logout_when_logged_out_is_an_error() {
        let storage = InMemoryStore::new();
        let notifier = RecordingNotifier::accepting();
        let mut gate = gate(&storage, &notifier);

        assert!(matches!(gate.logout(), Err(AuthError::NotLoggedIn)));
        assert!(notifier.prompts().is_empty());
    }

    #[test]
    fn custom_policy_is_honoured() {
        let storage = InMemoryStore::new();
        let notifier = RecordingNotifier::new();
        let mut gate = SessionGate::new(&storage, &notifier, CredentialPolicy::new("ops", "pw"));

        assert!(gate.login("admin", "admin123").is_err());
        assert!(gate.login("ops", "pw").is_ok());
    }

    #[test]
    fn marker_write_failure_keeps_gate_closed() {
        let storage = InMemoryStore::new();
        storage.fail_writes(true);
        let notifier = RecordingNotifier::new();
        let mut gate = gate(&storage, &notifier);

        assert!(matches!(
            gate.login("admin", "admin123"),
            Err(AuthError::Storage(_))
        ));
        assert!(!gate.is_logged_in());
    }
}

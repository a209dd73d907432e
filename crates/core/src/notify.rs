//! Notification boundary: transient messages and confirmation prompts.
//!
//! Domain operations report outcomes to the user through a [`Notifier`]
//! instead of a concrete widget toolkit. Destructive operations (delete,
//! logout) ask [`Notifier::confirm`] first and only mutate state on `true`.

use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How long a transient message stays visible unless overridden.
pub const DEFAULT_DISPLAY_DURATION: Duration = Duration::from_millis(2000);

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transient, fire-and-forget message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub at: DateTime<Utc>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
            at: Utc::now(),
            duration: DEFAULT_DISPLAY_DURATION,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(Severity::Danger, message)
    }
}

/// A yes/no question shown before a destructive action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub header: String,
    pub message: String,
    pub confirm_label: String,
}

impl Confirmation {
    pub fn new(
        header: impl Into<String>,
        message: impl Into<String>,
        confirm_label: impl Into<String>,
    ) -> Self {
        Self {
            header: header.into(),
            message: message.into(),
            confirm_label: confirm_label.into(),
        }
    }

    pub fn delete_item() -> Self {
        Self::new(
            "Confirm Delete",
            "Are you sure you want to delete this item?",
            "Delete",
        )
    }

    pub fn logout() -> Self {
        Self::new("Confirm Logout", "Are you sure you want to log out?", "Logout")
    }
}

/// Presentation collaborator used by the inventory store and session gate.
pub trait Notifier {
    /// Show a transient message.
    fn notify(&self, notification: Notification);

    /// Ask the user to confirm; `false` means cancelled.
    fn confirm(&self, confirmation: &Confirmation) -> bool;
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }

    fn confirm(&self, confirmation: &Confirmation) -> bool {
        (**self).confirm(confirmation)
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }

    fn confirm(&self, confirmation: &Confirmation) -> bool {
        (**self).confirm(confirmation)
    }
}

impl<T: Notifier + ?Sized> Notifier for Rc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }

    fn confirm(&self, confirmation: &Confirmation) -> bool {
        (**self).confirm(confirmation)
    }
}

/// In-memory notifier for tests/dev.
///
/// Records every notification and confirmation prompt. Confirmations are
/// answered from a scripted queue, falling back to `default_answer` once the
/// queue is empty.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    inner: Mutex<Recorded>,
}

#[derive(Debug, Default)]
struct Recorded {
    notifications: Vec<Notification>,
    prompts: Vec<Confirmation>,
    answers: VecDeque<bool>,
    default_answer: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier that confirms every prompt.
    pub fn accepting() -> Self {
        let notifier = Self::new();
        notifier.set_default_answer(true);
        notifier
    }

    /// A notifier that cancels every prompt.
    pub fn declining() -> Self {
        Self::new()
    }

    pub fn set_default_answer(&self, answer: bool) {
        self.with(|r| r.default_answer = answer);
    }

    /// Queue the answer for the next confirmation prompt.
    pub fn push_answer(&self, answer: bool) {
        self.with(|r| r.answers.push_back(answer));
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.with(|r| r.notifications.clone())
    }

    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.with(|r| {
            r.notifications
                .iter()
                .map(|n| (n.severity, n.message.clone()))
                .collect()
        })
    }

    pub fn last(&self) -> Option<Notification> {
        self.with(|r| r.notifications.last().cloned())
    }

    pub fn prompts(&self) -> Vec<Confirmation> {
        self.with(|r| r.prompts.clone())
    }

    pub fn clear(&self) {
        self.with(|r| {
            r.notifications.clear();
            r.prompts.clear();
        });
    }

    fn with<R>(&self, f: impl FnOnce(&mut Recorded) -> R) -> R {
        // A poisoned recorder only means a test already panicked.
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.with(|r| r.notifications.push(notification));
    }

    fn confirm(&self, confirmation: &Confirmation) -> bool {
        self.with(|r| {
            r.prompts.push(confirmation.clone());
            r.answers.pop_front().unwrap_or(r.default_answer)
        })
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

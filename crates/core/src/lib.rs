//! `stockroom-core` — domain foundation building blocks.
//!
//! Pure domain primitives shared by the inventory and auth crates: the error
//! model, identifiers, and the notification boundary. No storage, no IO.

pub mod entity;
pub mod error;
pub mod id;
pub mod notify;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, SessionId};
pub use notify::{Confirmation, Notification, Notifier, RecordingNotifier, Severity};

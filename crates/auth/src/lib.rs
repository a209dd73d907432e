//! `stockroom-auth` — the login gate in front of the inventory.
//!
//! A single fixed credential pair, injected as a [`CredentialPolicy`], and a
//! two-state session machine. Decoupled from any UI; confirmation and
//! feedback go through [`stockroom_core::Notifier`].

pub mod credentials;
pub mod session;

pub use credentials::CredentialPolicy;
pub use session::{AuthError, KEY_LOGGED_IN, LogoutOutcome, Session, SessionGate, SessionState};

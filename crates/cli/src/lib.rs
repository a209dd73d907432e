//! `stockroom-cli`
//!
//! Terminal front end: reads configuration from the environment, opens the
//! file-backed store, and runs a line-oriented shell over the login gate and
//! the inventory.

pub mod command;
pub mod config;
pub mod console;
pub mod shell;

pub use command::{Command, DraftField, ParseError};
pub use config::{Config, ConfigError};
pub use console::Console;
pub use shell::{Flow, Shell};

//! `stockroom-storage` — string key-value persistence behind a small trait.
//!
//! Domain crates only see [`KeyValueStore`]. Two backends ship here:
//! [`InMemoryStore`] for tests/dev and [`FileStore`] for the terminal app.

pub mod file;
pub mod memory;
pub mod store;

pub use file::FileStore;
pub use memory::InMemoryStore;
pub use store::{KeyValueStore, StorageError};

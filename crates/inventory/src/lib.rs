//! Inventory domain module.
//!
//! Holds the item list, assigns ids, merges duplicate names, drives the
//! single edit draft, and persists everything through a
//! [`stockroom_storage::KeyValueStore`] after each mutation.

pub mod edit;
pub mod item;
pub mod search;
pub mod store;
pub mod valuation;

pub use edit::EditState;
pub use item::{Item, ItemDraft, ItemFields};
pub use search::filter;
pub use store::{
    AddOutcome, DeleteOutcome, EditOutcome, InventoryError, InventoryStore, KEY_INVENTORY,
    KEY_INVENTORY_CORRUPT, KEY_LAST_ID, LoadReport,
};
pub use valuation::Valuation;

//! Inventory store: in-memory item list backed by a key-value store.
//!
//! Two keys are written after every mutation, `inventory` (JSON array of
//! items) and `inventory_last_id` (decimal counter). They are written one
//! after the other with no transaction, so `load` reconciles them.

use thiserror::Error;

use stockroom_core::{Confirmation, DomainError, Entity, ItemId, Notification, Notifier};
use stockroom_storage::{KeyValueStore, StorageError};

use crate::edit::EditState;
use crate::item::{Item, ItemDraft, same_name};
use crate::search;

pub const KEY_INVENTORY: &str = "inventory";
pub const KEY_LAST_ID: &str = "inventory_last_id";
/// Raw copy of an inventory payload that failed to decode.
pub const KEY_INVENTORY_CORRUPT: &str = "inventory_corrupt";

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to encode inventory: {0}")]
    Encode(#[from] serde_json::Error),
}

impl InventoryError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_validation())
    }
}

/// What `load` had to repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// The `inventory` payload was malformed and replaced by an empty list.
    pub inventory_reset: bool,
    /// The `inventory_last_id` payload was malformed and ignored.
    pub last_id_reset: bool,
    /// The counter was behind the highest stored id and was raised.
    pub last_id_raised: bool,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new row was appended.
    Added(ItemId),
    /// An existing row with the same name absorbed the quantity and took the
    /// new price.
    Merged(ItemId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(Item),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Updated(ItemId),
    /// The item was removed while being edited; the draft was discarded.
    TargetMissing(ItemId),
}

/// Inventory store.
///
/// Storage and notifier are injected so tests can substitute in-memory
/// versions. The filtered view is derived on demand from the items and the
/// search term.
#[derive(Debug)]
pub struct InventoryStore<S, N> {
    storage: S,
    notifier: N,
    items: Vec<Item>,
    last_id: u64,
    search: String,
    editing: Option<EditState>,
    report: LoadReport,
}

impl<S: KeyValueStore, N: Notifier> InventoryStore<S, N> {
    /// Create the store and load persisted state.
    pub fn open(storage: S, notifier: N) -> Result<Self, InventoryError> {
        let mut store = Self {
            storage,
            notifier,
            items: Vec::new(),
            last_id: 0,
            search: String::new(),
            editing: None,
            report: LoadReport::default(),
        };
        store.load()?;
        Ok(store)
    }

    /// Replace in-memory state with what storage holds.
    ///
    /// Missing keys mean an empty inventory and a zero counter. A malformed
    /// inventory payload is copied to [`KEY_INVENTORY_CORRUPT`] and replaced
    /// by an empty list; the user is told. Storage read failures propagate.
    pub fn load(&mut self) -> Result<&LoadReport, InventoryError> {
        let mut report = LoadReport::default();

        let items = match self.storage.get(KEY_INVENTORY)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<Item>>(&raw) {
                Ok(items) => items,
                Err(err) => {
                    tracing::warn!(error = %err, "stored inventory is malformed; starting empty");
                    if let Err(err) = self.storage.set(KEY_INVENTORY_CORRUPT, &raw) {
                        tracing::error!(error = %err, "failed to keep a copy of the malformed inventory");
                    }
                    report.inventory_reset = true;
                    Vec::new()
                }
            },
        };

        let mut last_id = match self.storage.get(KEY_LAST_ID)? {
            None => 0,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(id) => id,
                Err(err) => {
                    tracing::warn!(error = %err, raw = %raw, "stored last id is malformed");
                    report.last_id_reset = true;
                    0
                }
            },
        };

        let highest = items.iter().map(|i| i.id.get()).max().unwrap_or(0);
        if last_id < highest {
            if !report.last_id_reset {
                tracing::warn!(last_id, highest, "last id behind stored items; raising");
                report.last_id_raised = true;
            }
            last_id = highest;
        }

        if report.inventory_reset {
            self.notifier.notify(Notification::danger(
                "Saved inventory could not be read; starting with an empty list.",
            ));
        } else if report.last_id_reset {
            self.notifier.notify(Notification::warning(
                "Saved item counter could not be read; it was rebuilt from the items.",
            ));
        }

        tracing::debug!(items = items.len(), last_id, "inventory loaded");

        self.items = items;
        self.last_id = last_id;
        self.report = report;
        Ok(&self.report)
    }

    /// Write the item list and the counter.
    pub fn save(&self) -> Result<(), InventoryError> {
        let json = serde_json::to_string(&self.items)?;
        self.storage.set(KEY_INVENTORY, &json)?;
        self.storage.set(KEY_LAST_ID, &self.last_id.to_string())?;
        Ok(())
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.is(&id))
    }

    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    // ── search ──────────────────────────────────────────────────────────

    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Items matching an arbitrary term (does not touch the stored term).
    pub fn filter(&self, term: &str) -> Vec<&Item> {
        search::filter(&self.items, term)
    }

    /// Items matching the current search term.
    pub fn visible(&self) -> Vec<&Item> {
        search::filter(&self.items, &self.search)
    }

    // ── add / merge ─────────────────────────────────────────────────────

    /// Add the draft as a new item, or merge it into the item of the same
    /// name (case-insensitive): quantities add up, the new price wins.
    ///
    /// An incomplete draft is rejected and left as is. The draft is reset to
    /// empty only once the change has been written.
    pub fn add_item(&mut self, draft: &mut ItemDraft) -> Result<AddOutcome, InventoryError> {
        let fields = draft.validate()?;

        let outcome = match self.items.iter().position(|i| same_name(&i.name, &fields.name)) {
            Some(idx) => {
                let quantity = self.items[idx].quantity + fields.quantity;
                if !quantity.is_finite() {
                    return Err(DomainError::validation("quantity out of range").into());
                }
                let existing = &mut self.items[idx];
                existing.quantity = quantity;
                existing.price = fields.price;
                tracing::info!(
                    item_id = %existing.id,
                    quantity = existing.quantity,
                    price = existing.price,
                    "merged into existing item"
                );
                AddOutcome::Merged(existing.id)
            }
            None => {
                let id = ItemId::new(self.last_id)
                    .next()
                    .ok_or_else(|| DomainError::invariant("item id counter exhausted"))?;
                self.last_id = id.get();
                self.items.push(Item::new(id, fields));
                tracing::info!(item_id = %id, "item added");
                AddOutcome::Added(id)
            }
        };

        self.save()?;
        *draft = ItemDraft::default();

        self.notifier.notify(match outcome {
            AddOutcome::Merged(_) => Notification::warning(
                "Existing item updated: quantity increased and price updated.",
            ),
            AddOutcome::Added(_) => {
                Notification::success("The item has been added to the inventory.")
            }
        });
        Ok(outcome)
    }

    // ── delete ──────────────────────────────────────────────────────────

    /// Ask for confirmation, then remove the item with `id`.
    pub fn request_delete(&mut self, id: ItemId) -> Result<DeleteOutcome, InventoryError> {
        if self.get(id).is_none() {
            return Err(DomainError::not_found().into());
        }

        if !self.notifier.confirm(&Confirmation::delete_item()) {
            tracing::debug!(item_id = %id, "delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        let Some(idx) = self.items.iter().position(|i| i.is(&id)) else {
            return Err(DomainError::not_found().into());
        };
        let removed = self.items.remove(idx);
        self.save()?;

        tracing::info!(item_id = %id, "item deleted");
        self.notifier.notify(Notification::danger("Item deleted"));
        Ok(DeleteOutcome::Deleted(removed))
    }

    // ── edit ────────────────────────────────────────────────────────────

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn edit_draft_mut(&mut self) -> Option<&mut ItemDraft> {
        self.editing.as_mut().map(|e| &mut e.draft)
    }

    /// Begin editing `id`, replacing any unsaved draft.
    pub fn start_edit(&mut self, id: ItemId) -> Result<&EditState, InventoryError> {
        let item = self.get(id).ok_or_else(DomainError::not_found)?;
        let next = EditState::start(item);

        if let Some(prev) = &self.editing {
            let unchanged = self
                .get(prev.item_id)
                .is_some_and(|target| prev.is_unchanged(target));
            if !unchanged {
                tracing::debug!(item_id = %prev.item_id, "discarding unsaved edit");
            }
        }

        let edit: &EditState = self.editing.insert(next);
        Ok(edit)
    }

    /// Write the draft back to its item.
    ///
    /// With no edit in progress, or an incomplete draft, nothing changes and a
    /// validation error is returned. If the item disappeared meanwhile the
    /// draft is dropped without writing.
    pub fn save_edit(&mut self) -> Result<EditOutcome, InventoryError> {
        let Some(edit) = self.editing.as_ref() else {
            return Err(DomainError::validation("no edit in progress").into());
        };
        let fields = edit.draft.validate()?;
        let id = edit.item_id;
        self.editing = None;

        let Some(item) = self.items.iter_mut().find(|i| i.is(&id)) else {
            tracing::warn!(item_id = %id, "edited item no longer exists");
            self.notifier.notify(Notification::warning(
                "Item no longer exists; changes were discarded.",
            ));
            return Ok(EditOutcome::TargetMissing(id));
        };

        item.name = fields.name;
        item.quantity = fields.quantity;
        item.price = fields.price;
        self.save()?;

        tracing::info!(item_id = %id, "item updated");
        self.notifier.notify(Notification::success("Item updated"));
        Ok(EditOutcome::Updated(id))
    }

    pub fn cancel_edit(&mut self) {
        if let Some(edit) = self.editing.take() {
            tracing::debug!(item_id = %edit.item_id, "edit cancelled");
        }
    }
}

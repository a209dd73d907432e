use stockroom_core::ItemId;

use crate::item::{Item, ItemDraft};

/// The single in-progress edit: which item, and the unsaved field values.
#[derive(Debug, Clone, PartialEq)]
pub struct EditState {
    pub item_id: ItemId,
    pub draft: ItemDraft,
}

impl EditState {
    pub fn start(item: &Item) -> Self {
        Self {
            item_id: item.id,
            draft: ItemDraft::from_item(item),
        }
    }

    /// True when the draft still equals `item`.
    pub fn is_unchanged(&self, item: &Item) -> bool {
        self.item_id == item.id && self.draft == ItemDraft::from_item(item)
    }
}

//! Entities: records that keep their identity while their fields change.

/// Something addressed by a stable identifier (an inventory row, a session).
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Identity comparison; fields are ignored.
    fn is(&self, id: &Self::Id) -> bool {
        self.id() == id
    }
}

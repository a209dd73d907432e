//! Search-as-you-type filtering.
//!
//! The filtered view is always derived from the item list and the current
//! term; it is never stored, so it cannot drift from the source.

use crate::item::Item;

/// Items whose name contains `term`, ignoring case, in list order.
///
/// An empty term matches everything.
pub fn filter<'a>(items: &'a [Item], term: &str) -> Vec<&'a Item> {
    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&needle))
        .collect()
}

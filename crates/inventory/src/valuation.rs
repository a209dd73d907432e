//! Stock valuation summary (quantity × unit price).

use serde::Serialize;

use crate::item::Item;

/// Totals over a set of items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Valuation {
    /// Number of distinct items.
    pub lines: usize,
    /// Sum of quantities.
    pub units: f64,
    /// Sum of quantity × price.
    pub total_value: f64,
}

impl Valuation {
    pub fn of<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
        items.into_iter().fold(Self::default(), |acc, item| Self {
            lines: acc.lines + 1,
            units: acc.units + item.quantity,
            total_value: acc.total_value + item.value(),
        })
    }
}

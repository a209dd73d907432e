use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ItemId};

/// A named stock line.
///
/// Persisted as `{"id": 1, "name": "Widget", "quantity": 10, "price": 2.5}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub quantity: f64,
    pub price: f64,
}

impl Item {
    pub fn new(id: ItemId, fields: ItemFields) -> Self {
        Self {
            id,
            name: fields.name,
            quantity: fields.quantity,
            price: fields.price,
        }
    }

    /// Case-insensitive exact name comparison used for duplicate detection.
    pub fn has_name(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }

    /// Quantity times unit price.
    pub fn value(&self) -> f64 {
        self.quantity * self.price
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &ItemId {
        &self.id
    }
}

pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Form state for the add and edit flows; every field may still be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, quantity: f64, price: f64) -> Self {
        Self {
            name: name.into(),
            quantity: Some(quantity),
            price: Some(price),
        }
    }

    pub fn from_item(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            quantity: Some(item.quantity),
            price: Some(item.price),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check that every field is present.
    ///
    /// An empty name or a missing or non-finite number is a validation error.
    /// Nothing is trimmed or defaulted, so a whitespace-only name is kept.
    pub fn validate(&self) -> DomainResult<ItemFields> {
        if self.name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        let quantity = self
            .quantity
            .ok_or_else(|| DomainError::validation("quantity is required"))?;
        let price = self
            .price
            .ok_or_else(|| DomainError::validation("price is required"))?;
        if !quantity.is_finite() {
            return Err(DomainError::validation("quantity must be a finite number"));
        }
        if !price.is_finite() {
            return Err(DomainError::validation("price must be a finite number"));
        }

        Ok(ItemFields {
            name: self.name.clone(),
            quantity,
            price,
        })
    }
}

/// A fully populated draft.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFields {
    pub name: String,
    pub quantity: f64,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_draft_validates() {
        let fields = ItemDraft::new("Widget", 10.0, 2.5).validate().unwrap();
        assert_eq!(fields.name, "Widget");
        assert_eq!(fields.quantity, 10.0);
        assert_eq!(fields.price, 2.5);
    }

    #[test]
    fn missing_fields_are_rejected() {
        let blank_name = ItemDraft::new("", 1.0, 1.0);
        let no_quantity = ItemDraft {
            quantity: None,
            ..ItemDraft::new("Widget", 1.0, 1.0)
        };
        let no_price = ItemDraft {
            price: None,
            ..ItemDraft::new("Widget", 1.0, 1.0)
        };

        for draft in [blank_name, no_quantity, no_price, ItemDraft::default()] {
            let err = draft.validate().unwrap_err();
            assert!(err.is_validation(), "{draft:?} gave {err:?}");
        }
    }

    #[test]
    fn zero_values_are_present_values() {
        assert!(ItemDraft::new("Free sample", 0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn nan_price_is_rejected() {
        let err = ItemDraft::new("Widget", 1.0, f64::NAN).validate().unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("price must be a finite number")
        );
    }

    #[test]
    fn infinite_quantity_is_rejected() {
        let err = ItemDraft::new("Widget", f64::INFINITY, 1.0)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("quantity must be a finite number")
        );
    }

    #[test]
    fn fractional_quantity_is_a_valid_quantity() {
        let fields = ItemDraft::new("Flour", 2.5, 1.2).validate().unwrap();
        assert_eq!(fields.quantity, 2.5);
    }

    #[test]
    fn whitespace_name_is_not_empty() {
        let fields = ItemDraft::new("  ", 1.0, 1.0).validate().unwrap();
        assert_eq!(fields.name, "  ");
    }

    #[test]
    fn name_match_ignores_case_only() {
        let item = Item::new(ItemId::new(1), ItemDraft::new("Widget", 1.0, 1.0).validate().unwrap());
        assert!(item.has_name("widget"));
        assert!(item.has_name("WIDGET"));
        assert!(!item.has_name("widgets"));
        assert!(!item.has_name(" widget"));
        assert!(item.is(&ItemId::new(1)));
    }

    #[test]
    fn persisted_shape_matches_storage_format() {
        let item = Item {
            id: ItemId::new(1),
            name: "Widget".into(),
            quantity: 15.0,
            price: 3.0,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "name": "Widget", "quantity": 15.0, "price": 3.0})
        );
    }

    #[test]
    fn value_multiplies_quantity_by_price() {
        let item = Item {
            id: ItemId::new(2),
            name: "Gadget".into(),
            quantity: 4.0,
            price: 2.5,
        };
        assert_eq!(item.value(), 10.0);
    }
}

//! The catalog record and its write payloads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::SweetId;

/// A sweet as held in the catalog.
///
/// The storage layer is authoritative for every field here; in particular
/// `id`, `created_at`, and `updated_at` are assigned server-side and never
/// synthesized by this application. Quantity is modelled as `u32` so a
/// negative stock count is unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sweet {
    pub id: SweetId,
    pub name: String,
    pub category: String,
    /// Price in currency units (dollars, not cents). Never negative.
    pub price: Decimal,
    /// Stock on hand. Never negative.
    pub quantity: u32,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sweet {
    /// Whether at least one unit is available for purchase.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Validation failures for sweet payloads, checked before any remote write.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SweetValidationError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("category cannot be empty")]
    EmptyCategory,
    #[error("price cannot be negative")]
    NegativePrice,
}

/// Payload for creating a sweet.
///
/// `id` and the timestamps are absent on purpose: the storage layer assigns
/// them. Quantity defaults to zero so a newly listed sweet starts out of
/// stock until an administrator restocks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSweet {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NewSweet {
    /// Check the payload against the catalog invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule: blank name, blank category, or a
    /// negative price.
    pub fn validate(&self) -> Result<(), SweetValidationError> {
        validate_fields(&self.name, &self.category, self.price)
    }
}

/// Partial update payload for an existing sweet.
///
/// `None` fields are omitted from the write entirely and left untouched by
/// the storage layer. The optional text fields are doubly wrapped so that
/// clearing a description (`Some(None)`) is distinct from not touching it
/// (`None`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweetChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
}

impl SweetChanges {
    /// A change set touching only the stock count.
    #[must_use]
    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    /// Whether no field would be written.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
    }

    /// Check the populated fields against the catalog invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule among the fields present.
    pub fn validate(&self) -> Result<(), SweetValidationError> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err(SweetValidationError::EmptyName);
        }
        if let Some(category) = &self.category
            && category.trim().is_empty()
        {
            return Err(SweetValidationError::EmptyCategory);
        }
        if let Some(price) = self.price
            && price < Decimal::ZERO
        {
            return Err(SweetValidationError::NegativePrice);
        }
        Ok(())
    }
}

fn validate_fields(
    name: &str,
    category: &str,
    price: Decimal,
) -> Result<(), SweetValidationError> {
    if name.trim().is_empty() {
        return Err(SweetValidationError::EmptyName);
    }
    if category.trim().is_empty() {
        return Err(SweetValidationError::EmptyCategory);
    }
    if price < Decimal::ZERO {
        return Err(SweetValidationError::NegativePrice);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn new_sweet() -> NewSweet {
        NewSweet {
            name: "Jelly Beans".to_owned(),
            category: "Gummy".to_owned(),
            price: Decimal::new(299, 2),
            quantity: 50,
            description: Some("Assorted fruit-flavored jelly beans".to_owned()),
            image_url: None,
        }
    }

    #[test]
    fn test_new_sweet_valid() {
        assert!(new_sweet().validate().is_ok());
    }

    #[test]
    fn test_new_sweet_blank_name_rejected() {
        let mut sweet = new_sweet();
        sweet.name = "   ".to_owned();
        assert_eq!(sweet.validate(), Err(SweetValidationError::EmptyName));
    }

    #[test]
    fn test_new_sweet_blank_category_rejected() {
        let mut sweet = new_sweet();
        sweet.category = String::new();
        assert_eq!(sweet.validate(), Err(SweetValidationError::EmptyCategory));
    }

    #[test]
    fn test_new_sweet_negative_price_rejected() {
        let mut sweet = new_sweet();
        sweet.price = Decimal::new(-1, 2);
        assert_eq!(sweet.validate(), Err(SweetValidationError::NegativePrice));
    }

    #[test]
    fn test_new_sweet_quantity_defaults_to_zero() {
        let sweet: NewSweet = serde_json::from_str(
            r#"{"name": "Fudge", "category": "Chocolate", "price": "3.50"}"#,
        )
        .unwrap();
        assert_eq!(sweet.quantity, 0);
        assert_eq!(sweet.description, None);
    }

    #[test]
    fn test_changes_serialize_only_set_fields() {
        let changes = SweetChanges::quantity(49);
        let json = serde_json::to_value(&changes).unwrap();
        assert_eq!(json, serde_json::json!({"quantity": 49}));
    }

    #[test]
    fn test_changes_clearing_description_serializes_null() {
        let changes = SweetChanges {
            description: Some(None),
            ..SweetChanges::default()
        };
        let json = serde_json::to_value(&changes).unwrap();
        assert_eq!(json, serde_json::json!({"description": null}));
    }

    #[test]
    fn test_changes_is_empty() {
        assert!(SweetChanges::default().is_empty());
        assert!(!SweetChanges::quantity(1).is_empty());
    }

    #[test]
    fn test_changes_validate_checks_present_fields_only() {
        let ok = SweetChanges {
            price: Some(Decimal::new(199, 2)),
            ..SweetChanges::default()
        };
        assert!(ok.validate().is_ok());

        let bad = SweetChanges {
            price: Some(Decimal::new(-199, 2)),
            ..SweetChanges::default()
        };
        assert_eq!(bad.validate(), Err(SweetValidationError::NegativePrice));
    }
}

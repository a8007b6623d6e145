//! Shopping list item data model.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ListId, UserId};

/// Validation errors returned by the item value-type constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    /// The item name is empty after trimming.
    EmptyName,
}

impl fmt::Display for ItemValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "item name must not be empty"),
        }
    }
}

impl std::error::Error for ItemValidationError {}

/// Stable item identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`ItemId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trimmed, non-empty item name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemName(String);

impl ItemName {
    /// Validate and construct an [`ItemName`] from trimmed input.
    ///
    /// # Errors
    /// Returns [`ItemValidationError::EmptyName`] when the trimmed input is
    /// empty.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ItemValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ItemValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The validated item name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ItemName> for String {
    fn from(value: ItemName) -> Self {
        value.0
    }
}

impl TryFrom<String> for ItemName {
    type Error = ItemValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Shopping list item document.
///
/// Items live in their own collection keyed by `list_id` and are deleted in
/// the same batch as their list. `quantity` and `unit` keep the original
/// free-text document shape: empty string means "not set".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Stable identifier.
    pub id: ItemId,
    /// The owning list.
    pub list_id: ListId,
    /// Display name.
    pub item_name: ItemName,
    /// Free-text quantity ("2", "500", …); empty when unset.
    #[serde(default)]
    pub quantity: String,
    /// Free-text unit ("kg", "packs", …); empty when unset.
    #[serde(default)]
    pub unit: String,
    /// Checked-off flag.
    pub is_purchased: bool,
    /// The member who added the item.
    pub added_by: UserId,
}

/// Partial update for an item.
///
/// Absent fields are left untouched; an empty `quantity`/`unit` string
/// clears the field, matching the stored document shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    /// Replacement name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<ItemName>,
    /// Replacement quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    /// Replacement unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ItemPatch {
    /// Whether the patch carries no changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.item_name.is_none() && self.quantity.is_none() && self.unit.is_none()
    }
}

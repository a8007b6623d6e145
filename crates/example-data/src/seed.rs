//! Generated household seed types.
//!
//! Output types from generation, independent of backend domain types. The
//! backend converts them at the point of use.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A generated example user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleUserSeed {
    /// Unique identifier for the user.
    pub id: Uuid,
    /// Human-readable display name.
    pub display_name: String,
    /// Lowercase e-mail address derived from the display name.
    pub email: String,
}

/// The household group shared by every generated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleGroupSeed {
    /// Unique identifier for the group.
    pub id: Uuid,
    /// Group display name.
    pub group_name: String,
    /// The owning user (always the first generated user).
    pub owner_id: Uuid,
    /// Every member, owner included.
    pub member_uids: Vec<Uuid>,
}

/// A generated shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleListSeed {
    /// Unique identifier for the list.
    pub id: Uuid,
    /// List display name.
    pub list_name: String,
    /// Icon identifier from the registry catalogue.
    pub icon: String,
    /// Display colour from the registry catalogue.
    pub color: String,
    /// The creating user.
    pub creator_id: Uuid,
    /// Every member, creator included.
    pub members: Vec<Uuid>,
    /// Whether this is the household list linked to the group.
    pub linked_to_group: bool,
}

/// A generated shopping list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleItemSeed {
    /// Unique identifier for the item.
    pub id: Uuid,
    /// The owning list.
    pub list_id: Uuid,
    /// Item display name from the registry catalogue.
    pub item_name: String,
    /// Free-text quantity; empty when unset.
    pub quantity: String,
    /// Free-text unit; empty when unset.
    pub unit: String,
    /// Whether the item is already checked off.
    pub is_purchased: bool,
    /// The member who added the item.
    pub added_by: Uuid,
}

/// A complete generated household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleHousehold {
    /// Generated users; the first one owns the household group.
    pub users: Vec<ExampleUserSeed>,
    /// The group every user belongs to.
    pub group: ExampleGroupSeed,
    /// One group-linked household list plus a private list per user.
    pub lists: Vec<ExampleListSeed>,
    /// Items spread over the lists.
    pub items: Vec<ExampleItemSeed>,
}

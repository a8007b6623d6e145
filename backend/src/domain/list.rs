//! Shopping list data model.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{GroupId, UserId};

/// Validation errors returned by the list value-type constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListValidationError {
    /// The list name is empty after trimming.
    EmptyName,
}

impl fmt::Display for ListValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "list name must not be empty"),
        }
    }
}

impl std::error::Error for ListValidationError {}

/// Stable list identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ListId(Uuid);

impl ListId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`ListId`].
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

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trimmed, non-empty list name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListName(String);

impl ListName {
    /// Validate and construct a [`ListName`] from trimmed input.
    ///
    /// # Errors
    /// Returns [`ListValidationError::EmptyName`] when the trimmed input is
    /// empty.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ListValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ListValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The validated list name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ListName> for String {
    fn from(value: ListName) -> Self {
        value.0
    }
}

impl TryFrom<String> for ListName {
    type Error = ListValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lifecycle status of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStatus {
    /// Visible on the dashboard.
    Active,
    /// Hidden from the dashboard, items preserved.
    Archived,
}

impl ListStatus {
    /// Whether the status is [`ListStatus::Archived`].
    #[must_use]
    pub const fn is_archived(self) -> bool {
        matches!(self, Self::Archived)
    }
}

/// Shopping list document.
///
/// Invariants:
/// - `creator_id` is always contained in `members`; member-removal operations
///   refuse to remove the creator.
/// - When `linked_group_id` is set, the member set was unioned with the
///   group's members at link time. The union is a snapshot: later group edits
///   do not flow into the list until it is re-linked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    /// Stable identifier.
    pub id: ListId,
    /// Display name.
    pub list_name: ListName,
    /// Icon identifier chosen at creation.
    pub icon: String,
    /// Display colour.
    pub color: String,
    /// Optional shop/location tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// The user who created the list; permanently a member.
    pub creator_id: UserId,
    /// Member set, creator included. `BTreeSet` keeps iteration
    /// deterministic, which the creator-transfer cascade relies on.
    pub members: BTreeSet<UserId>,
    /// Backing group, when the list is group-shared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_group_id: Option<GroupId>,
    /// Lifecycle status.
    pub status: ListStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl List {
    /// Whether the given user may read and write this list.
    #[must_use]
    pub fn is_member(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }

    /// Distinct participants: the creator plus every member.
    ///
    /// The account-deletion cascade uses this to decide between deleting a
    /// list outright and removing one participant from it.
    #[must_use]
    pub fn participants(&self) -> BTreeSet<UserId> {
        let mut all = self.members.clone();
        all.insert(self.creator_id);
        all
    }
}

/// Partial update for list presentation fields.
///
/// Absent fields are left untouched. Name validation happens at
/// construction of [`ListName`], so a patch can never carry an empty name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPatch {
    /// Replacement name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_name: Option<ListName>,
    /// Replacement colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Replacement location tag (empty string clears it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ListPatch {
    /// Whether the patch carries no changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.list_name.is_none() && self.color.is_none() && self.location.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_with(creator: UserId, members: &[UserId]) -> List {
        List {
            id: ListId::random(),
            list_name: ListName::new("Groceries").expect("valid"),
            icon: "cart".to_owned(),
            color: "#4caf50".to_owned(),
            location: None,
            creator_id: creator,
            members: members.iter().copied().collect(),
            linked_group_id: None,
            status: ListStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn participants_union_creator_and_members() {
        let creator = UserId::random();
        let other = UserId::random();
        // Creator deliberately absent from members to mirror a corrupt doc.
        let list = list_with(creator, &[other]);
        let participants = list.participants();
        assert!(participants.contains(&creator));
        assert!(participants.contains(&other));
        assert_eq!(participants.len(), 2);
    }

    #[test]
    fn participants_deduplicate() {
        let creator = UserId::random();
        let list = list_with(creator, &[creator]);
        assert_eq!(list.participants().len(), 1);
    }

    #[test]
    fn empty_patch_reports_empty() {
        assert!(ListPatch::default().is_empty());
    }

    #[test]
    fn status_serialises_lowercase() {
        let encoded = serde_json::to_string(&ListStatus::Archived).expect("serialises");
        assert_eq!(encoded, "\"archived\"");
    }
}

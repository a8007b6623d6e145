//! Group data model.
//!
//! Groups back the "share with everyone at once" flow: a list linked to a
//! group snapshots the group's members into its own member set.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// Validation errors returned by the group value-type constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupValidationError {
    /// The group name is empty after trimming.
    EmptyName,
}

impl fmt::Display for GroupValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "group name must not be empty"),
        }
    }
}

impl std::error::Error for GroupValidationError {}

/// Stable group identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct GroupId(Uuid);

impl GroupId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`GroupId`].
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

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trimmed, non-empty group name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupName(String);

impl GroupName {
    /// Validate and construct a [`GroupName`] from trimmed input.
    ///
    /// # Errors
    /// Returns [`GroupValidationError::EmptyName`] when the trimmed input is
    /// empty.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, GroupValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GroupValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The validated group name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<GroupName> for String {
    fn from(value: GroupName) -> Self {
        value.0
    }
}

impl TryFrom<String> for GroupName {
    type Error = GroupValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Group document.
///
/// Invariant: `owner_id` is always contained in `member_uids`. The owner can
/// only leave a group by deleting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Stable identifier.
    pub id: GroupId,
    /// Display name.
    pub group_name: GroupName,
    /// The user who created the group; permanently a member.
    pub owner_id: UserId,
    /// Member set, owner included. `BTreeSet` keeps iteration deterministic.
    pub member_uids: BTreeSet<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Construct a new group whose sole member is its owner.
    #[must_use]
    pub fn new(id: GroupId, group_name: GroupName, owner_id: UserId, created_at: DateTime<Utc>) -> Self {
        let member_uids = BTreeSet::from([owner_id]);
        Self {
            id,
            group_name,
            owner_id,
            member_uids,
            created_at,
        }
    }

    /// Whether the given user belongs to this group.
    #[must_use]
    pub fn contains(&self, user: &UserId) -> bool {
        self.member_uids.contains(user)
    }
}

//! Port for the `groups` collection.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{Group, GroupId, UserId};

/// Errors raised by group repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupRepositoryError {
    /// The backing store could not be reached.
    #[error("group repository connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// A query or mutation failed during execution.
    #[error("group repository query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
    /// A targeted update referenced a group document that does not exist.
    #[error("no group document for id {id}")]
    MissingGroup {
        /// The missing document id.
        id: String,
    },
}

/// Port for group storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Store a freshly created group.
    async fn insert(&self, group: &Group) -> Result<(), GroupRepositoryError>;

    /// Fetch a group by identifier.
    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, GroupRepositoryError>;

    /// Every group owned by the given user.
    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Group>, GroupRepositoryError>;

    /// Replace the member set wholesale.
    ///
    /// The policy layer validates the owner is present before calling; the
    /// adapter stores what it is given.
    async fn set_members(
        &self,
        id: &GroupId,
        members: &BTreeSet<UserId>,
    ) -> Result<(), GroupRepositoryError>;

    /// Delete the group document.
    ///
    /// Lists linked to the group are deliberately untouched: they keep a
    /// dangling `linkedGroupId` reference.
    async fn delete(&self, id: &GroupId) -> Result<(), GroupRepositoryError>;
}

//! Port for the `lists` collection.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{GroupId, List, ListId, ListPatch, ListStatus, UserId};

/// Errors raised by list repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListRepositoryError {
    /// The backing store could not be reached.
    #[error("list repository connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// A query or mutation failed during execution.
    #[error("list repository query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
    /// A targeted update referenced a list document that does not exist.
    #[error("no list document for id {id}")]
    MissingList {
        /// The missing document id.
        id: String,
    },
}

/// Port for shopping list storage.
///
/// # Concurrency contract
///
/// [`add_member`](ListRepository::add_member) and
/// [`remove_member`](ListRepository::remove_member) are **set operations on
/// the stored document**, not read-modify-write on a caller-held copy: two
/// concurrent `add_member` calls from different clients converge to the
/// union. Field patches (`apply_patch`, `set_status`) are field-level writes
/// with last-writer-wins semantics on the same field.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Store a freshly created list.
    async fn insert(&self, list: &List) -> Result<(), ListRepositoryError>;

    /// Fetch a list by identifier.
    async fn find_by_id(&self, id: &ListId) -> Result<Option<List>, ListRepositoryError>;

    /// Every list the given user is a member of.
    async fn find_by_member(&self, member: &UserId) -> Result<Vec<List>, ListRepositoryError>;

    /// Every list document (admin view).
    async fn list_all(&self) -> Result<Vec<List>, ListRepositoryError>;

    /// Apply a partial presentation update (name/colour/location).
    async fn apply_patch(&self, id: &ListId, patch: &ListPatch)
    -> Result<(), ListRepositoryError>;

    /// Write the lifecycle status field.
    async fn set_status(&self, id: &ListId, status: ListStatus)
    -> Result<(), ListRepositoryError>;

    /// Atomically union one user into the member set.
    async fn add_member(&self, id: &ListId, member: &UserId) -> Result<(), ListRepositoryError>;

    /// Atomically remove one user from the member set.
    async fn remove_member(&self, id: &ListId, member: &UserId)
    -> Result<(), ListRepositoryError>;

    /// Set the linked group and union `members_to_add` into the member set
    /// as a single update.
    async fn link_group(
        &self,
        id: &ListId,
        group: &GroupId,
        members_to_add: &BTreeSet<UserId>,
    ) -> Result<(), ListRepositoryError>;

    /// Clear the linked group. Members are left untouched.
    async fn unlink_group(&self, id: &ListId) -> Result<(), ListRepositoryError>;

    /// Replace the creator and the member set in a single update (account
    /// deletion cascade: ownership transfer).
    async fn replace_creator(
        &self,
        id: &ListId,
        new_creator: &UserId,
        members: &BTreeSet<UserId>,
    ) -> Result<(), ListRepositoryError>;

    /// Delete the list document and every item whose `listId` matches, as
    /// one atomic batch.
    ///
    /// A failure must leave both collections unchanged; partial deletion is
    /// a broken adapter.
    async fn delete_with_items(&self, id: &ListId) -> Result<(), ListRepositoryError>;
}

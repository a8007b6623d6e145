//! Port for the `items` collection.

use async_trait::async_trait;

use crate::domain::{Item, ItemId, ItemPatch, ListId};

/// Errors raised by item repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemRepositoryError {
    /// The backing store could not be reached.
    #[error("item repository connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// A query or mutation failed during execution.
    #[error("item repository query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
    /// A targeted update referenced an item document that does not exist.
    #[error("no item document for id {id}")]
    MissingItem {
        /// The missing document id.
        id: String,
    },
}

/// Port for item storage.
///
/// `set_purchased` and `apply_patch` are field-level writes: concurrent
/// edits to different fields both land; same-field edits are
/// last-writer-wins (accepted, not a bug).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Store a freshly added item.
    async fn insert(&self, item: &Item) -> Result<(), ItemRepositoryError>;

    /// Fetch an item by identifier.
    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>, ItemRepositoryError>;

    /// Every item belonging to the given list.
    async fn find_by_list(&self, list: &ListId) -> Result<Vec<Item>, ItemRepositoryError>;

    /// Write the checked-off flag.
    async fn set_purchased(&self, id: &ItemId, purchased: bool)
    -> Result<(), ItemRepositoryError>;

    /// Apply a partial update (name/quantity/unit).
    async fn apply_patch(&self, id: &ItemId, patch: &ItemPatch)
    -> Result<(), ItemRepositoryError>;

    /// Delete a single item.
    async fn delete(&self, id: &ItemId) -> Result<(), ItemRepositoryError>;
}

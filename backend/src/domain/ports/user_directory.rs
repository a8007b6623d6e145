//! Port for the `users` collection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::{EmailAddress, User, UserId};

/// Errors raised by user directory adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserDirectoryError {
    /// The backing store could not be reached.
    #[error("user directory connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// A query or mutation failed during execution.
    #[error("user directory query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
    /// A targeted update referenced a user document that does not exist.
    #[error("no user document for id {id}")]
    MissingUser {
        /// The missing document id.
        id: String,
    },
}

/// Port for user document storage and lookup.
///
/// E-mail lookups expect pre-folded input; [`EmailAddress`] guarantees this
/// at the type level, so adapters may compare verbatim.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Insert or update a user document (merge by id).
    async fn upsert(&self, user: &User) -> Result<(), UserDirectoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserDirectoryError>;

    /// Fetch a user by folded e-mail address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserDirectoryError>;

    /// Every user document, deleted ones included.
    async fn list_all(&self) -> Result<Vec<User>, UserDirectoryError>;

    /// Replace the opaque preferences blob on a user document.
    async fn set_preferences(
        &self,
        id: &UserId,
        preferences: Value,
    ) -> Result<(), UserDirectoryError>;

    /// Tombstone a user document (`deleted = true`, `deletedAt = at`).
    async fn mark_deleted(&self, id: &UserId, at: DateTime<Utc>)
    -> Result<(), UserDirectoryError>;
}

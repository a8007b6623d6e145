//! Port for live-query subscriptions.
//!
//! Models the document store's push-based snapshot listeners: subscribing
//! fires the callback once with the current result set, then again on every
//! subsequent change to the watched query. There is no polling. Callers hold
//! the returned [`WatchGuard`] for as long as they want updates; dropping it
//! (or calling [`WatchGuard::unsubscribe`]) tears the subscription down so
//! the registration does not leak.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Group, Item, List, ListId, UserId};

/// Errors raised by change feed adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangeFeedError {
    /// The backing store could not be reached.
    #[error("change feed connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// The subscription could not be registered.
    #[error("change feed subscription failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
}

/// Callback invoked with the full current set of matching lists.
pub type ListsCallback = Arc<dyn Fn(Vec<List>) + Send + Sync>;

/// Callback invoked with the full current set of a list's items.
pub type ItemsCallback = Arc<dyn Fn(Vec<Item>) + Send + Sync>;

/// Callback invoked with the full current set of an owner's groups.
pub type GroupsCallback = Arc<dyn Fn(Vec<Group>) + Send + Sync>;

/// RAII handle for an active subscription.
///
/// The subscription stays live until the guard is dropped or
/// [`unsubscribe`](WatchGuard::unsubscribe) is called explicitly.
#[must_use = "dropping the guard cancels the subscription"]
pub struct WatchGuard {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl WatchGuard {
    /// Build a guard around an adapter-supplied cancellation hook.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A guard with nothing to cancel (fixtures and mocks).
    #[must_use]
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Cancel the subscription now instead of at drop time.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for WatchGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchGuard")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Port for live queries over the document collections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Watch every list the given user is a member of.
    async fn watch_lists(
        &self,
        member: &UserId,
        callback: ListsCallback,
    ) -> Result<WatchGuard, ChangeFeedError>;

    /// Watch the items of one list.
    async fn watch_items(
        &self,
        list: &ListId,
        callback: ItemsCallback,
    ) -> Result<WatchGuard, ChangeFeedError>;

    /// Watch every group owned by the given user.
    async fn watch_groups(
        &self,
        owner: &UserId,
        callback: GroupsCallback,
    ) -> Result<WatchGuard, ChangeFeedError>;
}

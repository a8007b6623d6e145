//! Live-query façade over the change feed port.
//!
//! Thin by design: the change feed already scopes each watch to a user or
//! list, and the UI tears subscriptions down by dropping the guard. This
//! service only translates port errors into domain errors.

use std::sync::Arc;

use crate::domain::ports::{
    ChangeFeed, ChangeFeedError, GroupsCallback, ItemsCallback, ListsCallback, WatchGuard,
};
use crate::domain::{Error, ListId, UserId};

fn map_change_feed_error(error: ChangeFeedError) -> Error {
    match error {
        ChangeFeedError::Connection { message } => {
            Error::service_unavailable(format!("change feed unavailable: {message}"))
        }
        ChangeFeedError::Query { message } => {
            Error::internal(format!("change feed error: {message}"))
        }
    }
}

/// Live-query service.
#[derive(Clone)]
pub struct LiveQueryService<F> {
    feed: Arc<F>,
}

impl<F> LiveQueryService<F> {
    /// Create a new service over the change feed.
    pub fn new(feed: Arc<F>) -> Self {
        Self { feed }
    }
}

impl<F> LiveQueryService<F>
where
    F: ChangeFeed,
{
    /// Watch every list `member` belongs to. Fires immediately with the
    /// current set, then on every change.
    ///
    /// # Errors
    /// Change feed failures only.
    pub async fn watch_lists(
        &self,
        member: &UserId,
        callback: ListsCallback,
    ) -> Result<WatchGuard, Error> {
        self.feed
            .watch_lists(member, callback)
            .await
            .map_err(map_change_feed_error)
    }

    /// Watch the items of one list.
    ///
    /// # Errors
    /// Change feed failures only.
    pub async fn watch_items(
        &self,
        list: &ListId,
        callback: ItemsCallback,
    ) -> Result<WatchGuard, Error> {
        self.feed
            .watch_items(list, callback)
            .await
            .map_err(map_change_feed_error)
    }

    /// Watch every group `owner` owns.
    ///
    /// # Errors
    /// Change feed failures only.
    pub async fn watch_groups(
        &self,
        owner: &UserId,
        callback: GroupsCallback,
    ) -> Result<WatchGuard, Error> {
        self.feed
            .watch_groups(owner, callback)
            .await
            .map_err(map_change_feed_error)
    }
}

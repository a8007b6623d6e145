//! Driven ports for the hexagonal boundary.
//!
//! Each port models one concern of the external backend-as-a-service: the
//! four document collections, the identity provider, and the live-query
//! change feed. Adapters live under `crate::outbound`.

mod change_feed;
mod group_repository;
mod identity_provider;
mod item_repository;
mod list_repository;
mod user_directory;

#[cfg(test)]
pub use change_feed::MockChangeFeed;
pub use change_feed::{
    ChangeFeed, ChangeFeedError, GroupsCallback, ItemsCallback, ListsCallback, WatchGuard,
};
#[cfg(test)]
pub use group_repository::MockGroupRepository;
pub use group_repository::{GroupRepository, GroupRepositoryError};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{AuthAccount, IdentityError, IdentityProvider};
#[cfg(test)]
pub use item_repository::MockItemRepository;
pub use item_repository::{ItemRepository, ItemRepositoryError};
#[cfg(test)]
pub use list_repository::MockListRepository;
pub use list_repository::{ListRepository, ListRepositoryError};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{UserDirectory, UserDirectoryError};

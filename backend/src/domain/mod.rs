//! Domain primitives, policy services, and the hexagonal ports.
//!
//! All state lives in the external document store behind the ports in
//! [`ports`]; the services here are stateless policy layers and safe to
//! call concurrently from independent requests. Every operation takes the
//! acting user explicitly — there is no ambient "current user".

pub mod error;
pub mod group;
pub mod item;
pub mod list;
pub mod ports;
pub mod user;

mod account_cascade;
mod account_service;
mod admin_service;
mod group_link_service;
mod group_service;
mod item_service;
mod list_service;
mod live_queries;
mod settings;

pub use self::account_cascade::{AccountCascadeService, CascadeFailure, CascadeReport};
pub use self::account_service::AccountService;
pub use self::admin_service::{AdminOverview, AdminService};
pub use self::error::{Error, ErrorCode};
pub use self::group::{Group, GroupId, GroupName, GroupValidationError};
pub use self::group_link_service::GroupLinkService;
pub use self::group_service::GroupService;
pub use self::item::{Item, ItemId, ItemName, ItemPatch, ItemValidationError};
pub use self::item_service::{ItemPatchRequest, ItemService, NewItem};
pub use self::list::{List, ListId, ListName, ListPatch, ListStatus, ListValidationError};
pub use self::list_service::{ListPatchRequest, ListService, ListShare, NewList};
pub use self::live_queries::LiveQueryService;
pub use self::settings::AdminSettings;
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, EmailAddress, User, UserId, UserValidationError,
};

#[cfg(test)]
mod list_service_tests;

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;

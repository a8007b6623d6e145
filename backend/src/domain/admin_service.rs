//! Administration panel operations.
//!
//! Every operation is gated on the acting user's e-mail matching the
//! configured administrator address. The gate runs before anything else so
//! a non-admin caller can never observe partial admin state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::account_cascade::{AccountCascadeService, CascadeReport};
use crate::domain::list_service::{map_list_repo_error, map_user_directory_error};
use crate::domain::ports::{ListRepository, UserDirectory};
use crate::domain::{EmailAddress, Error, List, ListId, User, UserId};

/// Snapshot of the system for the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    /// Every live (non-deleted, non-admin) user.
    pub users: Vec<User>,
    /// Every list with at least one live participant.
    pub lists: Vec<List>,
    /// How many of those lists are active.
    pub active_lists: usize,
    /// How many of those lists are archived.
    pub archived_lists: usize,
}

/// Administration service.
#[derive(Clone)]
pub struct AdminService<L, U> {
    lists: Arc<L>,
    users: Arc<U>,
    cascade: AccountCascadeService<L, U>,
    admin_email: EmailAddress,
}

impl<L, U> AdminService<L, U> {
    /// Create a new admin service over the list and user collections.
    pub fn new(lists: Arc<L>, users: Arc<U>, admin_email: EmailAddress) -> Self {
        let cascade = AccountCascadeService::new(Arc::clone(&lists), Arc::clone(&users));
        Self {
            lists,
            users,
            cascade,
            admin_email,
        }
    }
}

impl<L, U> AdminService<L, U>
where
    L: ListRepository,
    U: UserDirectory,
{
    /// Build the admin panel snapshot.
    ///
    /// Deleted users and the admin account are filtered out; lists survive
    /// the filter when at least one live user participates in them
    /// (creator or member).
    ///
    /// # Errors
    /// `forbidden` for non-admin callers, plus repository failures.
    pub async fn overview(&self, acting: &UserId) -> Result<AdminOverview, Error> {
        self.ensure_admin(acting).await?;

        let users: Vec<User> = self
            .users
            .list_all()
            .await
            .map_err(map_user_directory_error)?
            .into_iter()
            .filter(|user| !user.deleted && user.email != self.admin_email)
            .collect();

        let lists: Vec<List> = self
            .lists
            .list_all()
            .await
            .map_err(map_list_repo_error)?
            .into_iter()
            .filter(|list| {
                users
                    .iter()
                    .any(|user| list.creator_id == user.id || list.is_member(&user.id))
            })
            .collect();

        let archived_lists = lists
            .iter()
            .filter(|list| list.status.is_archived())
            .count();
        let active_lists = lists.len() - archived_lists;

        Ok(AdminOverview {
            users,
            lists,
            active_lists,
            archived_lists,
        })
    }

    /// Delete any list and its items (admin override; no membership check).
    ///
    /// # Errors
    /// `forbidden` for non-admin callers, `not_found` for an unknown list,
    /// plus repository failures.
    pub async fn delete_list(&self, acting: &UserId, list_id: &ListId) -> Result<(), Error> {
        self.ensure_admin(acting).await?;
        self.lists
            .find_by_id(list_id)
            .await
            .map_err(map_list_repo_error)?
            .ok_or_else(|| Error::not_found("list not found"))?;
        self.lists
            .delete_with_items(list_id)
            .await
            .map_err(map_list_repo_error)?;
        info!(list = %list_id, "admin deleted list");
        Ok(())
    }

    /// Run the account-deletion cascade for `user_id`.
    ///
    /// Returns the per-list [`CascadeReport`] so partial failures can be
    /// surfaced to the administrator.
    ///
    /// # Errors
    /// `forbidden` for non-admin callers or when targeting the admin
    /// account itself, `not_found` for an unknown user, plus repository
    /// failures.
    pub async fn delete_user(
        &self,
        acting: &UserId,
        user_id: &UserId,
    ) -> Result<CascadeReport, Error> {
        self.ensure_admin(acting).await?;
        let target = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_directory_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        if target.email == self.admin_email {
            return Err(Error::forbidden("the admin account cannot be deleted"));
        }
        let report = self.cascade.delete_user(user_id).await?;
        info!(user = %user_id, clean = report.is_clean(), "admin deleted user");
        Ok(report)
    }

    async fn ensure_admin(&self, acting: &UserId) -> Result<(), Error> {
        let user = self
            .users
            .find_by_id(acting)
            .await
            .map_err(map_user_directory_error)?
            .ok_or_else(|| Error::forbidden("admin access required"))?;
        if user.email == self.admin_email {
            Ok(())
        } else {
            Err(Error::forbidden("admin access required"))
        }
    }
}

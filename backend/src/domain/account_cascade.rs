//! Account-deletion cascade.
//!
//! Removing a user touches every list they participate in. The cascade is
//! best-effort per list: one list failing to update must not strand the
//! rest, so failures are collected and reported instead of aborting. Only
//! after every list has been visited is the user document tombstoned —
//! identity-provider accounts cannot be deleted from here, so soft delete
//! is the permanent design, not a placeholder.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::list_service::{map_list_repo_error, map_user_directory_error};
use crate::domain::ports::{ListRepository, UserDirectory};
use crate::domain::{Error, List, ListId, UserId};

/// One list the cascade failed to process.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeFailure {
    /// The list that could not be processed.
    pub list_id: ListId,
    /// What went wrong.
    pub error: Error,
}

/// Outcome of an account-deletion cascade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeReport {
    /// Lists deleted outright because the user was their sole participant.
    pub deleted_lists: Vec<ListId>,
    /// Lists that survived with the user removed (possibly with a new
    /// creator).
    pub updated_lists: Vec<ListId>,
    /// Lists the cascade could not process; the caller surfaces these.
    pub failures: Vec<CascadeFailure>,
}

impl CascadeReport {
    /// Whether every list was processed successfully.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Account-deletion cascade service.
#[derive(Clone)]
pub struct AccountCascadeService<L, U> {
    lists: Arc<L>,
    users: Arc<U>,
}

impl<L, U> AccountCascadeService<L, U> {
    /// Create a new cascade service over the list and user collections.
    pub fn new(lists: Arc<L>, users: Arc<U>) -> Self {
        Self { lists, users }
    }
}

impl<L, U> AccountCascadeService<L, U>
where
    L: ListRepository,
    U: UserDirectory,
{
    /// Remove `user_id` from every list they participate in, then soft
    /// delete their user document.
    ///
    /// Per list:
    /// - sole participant → the list and its items are deleted atomically;
    /// - participant and creator → ownership transfers to the lowest
    ///   remaining `UserId` and the user is removed from the members;
    /// - plain member → the user is removed from the members.
    ///
    /// List failures are collected into the returned [`CascadeReport`] and
    /// logged; they never abort the cascade.
    ///
    /// # Errors
    /// `not_found` when the user does not exist; directory failures when
    /// the final soft delete cannot be written. List-level failures are
    /// reported, not returned.
    pub async fn delete_user(&self, user_id: &UserId) -> Result<CascadeReport, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_directory_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        let involved: Vec<List> = self
            .lists
            .list_all()
            .await
            .map_err(map_list_repo_error)?
            .into_iter()
            .filter(|list| list.creator_id == *user_id || list.is_member(user_id))
            .collect();

        let mut report = CascadeReport::default();
        for list in involved {
            match self.process_list(user_id, &list).await {
                Ok(deleted) => {
                    if deleted {
                        report.deleted_lists.push(list.id);
                    } else {
                        report.updated_lists.push(list.id);
                    }
                }
                Err(error) => {
                    warn!(list = %list.id, user = %user_id, %error, "cascade step failed");
                    report.failures.push(CascadeFailure {
                        list_id: list.id,
                        error,
                    });
                }
            }
        }

        self.users
            .mark_deleted(user_id, Utc::now())
            .await
            .map_err(map_user_directory_error)?;
        info!(
            user = %user_id,
            deleted = report.deleted_lists.len(),
            updated = report.updated_lists.len(),
            failed = report.failures.len(),
            "account deletion cascade finished"
        );
        Ok(report)
    }

    /// Returns `Ok(true)` when the list was deleted, `Ok(false)` when it
    /// survived with the user removed.
    async fn process_list(&self, user_id: &UserId, list: &List) -> Result<bool, Error> {
        let participants = list.participants();
        let sole_participant = participants.len() == 1 && participants.contains(user_id);
        if sole_participant {
            self.lists
                .delete_with_items(&list.id)
                .await
                .map_err(map_list_repo_error)?;
            return Ok(true);
        }

        if list.creator_id == *user_id {
            let mut remaining = list.members.clone();
            remaining.remove(user_id);
            // BTreeSet order makes "first remaining member" deterministic:
            // the lowest remaining UserId becomes the new creator.
            let Some(new_creator) = remaining.iter().next().copied() else {
                return Err(Error::internal(
                    "creator transfer impossible: no remaining members",
                ));
            };
            self.lists
                .replace_creator(&list.id, &new_creator, &remaining)
                .await
                .map_err(map_list_repo_error)?;
        } else {
            self.lists
                .remove_member(&list.id, user_id)
                .await
                .map_err(map_list_repo_error)?;
        }
        Ok(false)
    }
}

//! Registration and login flows.
//!
//! Authentication itself is the identity provider's job; this service keeps
//! the application's user document in step with it and applies the
//! soft-delete policy on login.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::domain::list_service::map_user_directory_error;
use crate::domain::ports::{IdentityError, IdentityProvider, UserDirectory};
use crate::domain::{DisplayName, EmailAddress, Error, User, UserId};

fn map_identity_error(error: IdentityError) -> Error {
    match error {
        IdentityError::EmailTaken => Error::conflict("an account already exists for this email"),
        IdentityError::InvalidCredentials => Error::unauthorized("invalid email or password"),
        IdentityError::Backend { message } => {
            Error::service_unavailable(format!("identity provider unavailable: {message}"))
        }
    }
}

/// Registration/login service.
#[derive(Clone)]
pub struct AccountService<P, D> {
    identity: Arc<P>,
    users: Arc<D>,
}

impl<P, D> AccountService<P, D> {
    /// Create a new service over the identity provider and user directory.
    pub fn new(identity: Arc<P>, users: Arc<D>) -> Self {
        Self { identity, users }
    }
}

impl<P, D> AccountService<P, D>
where
    P: IdentityProvider,
    D: UserDirectory,
{
    /// Register a new account and create its user document.
    ///
    /// The e-mail is case-folded before it reaches the identity provider,
    /// so lookups and storage never disagree about casing.
    ///
    /// # Errors
    /// `invalid_request` for a malformed e-mail or display name,
    /// `conflict` when the e-mail already has an account, plus provider
    /// and directory failures.
    pub async fn register(
        &self,
        raw_email: &str,
        password: &str,
        raw_display_name: &str,
    ) -> Result<User, Error> {
        let email =
            EmailAddress::new(raw_email).map_err(|err| Error::invalid_request(err.to_string()))?;
        let display_name = DisplayName::new(raw_display_name)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let account = self
            .identity
            .register(&email, password)
            .await
            .map_err(map_identity_error)?;

        let user = User::new(account.id, account.email, display_name, Utc::now());
        self.users
            .upsert(&user)
            .await
            .map_err(map_user_directory_error)?;
        debug!(user = %user.id, "user registered");
        Ok(user)
    }

    /// Authenticate and load the user document.
    ///
    /// Soft-deleted accounts are refused even when the identity provider
    /// still accepts their credentials — the provider record outlives the
    /// application account by design.
    ///
    /// # Errors
    /// `unauthorized` for bad credentials, `forbidden` for deactivated
    /// accounts, `not_found` when the user document is missing, plus
    /// provider and directory failures.
    pub async fn login(&self, raw_email: &str, password: &str) -> Result<User, Error> {
        let email =
            EmailAddress::new(raw_email).map_err(|err| Error::invalid_request(err.to_string()))?;
        let account = self
            .identity
            .authenticate(&email, password)
            .await
            .map_err(map_identity_error)?;

        let user = self
            .users
            .find_by_id(&account.id)
            .await
            .map_err(map_user_directory_error)?
            .ok_or_else(|| Error::not_found("user profile not found"))?;
        if user.deleted {
            return Err(Error::forbidden("account deactivated"));
        }
        Ok(user)
    }

    /// Replace the opaque preferences blob on the user document.
    ///
    /// # Errors
    /// `not_found` for an unknown user, plus directory failures.
    pub async fn update_preferences(
        &self,
        user_id: &UserId,
        preferences: Value,
    ) -> Result<(), Error> {
        self.users
            .set_preferences(user_id, preferences)
            .await
            .map_err(map_user_directory_error)
    }
}

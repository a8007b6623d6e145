//! Port for the external identity provider.
//!
//! Authentication is fully delegated: the application never sees password
//! hashes, only stable account ids and e-mails. Accounts cannot be deleted
//! through this port — deleting an identity-provider record requires the
//! user's own fresh credential, which is why the application soft-deletes
//! its user documents instead.

use async_trait::async_trait;

use crate::domain::{EmailAddress, UserId};

/// Errors raised by identity provider adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// Registration attempted with an e-mail that already has an account.
    #[error("an account already exists for this email")]
    EmailTaken,
    /// Login rejected: unknown e-mail or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The provider could not be reached or failed internally.
    #[error("identity provider error: {message}")]
    Backend {
        /// Provider-supplied failure description.
        message: String,
    },
}

/// An authenticated identity-provider account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthAccount {
    /// Stable account identifier, shared with the user document.
    pub id: UserId,
    /// The account's folded e-mail address.
    pub email: EmailAddress,
}

/// Port for account registration and authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a new account.
    async fn register(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<AuthAccount, IdentityError>;

    /// Authenticate an existing account.
    async fn authenticate(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<AuthAccount, IdentityError>;
}

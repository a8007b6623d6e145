//! User data model.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Validation errors returned by the user value-type constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The e-mail address is empty after trimming.
    EmptyEmail,
    /// The e-mail address does not look like `local@domain.tld`.
    InvalidEmail,
    /// The display name is empty after trimming.
    EmptyDisplayName,
    /// The display name exceeds the maximum length.
    DisplayNameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email address must not be empty"),
            Self::InvalidEmail => write!(f, "email address must look like user@example.com"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier issued by the identity provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an identity-provider UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Shape check only; deliverability is the identity provider's problem.
        #[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
        let re = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex must compile");
        re
    })
}

/// Case-folded e-mail address.
///
/// E-mails are trimmed and lowered on construction so lookups and storage
/// never disagree about casing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`], folding to lowercase.
    ///
    /// # Errors
    /// Returns [`UserValidationError`] when the input is empty or does not
    /// have an `local@domain.tld` shape.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("  Alice@Example.COM ").expect("valid");
    /// assert_eq!(email.as_str(), "alice@example.com");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// The folded e-mail address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::str::FromStr for EmailAddress {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Human readable display name for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`] from trimmed input.
    ///
    /// # Errors
    /// Returns [`UserValidationError`] when the trimmed input is empty or
    /// longer than [`DISPLAY_NAME_MAX`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The validated display name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user document.
///
/// The identity provider owns authentication; this document carries the
/// profile data the application needs. `deleted` is a soft-delete flag —
/// identity-provider accounts cannot be removed from the client, so deleted
/// users are tombstoned instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier shared with the identity provider.
    pub id: UserId,
    /// Case-folded e-mail address, unique across users.
    pub email: EmailAddress,
    /// Profile display name.
    pub display_name: DisplayName,
    /// Opaque client preference blob, merged on update.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub preferences: Value,
    /// Soft-delete flag set by the account-deletion cascade.
    #[serde(default)]
    pub deleted: bool,
    /// When the soft delete happened, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Construct a fresh, not-deleted user document.
    #[must_use]
    pub fn new(
        id: UserId,
        email: EmailAddress,
        display_name: DisplayName,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            display_name,
            preferences: Value::Null,
            deleted: false,
            deleted_at: None,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice@example.com", "alice@example.com")]
    #[case("  Bob@Example.COM  ", "bob@example.com")]
    #[case("MIXED.Case+tag@Sub.Domain.org", "mixed.case+tag@sub.domain.org")]
    fn emails_fold_to_lowercase(#[case] raw: &str, #[case] folded: &str) {
        let email = EmailAddress::new(raw).expect("valid email");
        assert_eq!(email.as_str(), folded);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("not-an-email")]
    #[case("missing@tld")]
    #[case("two words@example.com")]
    fn invalid_emails_are_rejected(#[case] raw: &str) {
        assert!(EmailAddress::new(raw).is_err());
    }

    #[test]
    fn folded_emails_compare_equal() {
        let a = EmailAddress::new("Alice@Example.COM").expect("valid");
        let b = EmailAddress::new("alice@example.com").expect("valid");
        assert_eq!(a, b);
    }

    #[test]
    fn display_name_rejects_empty_after_trim() {
        assert_eq!(
            DisplayName::new("   "),
            Err(UserValidationError::EmptyDisplayName)
        );
    }

    #[test]
    fn display_name_trims() {
        let name = DisplayName::new("  Alice  ").expect("valid");
        assert_eq!(name.as_str(), "Alice");
    }

    #[test]
    fn user_ids_order_deterministically() {
        let low = UserId::from_uuid(Uuid::from_u128(1));
        let high = UserId::from_uuid(Uuid::from_u128(2));
        assert!(low < high);
    }
}

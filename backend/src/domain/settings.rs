//! Administration configuration loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::EmailAddress;

const DEFAULT_ADMIN_EMAIL: &str = "admin@admin.com";

/// Configuration values for the administration surface.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ADMIN")]
pub struct AdminSettings {
    /// E-mail address of the administrator account.
    pub email: Option<EmailAddress>,
}

impl AdminSettings {
    /// The configured admin e-mail, falling back to the default.
    #[must_use]
    pub fn email(&self) -> EmailAddress {
        self.email.clone().unwrap_or_else(default_admin_email)
    }
}

fn default_admin_email() -> EmailAddress {
    #[expect(clippy::expect_used, reason = "constant is a valid email address")]
    let email = EmailAddress::new(DEFAULT_ADMIN_EMAIL).expect("default admin email must parse");
    email
}

#[cfg(test)]
mod tests {
    //! Unit tests for administration configuration parsing.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    fn load_from_empty_args() -> AdminSettings {
        AdminSettings::load_from_iter([OsString::from("backend")]).expect("config should load")
    }

    #[rstest]
    fn default_admin_email_is_used_when_missing() {
        let _guard = lock_env([("ADMIN_EMAIL", None::<String>)]);

        let settings = load_from_empty_args();
        assert_eq!(settings.email().as_str(), DEFAULT_ADMIN_EMAIL);
    }

    #[rstest]
    fn environment_override_is_folded() {
        let _guard = lock_env([("ADMIN_EMAIL", Some("Root@Example.COM".to_owned()))]);

        let settings = load_from_empty_args();
        assert_eq!(settings.email().as_str(), "root@example.com");
    }
}

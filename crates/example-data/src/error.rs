//! Error types for the example-data crate.

use thiserror::Error;

/// Errors that can occur when parsing or querying a seed registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registry JSON is malformed or missing required fields.
    #[error("invalid registry JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The registry version is not supported.
    #[error("unsupported registry version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Expected version number.
        expected: u32,
        /// Actual version found in the registry.
        actual: u32,
    },

    /// The registry contains no seed definitions.
    #[error("registry contains no seeds")]
    EmptySeeds,

    /// The registry catalogue is missing entries generation depends on.
    #[error("registry catalogue is missing {what}")]
    EmptyCatalogue {
        /// Which catalogue array was empty.
        what: &'static str,
    },
}

/// Errors that can occur while generating a household.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The seed requests fewer users than a household needs.
    #[error("seed '{name}' requests {count} users; at least {min} are required")]
    TooFewUsers {
        /// Seed name.
        name: String,
        /// Requested user count.
        count: usize,
        /// Minimum supported user count.
        min: usize,
    },
}

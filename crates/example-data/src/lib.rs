//! Deterministic example shopping data generation for demonstration purposes.
//!
//! This crate produces believable, reproducible households — users, a shared
//! group, shopping lists, and items — from a JSON seed registry. It is
//! independent of backend domain types to avoid circular dependencies: the
//! backend replays the generated seeds through its own services.
//!
//! # Example
//!
//! ```
//! use example_data::{SeedRegistry, generate_example_household};
//!
//! let registry = SeedRegistry::builtin().expect("builtin registry parses");
//! let seed_def = registry.find_seed("mossy-owl").expect("seed exists");
//! let household = generate_example_household(&registry, seed_def).expect("generation succeeds");
//!
//! assert!(!household.users.is_empty());
//! // Same seed produces identical output.
//! let again = generate_example_household(&registry, seed_def).expect("generation succeeds");
//! assert_eq!(household, again);
//! ```

mod error;
mod generator;
mod registry;
mod seed;

pub use error::{GenerationError, RegistryError};
pub use generator::generate_example_household;
pub use registry::{SeedDefinition, SeedRegistry};
pub use seed::{
    ExampleGroupSeed, ExampleHousehold, ExampleItemSeed, ExampleListSeed, ExampleUserSeed,
};

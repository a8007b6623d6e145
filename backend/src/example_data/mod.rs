//! Example data seeding through the domain services.
//!
//! Feature-gated (`example-data`). Replays a deterministic generated
//! household from the `example-data` crate through the real services, so
//! seeded data obeys every membership invariant the policies enforce.

mod config;
mod seeder;

pub use config::ExampleDataSettings;
pub use seeder::{SeedSummary, seed_memory_store};

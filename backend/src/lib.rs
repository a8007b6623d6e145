//! Shopping-list backend library.
//!
//! The domain layer owns the membership model: who belongs to a list, how
//! group membership snapshots into linked lists, and how removals and
//! account deletion cascade. Persistence, authentication, and live queries
//! are delegated to an external backend-as-a-service behind the ports in
//! [`domain::ports`]; [`outbound::memory`] provides the in-process adapter
//! used by tests, demos, and seeding.

pub mod domain;
#[cfg(feature = "example-data")]
pub mod example_data;
pub mod outbound;
pub mod telemetry;

//! Account and revocation store adapters.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryAccountStore, InMemoryRevocationStore};
pub use postgres::{PostgresAccountStore, PostgresRevocationStore, ensure_schema};

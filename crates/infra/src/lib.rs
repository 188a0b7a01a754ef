//! Infrastructure layer: in-memory implementations of the graph accessor
//! and the auth-provider adapter traits (dev/test wiring).
//!
//! Persistent (relational) implementations would live here too; the traits
//! in `warden-rbac` and `warden-auth` are the seams.

pub mod directory;
pub mod rbac_store;

#[cfg(test)]
mod integration_tests;

pub use directory::InMemoryDirectory;
pub use rbac_store::InMemoryRbacStore;

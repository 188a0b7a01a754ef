//! `warden-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod key;

pub use error::{DomainError, DomainResult};
pub use id::{ActionId, ApplicationId, MemberId, OrgId, ResourceId, RoleId};
pub use key::Key;

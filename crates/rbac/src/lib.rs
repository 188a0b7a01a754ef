//! `warden-rbac` — the custom RBAC permission engine.
//!
//! Three pieces, leaf to root:
//! - [`cache`]: a bounded, TTL-expiring fingerprint → boolean store;
//! - [`store`]: the graph accessor contract over applications, resources,
//!   actions, roles and their assignments;
//! - [`resolver`]: the priority-ordered decision procedure that answers
//!   "may this member perform this action on this resource in this
//!   application?".

pub mod cache;
pub mod entities;
pub mod resolver;
pub mod store;

pub use cache::{CacheConfig, Fingerprint, PermissionCache};
pub use entities::{
    Action, ActionRef, Application, ApplicationPatch, ApplicationRole, MemberRoleAssignment,
    Resource, RolePatch,
};
pub use resolver::{CheckOutcome, HierarchyResolver, ReasonCode, Requester};
pub use store::RbacStore;

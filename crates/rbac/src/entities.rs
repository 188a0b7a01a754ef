//! Graph entities for the custom per-application RBAC hierarchy.
//!
//! Scoping chain: Organization → Application → Resource → Action, with
//! application-scoped Roles bundling Actions for assignment to Members.

use serde::{Deserialize, Serialize};

use warden_core::{ActionId, ApplicationId, Key, MemberId, OrgId, ResourceId, RoleId};

/// An application registered under one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub organization_id: OrgId,
    /// Organization-scoped unique key.
    pub key: Key,
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub active: bool,
}

/// A protected resource under one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub application_id: ApplicationId,
    /// Application-scoped unique key.
    pub key: Key,
    pub name: String,
    pub description: Option<String>,
}

/// An operation performable on its owning resource (e.g. `read`, `void`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub resource_id: ResourceId,
    /// Resource-scoped unique key.
    pub key: Key,
    pub name: String,
    pub description: Option<String>,
}

/// A named bundle of actions, scoped to one application.
///
/// A role is not tied to any resource; it gains meaning only via its
/// assigned actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRole {
    pub id: RoleId,
    pub application_id: ApplicationId,
    /// Application-scoped unique key.
    pub key: Key,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
}

/// A member ↔ role assignment, denormalized with the organization and
/// application ids for fast filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRoleAssignment {
    pub member_id: MemberId,
    pub role_id: RoleId,
    pub organization_id: OrgId,
    pub application_id: ApplicationId,
}

/// A fully-qualified action reference, as returned by effective-action
/// listings (UI action trees, coarse console authorization).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRef {
    pub action_id: ActionId,
    pub application_key: Key,
    pub resource_key: Key,
    pub action_key: Key,
    pub name: String,
}

/// Partial update for an application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub active: Option<bool>,
}

/// Partial update for a role.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RolePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

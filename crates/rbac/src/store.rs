//! Graph accessor contract.
//!
//! The administrative CRUD surface mutates the graph through this trait; the
//! resolver reads it. Ownership invariants (sibling key uniqueness,
//! cross-application references, member/organization scoping) are enforced
//! here so violations surface as typed [`DomainError`]s rather than opaque
//! storage constraint failures, and always before any mutation.

use warden_auth::Member;
use warden_core::{
    ActionId, ApplicationId, DomainResult, Key, MemberId, OrgId, ResourceId, RoleId,
};

use crate::entities::{
    Action, ActionRef, Application, ApplicationPatch, ApplicationRole, Resource, RolePatch,
};

pub trait RbacStore: Send + Sync {
    // ── Applications ─────────────────────────────────────────────────────

    /// Register an application under an organization.
    ///
    /// `Conflict` if `key` collides with a sibling application.
    fn create_application(
        &self,
        organization_id: OrgId,
        key: Key,
        name: String,
        description: Option<String>,
    ) -> DomainResult<Application>;

    fn application(&self, id: ApplicationId) -> DomainResult<Option<Application>>;

    fn list_applications(&self, organization_id: OrgId) -> DomainResult<Vec<Application>>;

    fn update_application(&self, id: ApplicationId, patch: ApplicationPatch) -> DomainResult<Application>;

    /// Delete an application, cascading to its resources (hence their
    /// actions) and its roles (hence both assignment kinds).
    fn delete_application(&self, id: ApplicationId) -> DomainResult<()>;

    // ── Resources ────────────────────────────────────────────────────────

    fn create_resource(
        &self,
        application_id: ApplicationId,
        key: Key,
        name: String,
        description: Option<String>,
    ) -> DomainResult<Resource>;

    fn resource(&self, id: ResourceId) -> DomainResult<Option<Resource>>;

    fn list_resources(&self, application_id: ApplicationId) -> DomainResult<Vec<Resource>>;

    /// Delete a resource, cascading to its actions and any role-action
    /// assignments referencing them.
    fn delete_resource(&self, id: ResourceId) -> DomainResult<()>;

    // ── Actions ──────────────────────────────────────────────────────────

    fn create_action(
        &self,
        resource_id: ResourceId,
        key: Key,
        name: String,
        description: Option<String>,
    ) -> DomainResult<Action>;

    fn action(&self, id: ActionId) -> DomainResult<Option<Action>>;

    fn list_actions(&self, resource_id: ResourceId) -> DomainResult<Vec<Action>>;

    fn delete_action(&self, id: ActionId) -> DomainResult<()>;

    // ── Roles ────────────────────────────────────────────────────────────

    fn create_role(
        &self,
        application_id: ApplicationId,
        key: Key,
        name: String,
        description: Option<String>,
    ) -> DomainResult<ApplicationRole>;

    fn role(&self, id: RoleId) -> DomainResult<Option<ApplicationRole>>;

    fn list_roles(&self, application_id: ApplicationId) -> DomainResult<Vec<ApplicationRole>>;

    fn update_role(&self, id: RoleId, patch: RolePatch) -> DomainResult<ApplicationRole>;

    /// Delete a role, cascading to its role-action and member-role
    /// assignments.
    fn delete_role(&self, id: RoleId) -> DomainResult<()>;

    // ── Assignments ──────────────────────────────────────────────────────

    /// Fully replace the action set of a role in one logical transaction.
    ///
    /// `InvalidReference` (with the role's set left unchanged) if any action
    /// belongs to a resource outside the role's application.
    fn replace_role_actions(&self, role_id: RoleId, action_ids: &[ActionId]) -> DomainResult<Vec<Action>>;

    fn role_actions(&self, role_id: RoleId) -> DomainResult<Vec<Action>>;

    /// Assign a role to a member. Idempotent: re-assigning is a no-op.
    ///
    /// `NotFound` if the role's application does not belong to the member's
    /// organization.
    fn assign_role_to_member(&self, member: &Member, role_id: RoleId) -> DomainResult<()>;

    fn unassign_role_from_member(&self, member_id: MemberId, role_id: RoleId) -> DomainResult<()>;

    // ── Reads for the resolver and consoles ──────────────────────────────

    /// Union of actions reachable through all roles assigned to the member,
    /// optionally filtered to one application.
    fn list_effective_actions(
        &self,
        member_id: MemberId,
        application_key: Option<&Key>,
    ) -> DomainResult<Vec<ActionRef>>;

    /// The resolver's joined lookup: does at least one of the member's roles
    /// grant `action_key` on `resource_key` within `application_key`?
    fn member_has_action(
        &self,
        member_id: MemberId,
        application_key: &Key,
        resource_key: &Key,
        action_key: &Key,
    ) -> DomainResult<bool>;
}

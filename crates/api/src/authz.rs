//! API-side coarse authorization for the console CRUD surface.
//!
//! Platform admins may do anything. Everyone else is scoped to organizations
//! they belong to: `owner`/`admin` members may mutate, plain members are
//! read-only. The fine-grained resolver is for permission *questions*; this
//! guard is for the graph-management endpoints themselves.

use warden_auth::Member;
use warden_core::{DomainError, DomainResult, OrgId};

use crate::app::AppServices;
use crate::context::RequesterContext;

/// Require read access to an organization's RBAC graph: platform admin or
/// any member of the organization.
pub fn require_org_read(
    services: &AppServices,
    requester: &RequesterContext,
    organization_id: OrgId,
) -> DomainResult<()> {
    if requester.platform_role().is_admin() {
        return Ok(());
    }
    membership(services, requester, organization_id).map(|_| ())
}

/// Require write access to an organization's RBAC graph: platform admin or
/// an `owner`/`admin` member of the organization.
pub fn require_org_write(
    services: &AppServices,
    requester: &RequesterContext,
    organization_id: OrgId,
) -> DomainResult<()> {
    if requester.platform_role().is_admin() {
        return Ok(());
    }
    let member = membership(services, requester, organization_id)?;
    if member.role.can_write() {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

fn membership(
    services: &AppServices,
    requester: &RequesterContext,
    organization_id: OrgId,
) -> DomainResult<Member> {
    services
        .directory
        .member_for_user(organization_id, requester.principal_id())
        .map_err(|e| DomainError::check_failed(e.to_string()))?
        .ok_or(DomainError::Forbidden)
}

use warden_auth::{PlatformRole, PrincipalId};
use warden_rbac::Requester;

/// Requester context for a request (authenticated identity + platform role).
///
/// This is immutable and must be present for all protected routes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequesterContext {
    principal_id: PrincipalId,
    platform_role: PlatformRole,
}

impl RequesterContext {
    pub fn new(principal_id: PrincipalId, platform_role: PlatformRole) -> Self {
        Self {
            principal_id,
            platform_role,
        }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn platform_role(&self) -> PlatformRole {
        self.platform_role
    }

    pub fn requester(&self) -> Requester {
        Requester {
            principal_id: self.principal_id,
            platform_role: self.platform_role,
        }
    }
}

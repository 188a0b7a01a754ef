use serde::{Deserialize, Serialize};

use warden_core::{MemberId, OrgId};

use crate::{OrgRole, PrincipalId};

/// A user's membership record within one organization.
///
/// Owned by the external auth provider; Warden only reads it through
/// [`crate::MemberDirectory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub organization_id: OrgId,
    pub user_id: PrincipalId,
    pub role: OrgRole,
}

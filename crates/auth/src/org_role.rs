use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Organization-level role carried on a membership (`owner`, `admin`,
/// `member`, ...).
///
/// Intentionally an opaque string: the provider may define further roles.
/// Only `owner` and `admin` carry special meaning here — blanket access to
/// everything scoped under the organization, including all custom
/// applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgRole(Cow<'static, str>);

impl OrgRole {
    pub const OWNER: OrgRole = OrgRole(Cow::Borrowed("owner"));
    pub const ADMIN: OrgRole = OrgRole(Cow::Borrowed("admin"));
    pub const MEMBER: OrgRole = OrgRole(Cow::Borrowed("member"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Owners and admins inherit every permission under their organization.
    pub fn grants_blanket_access(&self) -> bool {
        matches!(self.as_str(), "owner" | "admin")
    }

    /// Coarse write authorization for the self-service console: `owner` and
    /// `admin` may mutate, everyone else is read-only.
    pub fn can_write(&self) -> bool {
        self.grants_blanket_access()
    }
}

impl core::fmt::Display for OrgRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

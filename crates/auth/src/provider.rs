//! Adapter traits for the external auth provider.
//!
//! The provider's responses are loosely typed at its own boundary; these
//! traits are the single translation layer. Everything past this point is
//! fully typed.

use thiserror::Error;

use warden_core::{Key, MemberId, OrgId};

use crate::{Member, PrincipalId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("auth provider unavailable: {0}")]
    Unavailable(String),

    #[error("auth provider returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Membership lookup against the provider's organization records.
pub trait MemberDirectory: Send + Sync {
    /// Resolve a member by id.
    fn member(&self, member_id: MemberId) -> Result<Option<Member>, ProviderError>;

    /// Resolve the membership of a user within one organization, if any.
    fn member_for_user(
        &self,
        organization_id: OrgId,
        user_id: PrincipalId,
    ) -> Result<Option<Member>, ProviderError>;
}

/// The provider's built-in organization access-control evaluation.
///
/// Used only for the built-in resource kinds; the custom RBAC graph never
/// flows through here.
pub trait OrgAccessControl: Send + Sync {
    /// Evaluate `{ resource: [action] }` for a member within their organization.
    fn has_permission(
        &self,
        member: &Member,
        resource: &Key,
        action: &Key,
    ) -> Result<bool, ProviderError>;
}

/// Resource kinds governed by the provider's native access-control model
/// rather than the custom RBAC graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BuiltinResource {
    Organization,
    Member,
    Invitation,
    Team,
    AccessControl,
}

impl BuiltinResource {
    /// Classify a resource key; `None` means the key belongs to the custom
    /// RBAC graph.
    pub fn from_key(key: &Key) -> Option<Self> {
        match key.as_str() {
            "organization" => Some(Self::Organization),
            "member" => Some(Self::Member),
            "invitation" => Some(Self::Invitation),
            "team" => Some(Self::Team),
            "ac" => Some(Self::AccessControl),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_kinds_are_recognized() {
        for kind in ["organization", "member", "invitation", "team", "ac"] {
            let key = Key::new(kind).unwrap();
            assert!(BuiltinResource::from_key(&key).is_some(), "{kind} should be builtin");
        }
    }

    #[test]
    fn custom_resources_are_not_builtin() {
        let key = Key::new("invoice").unwrap();
        assert!(BuiltinResource::from_key(&key).is_none());
    }
}

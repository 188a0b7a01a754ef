//! In-memory auth-provider stand-in.
//!
//! Implements both adapter traits: membership lookup and the provider's
//! built-in organization permission statements. Statements are explicit
//! `(member, resource, action)` grants; there is no wildcard logic here —
//! owner/admin blanket access is the resolver's job, not the provider's.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use warden_auth::{Member, MemberDirectory, OrgAccessControl, PrincipalId, ProviderError};
use warden_core::{Key, MemberId, OrgId};

#[derive(Debug, Default)]
struct State {
    members: HashMap<MemberId, Member>,
    builtin_grants: HashSet<(MemberId, Key, Key)>,
}

/// In-memory [`MemberDirectory`] + [`OrgAccessControl`] for dev/tests.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<State>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a membership record.
    pub fn upsert_member(&self, member: Member) {
        if let Ok(mut state) = self.inner.write() {
            state.members.insert(member.id, member);
        }
    }

    pub fn remove_member(&self, member_id: MemberId) {
        if let Ok(mut state) = self.inner.write() {
            state.members.remove(&member_id);
            state.builtin_grants.retain(|(m, _, _)| *m != member_id);
        }
    }

    /// Grant a built-in organization permission statement to a member.
    pub fn grant_builtin(&self, member_id: MemberId, resource: Key, action: Key) {
        if let Ok(mut state) = self.inner.write() {
            state.builtin_grants.insert((member_id, resource, action));
        }
    }
}

impl MemberDirectory for InMemoryDirectory {
    fn member(&self, member_id: MemberId) -> Result<Option<Member>, ProviderError> {
        let state = self
            .inner
            .read()
            .map_err(|_| ProviderError::Unavailable("directory lock poisoned".into()))?;
        Ok(state.members.get(&member_id).cloned())
    }

    fn member_for_user(
        &self,
        organization_id: OrgId,
        user_id: PrincipalId,
    ) -> Result<Option<Member>, ProviderError> {
        let state = self
            .inner
            .read()
            .map_err(|_| ProviderError::Unavailable("directory lock poisoned".into()))?;
        Ok(state
            .members
            .values()
            .find(|m| m.organization_id == organization_id && m.user_id == user_id)
            .cloned())
    }
}

impl OrgAccessControl for InMemoryDirectory {
    fn has_permission(
        &self,
        member: &Member,
        resource: &Key,
        action: &Key,
    ) -> Result<bool, ProviderError> {
        let state = self
            .inner
            .read()
            .map_err(|_| ProviderError::Unavailable("directory lock poisoned".into()))?;
        Ok(state
            .builtin_grants
            .contains(&(member.id, resource.clone(), action.clone())))
    }
}

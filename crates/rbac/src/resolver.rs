//! The ordered permission decision procedure.
//!
//! Four steps, evaluated strictly in order, short-circuiting on first match:
//!
//! 1. platform-admin override;
//! 2. organization-role inheritance (`owner`/`admin`);
//! 3. built-in organization resources, delegated to the auth provider;
//! 4. the custom RBAC graph, behind the permission cache.
//!
//! A denied check is `allowed = false`; an evaluation failure is
//! `DomainError::CheckFailed`. The two never blend: callers fail closed on
//! errors instead of reading them as denials.

use std::sync::Arc;

use serde::Serialize;

use warden_auth::{BuiltinResource, MemberDirectory, OrgAccessControl, PlatformRole, PrincipalId, ProviderError};
use warden_core::{DomainError, DomainResult, Key, MemberId};

use crate::cache::{Fingerprint, PermissionCache};
use crate::store::RbacStore;

/// Why a check came back allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// The requesting principal holds the platform-wide admin role.
    PlatformAdmin,
    /// The target member's organization role is `owner` or `admin`.
    OrganizationRoleInherit,
    /// Granted by the provider's built-in organization permission model.
    OrganizationPermission,
    /// Granted through the custom role → action graph.
    RoleGrant,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::PlatformAdmin => "PLATFORM_ADMIN",
            ReasonCode::OrganizationRoleInherit => "ORGANIZATION_ROLE_INHERIT",
            ReasonCode::OrganizationPermission => "ORGANIZATION_PERMISSION",
            ReasonCode::RoleGrant => "ROLE_GRANT",
        }
    }
}

/// The authenticated principal asking the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub principal_id: PrincipalId,
    pub platform_role: PlatformRole,
}

/// Result of one permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutcome {
    pub allowed: bool,
    /// Present on allowed outcomes; a denial carries no reason.
    pub reason: Option<ReasonCode>,
    /// Whether step 4 was answered from the cache.
    pub cached: bool,
}

impl CheckOutcome {
    fn allowed(reason: ReasonCode) -> Self {
        Self {
            allowed: true,
            reason: Some(reason),
            cached: false,
        }
    }

    fn graph(allowed: bool, cached: bool) -> Self {
        Self {
            allowed,
            reason: allowed.then_some(ReasonCode::RoleGrant),
            cached,
        }
    }
}

/// The permission resolution engine.
///
/// All collaborators are constructor-injected; the cache is optional and its
/// absence never changes a boolean result.
pub struct HierarchyResolver {
    store: Arc<dyn RbacStore>,
    directory: Arc<dyn MemberDirectory>,
    org_access: Arc<dyn OrgAccessControl>,
    cache: Option<PermissionCache>,
}

impl HierarchyResolver {
    pub fn new(
        store: Arc<dyn RbacStore>,
        directory: Arc<dyn MemberDirectory>,
        org_access: Arc<dyn OrgAccessControl>,
        cache: Option<PermissionCache>,
    ) -> Self {
        Self {
            store,
            directory,
            org_access,
            cache,
        }
    }

    /// May `member_id` perform `action_key` on `resource_key` within
    /// `application_key`?
    ///
    /// `NotFound` if the member does not resolve; `Forbidden` if the
    /// requester is neither a platform admin nor the member's own user.
    pub fn check_permission(
        &self,
        requester: &Requester,
        member_id: MemberId,
        application_key: &Key,
        resource_key: &Key,
        action_key: &Key,
    ) -> DomainResult<CheckOutcome> {
        let member = self
            .directory
            .member(member_id)
            .map_err(provider_failure)?
            .ok_or(DomainError::NotFound)?;

        if !requester.platform_role.is_admin() && requester.principal_id != member.user_id {
            return Err(DomainError::Forbidden);
        }

        // Step 1: platform-admin override. Bypasses everything, cache included.
        if requester.platform_role.is_admin() {
            tracing::debug!(%member_id, "check allowed: platform admin");
            return Ok(CheckOutcome::allowed(ReasonCode::PlatformAdmin));
        }

        // Step 2: organization owners/admins inherit everything under their
        // organization.
        if member.role.grants_blanket_access() {
            tracing::debug!(%member_id, role = %member.role, "check allowed: organization role");
            return Ok(CheckOutcome::allowed(ReasonCode::OrganizationRoleInherit));
        }

        // Step 3: built-in resource kinds are governed entirely by the
        // provider's model; neither the cache nor the graph is consulted.
        if BuiltinResource::from_key(resource_key).is_some() {
            let allowed = self
                .org_access
                .has_permission(&member, resource_key, action_key)
                .map_err(provider_failure)?;
            tracing::debug!(%member_id, %resource_key, %action_key, allowed, "builtin resource check");
            return Ok(CheckOutcome {
                allowed,
                reason: allowed.then_some(ReasonCode::OrganizationPermission),
                cached: false,
            });
        }

        // Step 4: custom graph lookup, cache-wrapped.
        let fingerprint = Fingerprint::new(
            member_id,
            application_key.clone(),
            resource_key.clone(),
            action_key.clone(),
        );

        if let Some(cache) = &self.cache {
            if let Some(allowed) = cache.get(&fingerprint) {
                return Ok(CheckOutcome::graph(allowed, true));
            }
        }

        let allowed =
            self.store
                .member_has_action(member_id, application_key, resource_key, action_key)?;

        if let Some(cache) = &self.cache {
            cache.set(&fingerprint, allowed);
        }

        tracing::debug!(%member_id, %application_key, %resource_key, %action_key, allowed, "graph check");
        Ok(CheckOutcome::graph(allowed, false))
    }
}

fn provider_failure(err: ProviderError) -> DomainError {
    DomainError::check_failed(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use warden_auth::{Member, OrgRole};
    use warden_core::{ActionId, ApplicationId, OrgId, ResourceId, RoleId};

    use crate::cache::CacheConfig;
    use crate::entities::{
        Action, ActionRef, Application, ApplicationPatch, ApplicationRole, Resource, RolePatch,
    };

    /// Store stub: answers `member_has_action` with a fixed boolean and
    /// counts how often the graph was hit. Every other operation is out of
    /// scope for resolver ordering tests.
    struct StubStore {
        grant: bool,
        lookups: AtomicUsize,
        fail: bool,
    }

    impl StubStore {
        fn granting(grant: bool) -> Self {
            Self {
                grant,
                lookups: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                grant: false,
                lookups: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    impl RbacStore for StubStore {
        fn create_application(
            &self,
            _: OrgId,
            _: Key,
            _: String,
            _: Option<String>,
        ) -> DomainResult<Application> {
            unimplemented!()
        }

        fn application(&self, _: ApplicationId) -> DomainResult<Option<Application>> {
            unimplemented!()
        }

        fn list_applications(&self, _: OrgId) -> DomainResult<Vec<Application>> {
            unimplemented!()
        }

        fn update_application(&self, _: ApplicationId, _: ApplicationPatch) -> DomainResult<Application> {
            unimplemented!()
        }

        fn delete_application(&self, _: ApplicationId) -> DomainResult<()> {
            unimplemented!()
        }

        fn create_resource(
            &self,
            _: ApplicationId,
            _: Key,
            _: String,
            _: Option<String>,
        ) -> DomainResult<Resource> {
            unimplemented!()
        }

        fn resource(&self, _: ResourceId) -> DomainResult<Option<Resource>> {
            unimplemented!()
        }

        fn list_resources(&self, _: ApplicationId) -> DomainResult<Vec<Resource>> {
            unimplemented!()
        }

        fn delete_resource(&self, _: ResourceId) -> DomainResult<()> {
            unimplemented!()
        }

        fn create_action(
            &self,
            _: ResourceId,
            _: Key,
            _: String,
            _: Option<String>,
        ) -> DomainResult<Action> {
            unimplemented!()
        }

        fn action(&self, _: ActionId) -> DomainResult<Option<Action>> {
            unimplemented!()
        }

        fn list_actions(&self, _: ResourceId) -> DomainResult<Vec<Action>> {
            unimplemented!()
        }

        fn delete_action(&self, _: ActionId) -> DomainResult<()> {
            unimplemented!()
        }

        fn create_role(
            &self,
            _: ApplicationId,
            _: Key,
            _: String,
            _: Option<String>,
        ) -> DomainResult<ApplicationRole> {
            unimplemented!()
        }

        fn role(&self, _: RoleId) -> DomainResult<Option<ApplicationRole>> {
            unimplemented!()
        }

        fn list_roles(&self, _: ApplicationId) -> DomainResult<Vec<ApplicationRole>> {
            unimplemented!()
        }

        fn update_role(&self, _: RoleId, _: RolePatch) -> DomainResult<ApplicationRole> {
            unimplemented!()
        }

        fn delete_role(&self, _: RoleId) -> DomainResult<()> {
            unimplemented!()
        }

        fn replace_role_actions(&self, _: RoleId, _: &[ActionId]) -> DomainResult<Vec<Action>> {
            unimplemented!()
        }

        fn role_actions(&self, _: RoleId) -> DomainResult<Vec<Action>> {
            unimplemented!()
        }

        fn assign_role_to_member(&self, _: &Member, _: RoleId) -> DomainResult<()> {
            unimplemented!()
        }

        fn unassign_role_from_member(&self, _: MemberId, _: RoleId) -> DomainResult<()> {
            unimplemented!()
        }

        fn list_effective_actions(
            &self,
            _: MemberId,
            _: Option<&Key>,
        ) -> DomainResult<Vec<ActionRef>> {
            unimplemented!()
        }

        fn member_has_action(
            &self,
            _: MemberId,
            _: &Key,
            _: &Key,
            _: &Key,
        ) -> DomainResult<bool> {
            if self.fail {
                return Err(DomainError::check_failed("storage exploded"));
            }
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.grant)
        }
    }

    struct StubDirectory {
        member: Option<Member>,
    }

    impl MemberDirectory for StubDirectory {
        fn member(&self, _: MemberId) -> Result<Option<Member>, ProviderError> {
            Ok(self.member.clone())
        }

        fn member_for_user(
            &self,
            _: OrgId,
            _: PrincipalId,
        ) -> Result<Option<Member>, ProviderError> {
            Ok(self.member.clone())
        }
    }

    /// Provider access control stub: fixed answer + call counter.
    struct StubAccessControl {
        grant: bool,
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubAccessControl {
        fn granting(grant: bool) -> Self {
            Self {
                grant,
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    impl OrgAccessControl for StubAccessControl {
        fn has_permission(
            &self,
            _: &Member,
            _: &Key,
            _: &Key,
        ) -> Result<bool, ProviderError> {
            if self.fail {
                return Err(ProviderError::Unavailable("down".into()));
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.grant)
        }
    }

    fn member(role: OrgRole) -> Member {
        Member {
            id: MemberId::new(),
            organization_id: OrgId::new(),
            user_id: PrincipalId::new(),
            role,
        }
    }

    fn key(s: &str) -> Key {
        Key::new(s).unwrap()
    }

    struct Fixture {
        resolver: HierarchyResolver,
        store: Arc<StubStore>,
        access: Arc<StubAccessControl>,
        member: Member,
    }

    fn fixture(member: Member, store: StubStore, access: StubAccessControl) -> Fixture {
        let store = Arc::new(store);
        let access = Arc::new(access);
        let resolver = HierarchyResolver::new(
            store.clone(),
            Arc::new(StubDirectory {
                member: Some(member.clone()),
            }),
            access.clone(),
            Some(PermissionCache::default()),
        );
        Fixture {
            resolver,
            store,
            access,
            member,
        }
    }

    fn self_requester(member: &Member) -> Requester {
        Requester {
            principal_id: member.user_id,
            platform_role: PlatformRole::User,
        }
    }

    #[test]
    fn platform_admin_overrides_everything() {
        let f = fixture(
            member(OrgRole::MEMBER),
            StubStore::granting(false),
            StubAccessControl::granting(false),
        );
        let requester = Requester {
            principal_id: PrincipalId::new(),
            platform_role: PlatformRole::Admin,
        };

        let outcome = f
            .resolver
            .check_permission(&requester, f.member.id, &key("billing"), &key("invoice"), &key("void"))
            .unwrap();

        assert!(outcome.allowed);
        assert_eq!(outcome.reason, Some(ReasonCode::PlatformAdmin));
        assert_eq!(f.store.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(f.access.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn org_owner_inherits_without_any_assignment() {
        let f = fixture(
            member(OrgRole::OWNER),
            StubStore::granting(false),
            StubAccessControl::granting(false),
        );
        let requester = self_requester(&f.member);

        let outcome = f
            .resolver
            .check_permission(&requester, f.member.id, &key("billing"), &key("invoice"), &key("void"))
            .unwrap();

        assert!(outcome.allowed);
        assert_eq!(outcome.reason, Some(ReasonCode::OrganizationRoleInherit));
        assert_eq!(f.store.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn builtin_resource_delegates_and_skips_cache_and_graph() {
        let f = fixture(
            member(OrgRole::MEMBER),
            StubStore::granting(true),
            StubAccessControl::granting(true),
        );
        let requester = self_requester(&f.member);

        for _ in 0..3 {
            let outcome = f
                .resolver
                .check_permission(&requester, f.member.id, &key("billing"), &key("member"), &key("create"))
                .unwrap();
            assert!(outcome.allowed);
            assert_eq!(outcome.reason, Some(ReasonCode::OrganizationPermission));
            assert!(!outcome.cached);
        }

        // Delegated every time: never cached, never a graph lookup.
        assert_eq!(f.access.calls.load(Ordering::SeqCst), 3);
        assert_eq!(f.store.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn graph_lookup_is_cached_within_ttl() {
        let f = fixture(
            member(OrgRole::MEMBER),
            StubStore::granting(true),
            StubAccessControl::granting(false),
        );
        let requester = self_requester(&f.member);

        let first = f
            .resolver
            .check_permission(&requester, f.member.id, &key("billing"), &key("invoice"), &key("void"))
            .unwrap();
        assert!(first.allowed);
        assert!(!first.cached);

        let second = f
            .resolver
            .check_permission(&requester, f.member.id, &key("billing"), &key("invoice"), &key("void"))
            .unwrap();
        assert!(second.allowed);
        assert!(second.cached);
        assert_eq!(f.store.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disabled_cache_does_not_change_results() {
        let store = Arc::new(StubStore::granting(true));
        let m = member(OrgRole::MEMBER);
        let resolver = HierarchyResolver::new(
            store.clone(),
            Arc::new(StubDirectory {
                member: Some(m.clone()),
            }),
            Arc::new(StubAccessControl::granting(false)),
            None,
        );
        let requester = self_requester(&m);

        for _ in 0..2 {
            let outcome = resolver
                .check_permission(&requester, m.id, &key("billing"), &key("invoice"), &key("void"))
                .unwrap();
            assert!(outcome.allowed);
            assert!(!outcome.cached);
        }
        assert_eq!(store.lookups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unknown_member_is_not_found() {
        let resolver = HierarchyResolver::new(
            Arc::new(StubStore::granting(true)),
            Arc::new(StubDirectory { member: None }),
            Arc::new(StubAccessControl::granting(true)),
            None,
        );
        let requester = Requester {
            principal_id: PrincipalId::new(),
            platform_role: PlatformRole::Admin,
        };

        let err = resolver
            .check_permission(&requester, MemberId::new(), &key("billing"), &key("invoice"), &key("void"))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn foreign_requester_is_forbidden() {
        let f = fixture(
            member(OrgRole::OWNER),
            StubStore::granting(true),
            StubAccessControl::granting(true),
        );
        let requester = Requester {
            principal_id: PrincipalId::new(),
            platform_role: PlatformRole::User,
        };

        let err = f
            .resolver
            .check_permission(&requester, f.member.id, &key("billing"), &key("invoice"), &key("void"))
            .unwrap_err();
        assert_eq!(err, DomainError::Forbidden);
    }

    #[test]
    fn store_failure_is_check_failed_not_denial() {
        let f = fixture(
            member(OrgRole::MEMBER),
            StubStore::failing(),
            StubAccessControl::granting(false),
        );
        let requester = self_requester(&f.member);

        let err = f
            .resolver
            .check_permission(&requester, f.member.id, &key("billing"), &key("invoice"), &key("void"))
            .unwrap_err();
        assert!(matches!(err, DomainError::CheckFailed(_)));
    }

    #[test]
    fn provider_failure_on_builtin_path_is_check_failed() {
        let mut access = StubAccessControl::granting(true);
        access.fail = true;
        let f = fixture(member(OrgRole::MEMBER), StubStore::granting(true), access);
        let requester = self_requester(&f.member);

        let err = f
            .resolver
            .check_permission(&requester, f.member.id, &key("billing"), &key("team"), &key("update"))
            .unwrap_err();
        assert!(matches!(err, DomainError::CheckFailed(_)));
    }

    #[test]
    fn denial_from_graph_is_a_result_not_an_error() {
        let f = fixture(
            member(OrgRole::MEMBER),
            StubStore::granting(false),
            StubAccessControl::granting(false),
        );
        let requester = self_requester(&f.member);

        let outcome = f
            .resolver
            .check_permission(&requester, f.member.id, &key("billing"), &key("invoice"), &key("create"))
            .unwrap();
        assert!(!outcome.allowed);
        assert_eq!(outcome.reason, None);
    }

    #[test]
    fn cache_config_is_per_instance() {
        // Two resolvers with separate caches never observe each other.
        let m = member(OrgRole::MEMBER);
        let mk = |store: Arc<StubStore>| {
            HierarchyResolver::new(
                store,
                Arc::new(StubDirectory {
                    member: Some(m.clone()),
                }),
                Arc::new(StubAccessControl::granting(false)),
                Some(PermissionCache::new(CacheConfig::default())),
            )
        };
        let store_a = Arc::new(StubStore::granting(true));
        let store_b = Arc::new(StubStore::granting(true));
        let (a, b) = (mk(store_a.clone()), mk(store_b.clone()));
        let requester = self_requester(&m);

        a.check_permission(&requester, m.id, &key("billing"), &key("invoice"), &key("void"))
            .unwrap();
        b.check_permission(&requester, m.id, &key("billing"), &key("invoice"), &key("void"))
            .unwrap();

        assert_eq!(store_a.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(store_b.lookups.load(Ordering::SeqCst), 1);
    }
}

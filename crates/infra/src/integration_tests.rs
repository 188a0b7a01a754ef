//! Engine-level tests: real in-memory store + directory wired into the
//! hierarchy resolver.

use std::sync::Arc;
use std::time::Duration;

use warden_auth::{Member, OrgRole, PlatformRole, PrincipalId};
use warden_core::{DomainError, Key, MemberId, OrgId};
use warden_rbac::{
    Action, Application, ApplicationRole, CacheConfig, CheckOutcome, HierarchyResolver,
    PermissionCache, RbacStore, ReasonCode, Requester, Resource,
};

use crate::{InMemoryDirectory, InMemoryRbacStore};

fn key(s: &str) -> Key {
    Key::new(s).unwrap()
}

struct Fixture {
    store: Arc<InMemoryRbacStore>,
    directory: Arc<InMemoryDirectory>,
    org: OrgId,
    member: Member,
    app: Application,
    invoice: Resource,
    void_action: Action,
    finance_lead: ApplicationRole,
}

/// Organization `org1` with application `billing`, resource `invoice`,
/// action `void`, role `finance_lead` granting `void`, and a plain member
/// assigned that role.
fn fixture() -> Fixture {
    let store = Arc::new(InMemoryRbacStore::new());
    let directory = Arc::new(InMemoryDirectory::new());

    let org = OrgId::new();
    let member = Member {
        id: MemberId::new(),
        organization_id: org,
        user_id: PrincipalId::new(),
        role: OrgRole::MEMBER,
    };
    directory.upsert_member(member.clone());

    let app = store
        .create_application(org, key("billing"), "Billing".into(), None)
        .unwrap();
    let invoice = store
        .create_resource(app.id, key("invoice"), "Invoice".into(), None)
        .unwrap();
    let void_action = store
        .create_action(invoice.id, key("void"), "Void".into(), None)
        .unwrap();
    let finance_lead = store
        .create_role(app.id, key("finance_lead"), "Finance Lead".into(), None)
        .unwrap();
    store
        .replace_role_actions(finance_lead.id, &[void_action.id])
        .unwrap();
    store.assign_role_to_member(&member, finance_lead.id).unwrap();

    Fixture {
        store,
        directory,
        org,
        member,
        app,
        invoice,
        void_action,
        finance_lead,
    }
}

fn resolver(f: &Fixture, cache: Option<PermissionCache>) -> HierarchyResolver {
    HierarchyResolver::new(f.store.clone(), f.directory.clone(), f.directory.clone(), cache)
}

fn self_requester(f: &Fixture) -> Requester {
    Requester {
        principal_id: f.member.user_id,
        platform_role: PlatformRole::User,
    }
}

fn check(r: &HierarchyResolver, req: &Requester, f: &Fixture, resource: &str, action: &str) -> CheckOutcome {
    r.check_permission(req, f.member.id, &key("billing"), &key(resource), &key(action))
        .unwrap()
}

#[test]
fn role_grant_allows_and_absent_grant_denies() {
    let f = fixture();
    let r = resolver(&f, Some(PermissionCache::default()));
    let req = self_requester(&f);

    let voided = check(&r, &req, &f, "invoice", "void");
    assert!(voided.allowed);
    assert_eq!(voided.reason, Some(ReasonCode::RoleGrant));

    let created = check(&r, &req, &f, "invoice", "create");
    assert!(!created.allowed);
    assert_eq!(created.reason, None);
}

#[test]
fn promoting_member_to_admin_grants_without_role_changes() {
    let f = fixture();
    let r = resolver(&f, Some(PermissionCache::default()));
    let req = self_requester(&f);

    assert!(!check(&r, &req, &f, "invoice", "create").allowed);

    let mut promoted = f.member.clone();
    promoted.role = OrgRole::ADMIN;
    f.directory.upsert_member(promoted);

    let outcome = check(&r, &req, &f, "invoice", "create");
    assert!(outcome.allowed);
    assert_eq!(outcome.reason, Some(ReasonCode::OrganizationRoleInherit));
}

#[test]
fn platform_admin_is_allowed_regardless_of_graph_state() {
    let f = fixture();
    let r = resolver(&f, Some(PermissionCache::default()));
    let req = Requester {
        principal_id: PrincipalId::new(),
        platform_role: PlatformRole::Admin,
    };

    for (resource, action) in [("invoice", "void"), ("invoice", "create"), ("nonexistent", "nope")] {
        let outcome = check(&r, &req, &f, resource, action);
        assert!(outcome.allowed);
        assert_eq!(outcome.reason, Some(ReasonCode::PlatformAdmin));
    }
}

#[test]
fn cached_and_uncached_resolvers_agree() {
    let f = fixture();
    let cached = resolver(&f, Some(PermissionCache::default()));
    let uncached = resolver(&f, None);
    let req = self_requester(&f);

    for (resource, action) in [
        ("invoice", "void"),
        ("invoice", "create"),
        ("unknown_resource", "void"),
        ("invoice", "unknown_action"),
    ] {
        // Two passes each so the cached resolver serves its second from cache.
        let c1 = check(&cached, &req, &f, resource, action);
        let c2 = check(&cached, &req, &f, resource, action);
        let u = check(&uncached, &req, &f, resource, action);
        assert_eq!(c1.allowed, u.allowed, "{resource}/{action}");
        assert_eq!(c2.allowed, u.allowed, "{resource}/{action}");
    }
}

#[test]
fn cache_entry_expires_and_graph_is_requeried() {
    let f = fixture();
    let r = resolver(
        &f,
        Some(PermissionCache::new(CacheConfig {
            ttl: Duration::from_millis(40),
            capacity: 16,
        })),
    );
    let req = self_requester(&f);

    assert!(check(&r, &req, &f, "invoice", "void").allowed);

    // Revoke the grant underneath the cache.
    f.store
        .unassign_role_from_member(f.member.id, f.finance_lead.id)
        .unwrap();

    // Within the TTL the stale cached grant is still served.
    let stale = check(&r, &req, &f, "invoice", "void");
    assert!(stale.allowed);
    assert!(stale.cached);

    std::thread::sleep(Duration::from_millis(60));

    let fresh = check(&r, &req, &f, "invoice", "void");
    assert!(!fresh.allowed);
    assert!(!fresh.cached);
}

#[test]
fn replace_with_foreign_action_is_rejected_and_set_unchanged() {
    let f = fixture();

    // A second application in the same organization, with its own action.
    let other_app = f
        .store
        .create_application(f.org, key("reporting"), "Reporting".into(), None)
        .unwrap();
    let other_res = f
        .store
        .create_resource(other_app.id, key("report"), "Report".into(), None)
        .unwrap();
    let other_action = f
        .store
        .create_action(other_res.id, key("export"), "Export".into(), None)
        .unwrap();

    let err = f
        .store
        .replace_role_actions(f.finance_lead.id, &[other_action.id])
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidReference(_)));

    let actions = f.store.role_actions(f.finance_lead.id).unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].id, f.void_action.id);
}

#[test]
fn deleting_application_cascades_and_checks_deny_cleanly() {
    let f = fixture();
    let r = resolver(&f, None);
    let req = self_requester(&f);

    assert!(check(&r, &req, &f, "invoice", "void").allowed);

    f.store.delete_application(f.app.id).unwrap();

    assert!(f.store.resource(f.invoice.id).unwrap().is_none());
    assert!(f.store.action(f.void_action.id).unwrap().is_none());
    assert!(f.store.role(f.finance_lead.id).unwrap().is_none());
    assert!(f.store.list_effective_actions(f.member.id, None).unwrap().is_empty());

    // A denial, not an error.
    let outcome = check(&r, &req, &f, "invoice", "void");
    assert!(!outcome.allowed);
}

#[test]
fn deleting_resource_cascades_to_actions_and_assignments() {
    let f = fixture();

    f.store.delete_resource(f.invoice.id).unwrap();

    assert!(f.store.action(f.void_action.id).unwrap().is_none());
    assert!(f.store.role_actions(f.finance_lead.id).unwrap().is_empty());
    // The role itself survives.
    assert!(f.store.role(f.finance_lead.id).unwrap().is_some());
}

#[test]
fn role_assignment_is_idempotent() {
    let f = fixture();

    f.store.assign_role_to_member(&f.member, f.finance_lead.id).unwrap();
    f.store.assign_role_to_member(&f.member, f.finance_lead.id).unwrap();

    let actions = f.store.list_effective_actions(f.member.id, None).unwrap();
    assert_eq!(actions.len(), 1);

    // Exactly one assignment row: a single unassign clears it.
    f.store
        .unassign_role_from_member(f.member.id, f.finance_lead.id)
        .unwrap();
    assert!(f.store.list_effective_actions(f.member.id, None).unwrap().is_empty());
}

#[test]
fn sibling_key_conflicts_are_scoped_to_the_parent() {
    let f = fixture();

    let err = f
        .store
        .create_application(f.org, key("billing"), "Billing 2".into(), None)
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    // Same key in a different organization is fine.
    let other_org = OrgId::new();
    assert!(f
        .store
        .create_application(other_org, key("billing"), "Billing".into(), None)
        .is_ok());

    let err = f
        .store
        .create_resource(f.app.id, key("invoice"), "Invoice 2".into(), None)
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[test]
fn assigning_role_from_another_organization_is_not_found() {
    let f = fixture();

    let outsider = Member {
        id: MemberId::new(),
        organization_id: OrgId::new(),
        user_id: PrincipalId::new(),
        role: OrgRole::MEMBER,
    };
    f.directory.upsert_member(outsider.clone());

    let err = f
        .store
        .assign_role_to_member(&outsider, f.finance_lead.id)
        .unwrap_err();
    assert_eq!(err, DomainError::NotFound);
}

#[test]
fn effective_actions_can_be_filtered_by_application() {
    let f = fixture();

    let other_app = f
        .store
        .create_application(f.org, key("reporting"), "Reporting".into(), None)
        .unwrap();
    let other_res = f
        .store
        .create_resource(other_app.id, key("report"), "Report".into(), None)
        .unwrap();
    let other_action = f
        .store
        .create_action(other_res.id, key("export"), "Export".into(), None)
        .unwrap();
    let other_role = f
        .store
        .create_role(other_app.id, key("analyst"), "Analyst".into(), None)
        .unwrap();
    f.store.replace_role_actions(other_role.id, &[other_action.id]).unwrap();
    f.store.assign_role_to_member(&f.member, other_role.id).unwrap();

    let all = f.store.list_effective_actions(f.member.id, None).unwrap();
    assert_eq!(all.len(), 2);

    let billing_only = f
        .store
        .list_effective_actions(f.member.id, Some(&key("billing")))
        .unwrap();
    assert_eq!(billing_only.len(), 1);
    assert_eq!(billing_only[0].action_key, key("void"));
}

#[test]
fn builtin_grants_flow_through_the_provider_delegation() {
    let f = fixture();
    let r = resolver(&f, Some(PermissionCache::default()));
    let req = self_requester(&f);

    // No statement yet: denied, not an error.
    let denied = check(&r, &req, &f, "member", "invite");
    assert!(!denied.allowed);

    f.directory.grant_builtin(f.member.id, key("member"), key("invite"));

    let granted = check(&r, &req, &f, "member", "invite");
    assert!(granted.allowed);
    assert_eq!(granted.reason, Some(ReasonCode::OrganizationPermission));
    assert!(!granted.cached);
}

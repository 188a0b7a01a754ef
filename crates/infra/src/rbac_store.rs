//! In-memory graph accessor.
//!
//! Single `RwLock` over the whole graph, so every mutation (including the
//! delete-all-then-insert of `replace_role_actions`) is one atomic section,
//! matching the transactional semantics a relational backend would give.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use warden_auth::Member;
use warden_core::{
    ActionId, ApplicationId, DomainError, DomainResult, Key, MemberId, OrgId, ResourceId, RoleId,
};
use warden_rbac::{
    Action, ActionRef, Application, ApplicationPatch, ApplicationRole, MemberRoleAssignment,
    RbacStore, Resource, RolePatch,
};

#[derive(Debug, Default)]
struct Graph {
    applications: HashMap<ApplicationId, Application>,
    resources: HashMap<ResourceId, Resource>,
    actions: HashMap<ActionId, Action>,
    roles: HashMap<RoleId, ApplicationRole>,
    role_actions: HashSet<(RoleId, ActionId)>,
    member_roles: HashMap<(MemberId, RoleId), MemberRoleAssignment>,
}

impl Graph {
    fn application_key_taken(&self, organization_id: OrgId, key: &Key) -> bool {
        self.applications
            .values()
            .any(|a| a.organization_id == organization_id && a.key == *key)
    }

    fn resource_key_taken(&self, application_id: ApplicationId, key: &Key) -> bool {
        self.resources
            .values()
            .any(|r| r.application_id == application_id && r.key == *key)
    }

    fn action_key_taken(&self, resource_id: ResourceId, key: &Key) -> bool {
        self.actions
            .values()
            .any(|a| a.resource_id == resource_id && a.key == *key)
    }

    fn role_key_taken(&self, application_id: ApplicationId, key: &Key) -> bool {
        self.roles
            .values()
            .any(|r| r.application_id == application_id && r.key == *key)
    }

    /// All fully-joined action references reachable by a member, oldest
    /// assignment order not guaranteed.
    fn effective_actions(&self, member_id: MemberId, application_key: Option<&Key>) -> Vec<ActionRef> {
        let mut seen: HashSet<ActionId> = HashSet::new();
        let mut out = Vec::new();

        for assignment in self.member_roles.values() {
            if assignment.member_id != member_id {
                continue;
            }
            let Some(application) = self.applications.get(&assignment.application_id) else {
                continue;
            };
            if let Some(filter) = application_key {
                if application.key != *filter {
                    continue;
                }
            }
            for (role_id, action_id) in &self.role_actions {
                if *role_id != assignment.role_id || !seen.insert(*action_id) {
                    continue;
                }
                let Some(action) = self.actions.get(action_id) else {
                    continue;
                };
                let Some(resource) = self.resources.get(&action.resource_id) else {
                    continue;
                };
                out.push(ActionRef {
                    action_id: action.id,
                    application_key: application.key.clone(),
                    resource_key: resource.key.clone(),
                    action_key: action.key.clone(),
                    name: action.name.clone(),
                });
            }
        }

        out
    }
}

/// In-memory [`RbacStore`] for dev/tests.
#[derive(Debug, Default)]
pub struct InMemoryRbacStore {
    inner: RwLock<Graph>,
}

impl InMemoryRbacStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, Graph>> {
        self.inner
            .read()
            .map_err(|_| DomainError::check_failed("rbac store lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, Graph>> {
        self.inner
            .write()
            .map_err(|_| DomainError::check_failed("rbac store lock poisoned"))
    }
}

impl RbacStore for InMemoryRbacStore {
    fn create_application(
        &self,
        organization_id: OrgId,
        key: Key,
        name: String,
        description: Option<String>,
    ) -> DomainResult<Application> {
        let mut graph = self.write()?;
        if graph.application_key_taken(organization_id, &key) {
            return Err(DomainError::conflict(format!(
                "application key '{key}' already exists in this organization"
            )));
        }

        let application = Application {
            id: ApplicationId::new(),
            organization_id,
            key,
            name,
            description,
            logo: None,
            active: true,
        };
        graph.applications.insert(application.id, application.clone());
        Ok(application)
    }

    fn application(&self, id: ApplicationId) -> DomainResult<Option<Application>> {
        Ok(self.read()?.applications.get(&id).cloned())
    }

    fn list_applications(&self, organization_id: OrgId) -> DomainResult<Vec<Application>> {
        let graph = self.read()?;
        let mut out: Vec<_> = graph
            .applications
            .values()
            .filter(|a| a.organization_id == organization_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        Ok(out)
    }

    fn update_application(&self, id: ApplicationId, patch: ApplicationPatch) -> DomainResult<Application> {
        let mut graph = self.write()?;
        let application = graph.applications.get_mut(&id).ok_or(DomainError::NotFound)?;

        if let Some(name) = patch.name {
            application.name = name;
        }
        if let Some(description) = patch.description {
            application.description = Some(description);
        }
        if let Some(logo) = patch.logo {
            application.logo = Some(logo);
        }
        if let Some(active) = patch.active {
            application.active = active;
        }
        Ok(application.clone())
    }

    fn delete_application(&self, id: ApplicationId) -> DomainResult<()> {
        let mut graph = self.write()?;
        graph.applications.remove(&id).ok_or(DomainError::NotFound)?;

        let dead_resources: HashSet<ResourceId> = graph
            .resources
            .values()
            .filter(|r| r.application_id == id)
            .map(|r| r.id)
            .collect();
        let dead_roles: HashSet<RoleId> = graph
            .roles
            .values()
            .filter(|r| r.application_id == id)
            .map(|r| r.id)
            .collect();

        graph.resources.retain(|_, r| r.application_id != id);
        graph.actions.retain(|_, a| !dead_resources.contains(&a.resource_id));
        graph.roles.retain(|_, r| r.application_id != id);
        graph.role_actions.retain(|(role_id, _)| !dead_roles.contains(role_id));
        graph
            .member_roles
            .retain(|_, assignment| assignment.application_id != id);
        Ok(())
    }

    fn create_resource(
        &self,
        application_id: ApplicationId,
        key: Key,
        name: String,
        description: Option<String>,
    ) -> DomainResult<Resource> {
        let mut graph = self.write()?;
        if !graph.applications.contains_key(&application_id) {
            return Err(DomainError::NotFound);
        }
        if graph.resource_key_taken(application_id, &key) {
            return Err(DomainError::conflict(format!(
                "resource key '{key}' already exists in this application"
            )));
        }

        let resource = Resource {
            id: ResourceId::new(),
            application_id,
            key,
            name,
            description,
        };
        graph.resources.insert(resource.id, resource.clone());
        Ok(resource)
    }

    fn resource(&self, id: ResourceId) -> DomainResult<Option<Resource>> {
        Ok(self.read()?.resources.get(&id).cloned())
    }

    fn list_resources(&self, application_id: ApplicationId) -> DomainResult<Vec<Resource>> {
        let graph = self.read()?;
        let mut out: Vec<_> = graph
            .resources
            .values()
            .filter(|r| r.application_id == application_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        Ok(out)
    }

    fn delete_resource(&self, id: ResourceId) -> DomainResult<()> {
        let mut graph = self.write()?;
        graph.resources.remove(&id).ok_or(DomainError::NotFound)?;

        let dead_actions: HashSet<ActionId> = graph
            .actions
            .values()
            .filter(|a| a.resource_id == id)
            .map(|a| a.id)
            .collect();

        graph.actions.retain(|_, a| a.resource_id != id);
        graph
            .role_actions
            .retain(|(_, action_id)| !dead_actions.contains(action_id));
        Ok(())
    }

    fn create_action(
        &self,
        resource_id: ResourceId,
        key: Key,
        name: String,
        description: Option<String>,
    ) -> DomainResult<Action> {
        let mut graph = self.write()?;
        if !graph.resources.contains_key(&resource_id) {
            return Err(DomainError::NotFound);
        }
        if graph.action_key_taken(resource_id, &key) {
            return Err(DomainError::conflict(format!(
                "action key '{key}' already exists on this resource"
            )));
        }

        let action = Action {
            id: ActionId::new(),
            resource_id,
            key,
            name,
            description,
        };
        graph.actions.insert(action.id, action.clone());
        Ok(action)
    }

    fn action(&self, id: ActionId) -> DomainResult<Option<Action>> {
        Ok(self.read()?.actions.get(&id).cloned())
    }

    fn list_actions(&self, resource_id: ResourceId) -> DomainResult<Vec<Action>> {
        let graph = self.read()?;
        let mut out: Vec<_> = graph
            .actions
            .values()
            .filter(|a| a.resource_id == resource_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        Ok(out)
    }

    fn delete_action(&self, id: ActionId) -> DomainResult<()> {
        let mut graph = self.write()?;
        graph.actions.remove(&id).ok_or(DomainError::NotFound)?;
        graph.role_actions.retain(|(_, action_id)| *action_id != id);
        Ok(())
    }

    fn create_role(
        &self,
        application_id: ApplicationId,
        key: Key,
        name: String,
        description: Option<String>,
    ) -> DomainResult<ApplicationRole> {
        let mut graph = self.write()?;
        if !graph.applications.contains_key(&application_id) {
            return Err(DomainError::NotFound);
        }
        if graph.role_key_taken(application_id, &key) {
            return Err(DomainError::conflict(format!(
                "role key '{key}' already exists in this application"
            )));
        }

        let role = ApplicationRole {
            id: RoleId::new(),
            application_id,
            key,
            name,
            description,
            active: true,
        };
        graph.roles.insert(role.id, role.clone());
        Ok(role)
    }

    fn role(&self, id: RoleId) -> DomainResult<Option<ApplicationRole>> {
        Ok(self.read()?.roles.get(&id).cloned())
    }

    fn list_roles(&self, application_id: ApplicationId) -> DomainResult<Vec<ApplicationRole>> {
        let graph = self.read()?;
        let mut out: Vec<_> = graph
            .roles
            .values()
            .filter(|r| r.application_id == application_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        Ok(out)
    }

    fn update_role(&self, id: RoleId, patch: RolePatch) -> DomainResult<ApplicationRole> {
        let mut graph = self.write()?;
        let role = graph.roles.get_mut(&id).ok_or(DomainError::NotFound)?;

        if let Some(name) = patch.name {
            role.name = name;
        }
        if let Some(description) = patch.description {
            role.description = Some(description);
        }
        if let Some(active) = patch.active {
            role.active = active;
        }
        Ok(role.clone())
    }

    fn delete_role(&self, id: RoleId) -> DomainResult<()> {
        let mut graph = self.write()?;
        graph.roles.remove(&id).ok_or(DomainError::NotFound)?;
        graph.role_actions.retain(|(role_id, _)| *role_id != id);
        graph.member_roles.retain(|_, a| a.role_id != id);
        Ok(())
    }

    fn replace_role_actions(&self, role_id: RoleId, action_ids: &[ActionId]) -> DomainResult<Vec<Action>> {
        let mut graph = self.write()?;
        let role = graph.roles.get(&role_id).cloned().ok_or(DomainError::NotFound)?;

        // Validate the whole set before touching anything: rejecting one
        // foreign action must leave the role's set unchanged.
        let mut replacement: Vec<Action> = Vec::with_capacity(action_ids.len());
        let mut seen: HashSet<ActionId> = HashSet::new();
        for action_id in action_ids {
            if !seen.insert(*action_id) {
                continue;
            }
            let action = graph
                .actions
                .get(action_id)
                .ok_or_else(|| DomainError::invalid_reference(format!("unknown action {action_id}")))?;
            let resource = graph
                .resources
                .get(&action.resource_id)
                .ok_or_else(|| DomainError::invalid_reference(format!("orphaned action {action_id}")))?;
            if resource.application_id != role.application_id {
                return Err(DomainError::invalid_reference(format!(
                    "action '{}' belongs to a different application than role '{}'",
                    action.key, role.key
                )));
            }
            replacement.push(action.clone());
        }

        graph.role_actions.retain(|(r, _)| *r != role_id);
        for action in &replacement {
            graph.role_actions.insert((role_id, action.id));
        }

        Ok(replacement)
    }

    fn role_actions(&self, role_id: RoleId) -> DomainResult<Vec<Action>> {
        let graph = self.read()?;
        if !graph.roles.contains_key(&role_id) {
            return Err(DomainError::NotFound);
        }
        let mut out: Vec<_> = graph
            .role_actions
            .iter()
            .filter(|(r, _)| *r == role_id)
            .filter_map(|(_, action_id)| graph.actions.get(action_id).cloned())
            .collect();
        out.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        Ok(out)
    }

    fn assign_role_to_member(&self, member: &Member, role_id: RoleId) -> DomainResult<()> {
        let mut graph = self.write()?;
        let role = graph.roles.get(&role_id).ok_or(DomainError::NotFound)?;
        let application = graph
            .applications
            .get(&role.application_id)
            .ok_or(DomainError::NotFound)?;
        if application.organization_id != member.organization_id {
            return Err(DomainError::NotFound);
        }

        let assignment = MemberRoleAssignment {
            member_id: member.id,
            role_id,
            organization_id: application.organization_id,
            application_id: application.id,
        };
        // Idempotent: re-assigning an already-assigned role is a no-op.
        graph.member_roles.entry((member.id, role_id)).or_insert(assignment);
        Ok(())
    }

    fn unassign_role_from_member(&self, member_id: MemberId, role_id: RoleId) -> DomainResult<()> {
        let mut graph = self.write()?;
        graph.member_roles.remove(&(member_id, role_id));
        Ok(())
    }

    fn list_effective_actions(
        &self,
        member_id: MemberId,
        application_key: Option<&Key>,
    ) -> DomainResult<Vec<ActionRef>> {
        let graph = self.read()?;
        let mut out = graph.effective_actions(member_id, application_key);
        out.sort_by(|a, b| {
            (a.application_key.as_str(), a.resource_key.as_str(), a.action_key.as_str()).cmp(&(
                b.application_key.as_str(),
                b.resource_key.as_str(),
                b.action_key.as_str(),
            ))
        });
        Ok(out)
    }

    fn member_has_action(
        &self,
        member_id: MemberId,
        application_key: &Key,
        resource_key: &Key,
        action_key: &Key,
    ) -> DomainResult<bool> {
        let graph = self.read()?;
        let hit = graph
            .effective_actions(member_id, Some(application_key))
            .into_iter()
            .any(|a| a.resource_key == *resource_key && a.action_key == *action_key);
        Ok(hit)
    }
}

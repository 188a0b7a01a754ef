use axum::Router;

use warden_core::{DomainError, DomainResult};
use warden_rbac::{Application, ApplicationRole};

use crate::app::AppServices;

pub mod actions;
pub mod applications;
pub mod check;
pub mod members;
pub mod resources;
pub mod roles;

pub fn router() -> Router {
    Router::new()
        .merge(check::router())
        .merge(applications::router())
        .merge(resources::router())
        .merge(actions::router())
        .merge(roles::router())
        .merge(members::router())
}

// Scope lookups shared by the CRUD handlers: every nested entity is
// authorized against the organization that owns its application.

pub(crate) fn application_or_404(
    services: &AppServices,
    id: warden_core::ApplicationId,
) -> DomainResult<Application> {
    services.store.application(id)?.ok_or(DomainError::NotFound)
}

pub(crate) fn resource_application(
    services: &AppServices,
    id: warden_core::ResourceId,
) -> DomainResult<Application> {
    let resource = services.store.resource(id)?.ok_or(DomainError::NotFound)?;
    application_or_404(services, resource.application_id)
}

pub(crate) fn action_application(
    services: &AppServices,
    id: warden_core::ActionId,
) -> DomainResult<Application> {
    let action = services.store.action(id)?.ok_or(DomainError::NotFound)?;
    resource_application(services, action.resource_id)
}

pub(crate) fn role_with_application(
    services: &AppServices,
    id: warden_core::RoleId,
) -> DomainResult<(ApplicationRole, Application)> {
    let role = services.store.role(id)?.ok_or(DomainError::NotFound)?;
    let application = application_or_404(services, role.application_id)?;
    Ok((role, application))
}

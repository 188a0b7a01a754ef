use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use warden_core::{ApplicationId, DomainResult, Key, RoleId};
use warden_rbac::{Action, ApplicationRole, RolePatch};

use crate::app::AppServices;
use crate::app::dto::{CreateEntityRequest, ReplaceRoleActionsRequest};
use crate::app::errors;
use crate::authz;
use crate::context::RequesterContext;

pub fn router() -> Router {
    Router::new()
        .route("/applications/:id/roles", get(list_roles).post(create_role))
        .route("/roles/:id", get(get_role).patch(update_role).delete(delete_role))
        .route(
            "/roles/:id/actions",
            get(get_role_actions).put(replace_role_actions),
        )
}

pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(application_id): Path<ApplicationId>,
    Json(body): Json<CreateEntityRequest>,
) -> axum::response::Response {
    let result: DomainResult<ApplicationRole> = (|| {
        let app = super::application_or_404(&services, application_id)?;
        authz::require_org_write(&services, &requester, app.organization_id)?;
        let key = Key::new(body.key)?;
        services
            .store
            .create_role(application_id, key, body.name, body.description)
    })();

    match result {
        Ok(role) => (StatusCode::CREATED, Json(role)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(application_id): Path<ApplicationId>,
) -> axum::response::Response {
    let result: DomainResult<Vec<ApplicationRole>> = (|| {
        let app = super::application_or_404(&services, application_id)?;
        authz::require_org_read(&services, &requester, app.organization_id)?;
        services.store.list_roles(application_id)
    })();

    match result {
        Ok(roles) => Json(roles).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(id): Path<RoleId>,
) -> axum::response::Response {
    let result: DomainResult<ApplicationRole> = (|| {
        let (role, app) = super::role_with_application(&services, id)?;
        authz::require_org_read(&services, &requester, app.organization_id)?;
        Ok(role)
    })();

    match result {
        Ok(role) => Json(role).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(id): Path<RoleId>,
    Json(patch): Json<RolePatch>,
) -> axum::response::Response {
    let result: DomainResult<ApplicationRole> = (|| {
        let (_, app) = super::role_with_application(&services, id)?;
        authz::require_org_write(&services, &requester, app.organization_id)?;
        services.store.update_role(id, patch)
    })();

    match result {
        Ok(role) => Json(role).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(id): Path<RoleId>,
) -> axum::response::Response {
    let result: DomainResult<()> = (|| {
        let (_, app) = super::role_with_application(&services, id)?;
        authz::require_org_write(&services, &requester, app.organization_id)?;
        services.store.delete_role(id)
    })();

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Replace the role's action set wholesale. The new set is validated before
/// any mutation, so a rejected request leaves the previous set intact.
pub async fn replace_role_actions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(id): Path<RoleId>,
    Json(body): Json<ReplaceRoleActionsRequest>,
) -> axum::response::Response {
    let result: DomainResult<Vec<Action>> = (|| {
        let (_, app) = super::role_with_application(&services, id)?;
        authz::require_org_write(&services, &requester, app.organization_id)?;
        services.store.replace_role_actions(id, &body.action_ids)
    })();

    match result {
        Ok(actions) => Json(actions).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_role_actions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(id): Path<RoleId>,
) -> axum::response::Response {
    let result: DomainResult<Vec<Action>> = (|| {
        let (_, app) = super::role_with_application(&services, id)?;
        authz::require_org_read(&services, &requester, app.organization_id)?;
        services.store.role_actions(id)
    })();

    match result {
        Ok(actions) => Json(actions).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

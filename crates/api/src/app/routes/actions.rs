use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};

use warden_core::{ActionId, DomainResult, Key, ResourceId};
use warden_rbac::Action;

use crate::app::AppServices;
use crate::app::dto::CreateEntityRequest;
use crate::app::errors;
use crate::authz;
use crate::context::RequesterContext;

pub fn router() -> Router {
    Router::new()
        .route(
            "/resources/:id/actions",
            get(list_actions).post(create_action),
        )
        .route("/actions/:id", delete(delete_action))
}

pub async fn create_action(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(resource_id): Path<ResourceId>,
    Json(body): Json<CreateEntityRequest>,
) -> axum::response::Response {
    let result: DomainResult<Action> = (|| {
        let app = super::resource_application(&services, resource_id)?;
        authz::require_org_write(&services, &requester, app.organization_id)?;
        let key = Key::new(body.key)?;
        services
            .store
            .create_action(resource_id, key, body.name, body.description)
    })();

    match result {
        Ok(action) => (StatusCode::CREATED, Json(action)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_actions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(resource_id): Path<ResourceId>,
) -> axum::response::Response {
    let result: DomainResult<Vec<Action>> = (|| {
        let app = super::resource_application(&services, resource_id)?;
        authz::require_org_read(&services, &requester, app.organization_id)?;
        services.store.list_actions(resource_id)
    })();

    match result {
        Ok(actions) => Json(actions).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_action(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(id): Path<ActionId>,
) -> axum::response::Response {
    let result: DomainResult<()> = (|| {
        let app = super::action_application(&services, id)?;
        authz::require_org_write(&services, &requester, app.organization_id)?;
        services.store.delete_action(id)
    })();

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

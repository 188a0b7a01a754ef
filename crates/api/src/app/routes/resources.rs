use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};

use warden_core::{ApplicationId, DomainResult, Key, ResourceId};
use warden_rbac::Resource;

use crate::app::AppServices;
use crate::app::dto::CreateEntityRequest;
use crate::app::errors;
use crate::authz;
use crate::context::RequesterContext;

pub fn router() -> Router {
    Router::new()
        .route(
            "/applications/:id/resources",
            get(list_resources).post(create_resource),
        )
        .route("/resources/:id", delete(delete_resource))
}

pub async fn create_resource(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(application_id): Path<ApplicationId>,
    Json(body): Json<CreateEntityRequest>,
) -> axum::response::Response {
    let result: DomainResult<Resource> = (|| {
        let app = super::application_or_404(&services, application_id)?;
        authz::require_org_write(&services, &requester, app.organization_id)?;
        let key = Key::new(body.key)?;
        services
            .store
            .create_resource(application_id, key, body.name, body.description)
    })();

    match result {
        Ok(resource) => (StatusCode::CREATED, Json(resource)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_resources(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(application_id): Path<ApplicationId>,
) -> axum::response::Response {
    let result: DomainResult<Vec<Resource>> = (|| {
        let app = super::application_or_404(&services, application_id)?;
        authz::require_org_read(&services, &requester, app.organization_id)?;
        services.store.list_resources(application_id)
    })();

    match result {
        Ok(resources) => Json(resources).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_resource(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(id): Path<ResourceId>,
) -> axum::response::Response {
    let result: DomainResult<()> = (|| {
        let app = super::resource_application(&services, id)?;
        authz::require_org_write(&services, &requester, app.organization_id)?;
        services.store.delete_resource(id)
    })();

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

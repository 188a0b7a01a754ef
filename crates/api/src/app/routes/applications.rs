use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use warden_core::{ApplicationId, DomainResult, Key, OrgId};
use warden_rbac::{Application, ApplicationPatch};

use crate::app::AppServices;
use crate::app::dto::CreateEntityRequest;
use crate::app::errors;
use crate::authz;
use crate::context::RequesterContext;

pub fn router() -> Router {
    Router::new()
        .route(
            "/orgs/:org_id/applications",
            get(list_applications).post(create_application),
        )
        .route(
            "/applications/:id",
            get(get_application)
                .patch(update_application)
                .delete(delete_application),
        )
}

pub async fn create_application(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(org_id): Path<OrgId>,
    Json(body): Json<CreateEntityRequest>,
) -> axum::response::Response {
    let result: DomainResult<Application> = (|| {
        authz::require_org_write(&services, &requester, org_id)?;
        let key = Key::new(body.key)?;
        services
            .store
            .create_application(org_id, key, body.name, body.description)
    })();

    match result {
        Ok(app) => (StatusCode::CREATED, Json(app)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_applications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(org_id): Path<OrgId>,
) -> axum::response::Response {
    let result: DomainResult<Vec<Application>> = (|| {
        authz::require_org_read(&services, &requester, org_id)?;
        services.store.list_applications(org_id)
    })();

    match result {
        Ok(apps) => Json(apps).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_application(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(id): Path<ApplicationId>,
) -> axum::response::Response {
    let result: DomainResult<Application> = (|| {
        let app = super::application_or_404(&services, id)?;
        authz::require_org_read(&services, &requester, app.organization_id)?;
        Ok(app)
    })();

    match result {
        Ok(app) => Json(app).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_application(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(id): Path<ApplicationId>,
    Json(patch): Json<ApplicationPatch>,
) -> axum::response::Response {
    let result: DomainResult<Application> = (|| {
        let app = super::application_or_404(&services, id)?;
        authz::require_org_write(&services, &requester, app.organization_id)?;
        services.store.update_application(id, patch)
    })();

    match result {
        Ok(app) => Json(app).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_application(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(id): Path<ApplicationId>,
) -> axum::response::Response {
    let result: DomainResult<()> = (|| {
        let app = super::application_or_404(&services, id)?;
        authz::require_org_write(&services, &requester, app.organization_id)?;
        services.store.delete_application(id)
    })();

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

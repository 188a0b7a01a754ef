//! Member ↔ role assignment and effective-action listings.
//!
//! Members themselves live in the auth provider's directory; these routes
//! only manage the RBAC graph's view of them.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use warden_auth::Member;
use warden_core::{DomainError, DomainResult, Key, MemberId, RoleId};
use warden_rbac::ActionRef;

use crate::app::AppServices;
use crate::app::dto::EffectiveActionsQuery;
use crate::app::errors;
use crate::authz;
use crate::context::RequesterContext;

pub fn router() -> Router {
    Router::new()
        .route(
            "/members/:member_id/roles/:role_id",
            post(assign_role).delete(unassign_role),
        )
        .route("/members/:member_id/actions", get(list_effective_actions))
}

pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path((member_id, role_id)): Path<(MemberId, RoleId)>,
) -> axum::response::Response {
    let result: DomainResult<()> = (|| {
        let member = member_or_404(&services, member_id)?;
        authz::require_org_write(&services, &requester, member.organization_id)?;
        services.store.assign_role_to_member(&member, role_id)
    })();

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn unassign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path((member_id, role_id)): Path<(MemberId, RoleId)>,
) -> axum::response::Response {
    let result: DomainResult<()> = (|| {
        let member = member_or_404(&services, member_id)?;
        authz::require_org_write(&services, &requester, member.organization_id)?;
        services.store.unassign_role_from_member(member_id, role_id)
    })();

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_effective_actions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Path(member_id): Path<MemberId>,
    Query(query): Query<EffectiveActionsQuery>,
) -> axum::response::Response {
    let result: DomainResult<Vec<ActionRef>> = (|| {
        let member = member_or_404(&services, member_id)?;
        authz::require_org_read(&services, &requester, member.organization_id)?;
        let app_key = match query.app_key {
            Some(raw) if !raw.is_empty() => Some(Key::new(raw)?),
            _ => None,
        };
        services
            .store
            .list_effective_actions(member_id, app_key.as_ref())
    })();

    match result {
        Ok(actions) => Json(actions).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn member_or_404(services: &AppServices, member_id: MemberId) -> DomainResult<Member> {
    services
        .directory
        .member(member_id)
        .map_err(|e| DomainError::check_failed(e.to_string()))?
        .ok_or(DomainError::NotFound)
}

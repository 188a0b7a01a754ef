//! The permission question endpoint.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
};

use warden_core::{DomainError, DomainResult, Key, MemberId};

use crate::app::AppServices;
use crate::app::dto::{CheckPermissionResponse, CheckQuery};
use crate::app::errors;
use crate::context::RequesterContext;

pub fn router() -> Router {
    Router::new().route("/rbac/permissions/check", get(check_permission))
}

pub async fn check_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(requester): Extension<RequesterContext>,
    Query(query): Query<CheckQuery>,
) -> axum::response::Response {
    match run_check(&services, &requester, query) {
        Ok(body) => Json(body).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn run_check(
    services: &AppServices,
    requester: &RequesterContext,
    query: CheckQuery,
) -> DomainResult<CheckPermissionResponse> {
    let member_raw = required(query.member_id, "memberId")?;
    let member_id: MemberId = member_raw
        .parse()
        .map_err(|_| DomainError::invalid_format(format!("'{member_raw}' is not a valid member id")))?;

    let app_key = Key::new(required(query.app_key, "appKey")?)?;
    let resource_key = Key::new(required(query.resource_key, "resourceKey")?)?;
    let action_key = Key::new(required(query.action_key, "actionKey")?)?;

    let outcome = services.resolver.check_permission(
        &requester.requester(),
        member_id,
        &app_key,
        &resource_key,
        &action_key,
    )?;

    Ok(CheckPermissionResponse::from_outcome(
        outcome,
        member_id.to_string(),
        app_key.to_string(),
        resource_key.to_string(),
        action_key.to_string(),
    ))
}

fn required(value: Option<String>, name: &str) -> DomainResult<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::invalid_format(format!("query parameter '{name}' is required")))
}

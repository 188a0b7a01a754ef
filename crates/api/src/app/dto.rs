//! Wire types for the console CRUD surface and the permission-check endpoint.

use serde::{Deserialize, Serialize};

use warden_core::ActionId;
use warden_rbac::{CheckOutcome, ReasonCode};

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateEntityRequest {
    /// Raw key; validated into a `Key` at the handler boundary so malformed
    /// input surfaces as a 400, not a deserialization error.
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceRoleActionsRequest {
    pub action_ids: Vec<ActionId>,
}

/// Query parameters of `GET /api/rbac/permissions/check`.
///
/// All four are required; absence is reported as a 400 with a named field
/// rather than a generic extractor rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckQuery {
    pub member_id: Option<String>,
    pub app_key: Option<String>,
    pub resource_key: Option<String>,
    pub action_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveActionsQuery {
    pub app_key: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPermissionResponse {
    pub has_permission: bool,
    pub member_id: String,
    pub app_key: String,
    pub resource_key: String,
    pub action_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonCode>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cached: bool,
}

impl CheckPermissionResponse {
    pub fn from_outcome(
        outcome: CheckOutcome,
        member_id: String,
        app_key: String,
        resource_key: String,
        action_key: String,
    ) -> Self {
        Self {
            has_permission: outcome.allowed,
            member_id,
            app_key,
            resource_key,
            action_key,
            reason: outcome.reason,
            cached: outcome.cached,
        }
    }
}

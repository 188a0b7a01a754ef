use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use warden_auth::MemberDirectory;
use warden_infra::{InMemoryDirectory, InMemoryRbacStore};
use warden_rbac::{HierarchyResolver, PermissionCache, RbacStore};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Shared service handles for the HTTP layer.
pub struct AppServices {
    pub store: Arc<dyn RbacStore>,
    pub directory: Arc<dyn MemberDirectory>,
    pub resolver: HierarchyResolver,
}

/// In-memory wiring (dev/test): store + directory + cache-backed resolver.
///
/// The concrete handles are returned alongside the services so callers
/// (tests, seed scripts) can populate memberships and built-in grants.
pub fn build_in_memory_services() -> (Arc<AppServices>, Arc<InMemoryRbacStore>, Arc<InMemoryDirectory>) {
    let store = Arc::new(InMemoryRbacStore::new());
    let directory = Arc::new(InMemoryDirectory::new());

    let resolver = HierarchyResolver::new(
        store.clone(),
        directory.clone(),
        directory.clone(),
        Some(PermissionCache::default()),
    );

    let services = Arc::new(AppServices {
        store: store.clone(),
        directory: directory.clone(),
        resolver,
    });
    (services, store, directory)
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(jwt_secret: String, services: Arc<AppServices>) -> Router {
    let jwt = Arc::new(warden_auth::Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require auth + requester context.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api", protected)
        .layer(ServiceBuilder::new())
}

async fn health() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}

//! HTTP surface: stateless evaluator/guard checks plus the cached
//! snapshot's read and invalidation entry points.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::authz::guard::{evaluate_guard, route_verdict, Requirement, RouteTargets};
use crate::authz::snapshot::{InvalidationReason, SnapshotState, SnapshotStore};
use crate::authz::{Catalog, PermissionSet};
use crate::errors::TurnstileError;
use crate::session;
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub catalog: Arc<Catalog>,
    pub store: Arc<SnapshotStore>,
}

impl AppState {
    fn route_targets(&self) -> RouteTargets {
        RouteTargets {
            login_path: self.settings.routes.login_path.clone(),
            default_redirect: self.settings.routes.default_redirect.clone(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/check", post(handle_check))
        .route("/v1/guard", post(handle_guard))
        .route("/v1/permissions", get(current_permissions))
        .route("/v1/permissions/invalidate", post(invalidate_snapshot))
        .route("/v1/catalog", get(catalog_grouped))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(
    settings: Settings,
    catalog: Catalog,
    store: SnapshotStore,
) -> Result<(), TurnstileError> {
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let state = AppState {
        settings: Arc::new(settings),
        catalog: Arc::new(catalog),
        store: Arc::new(store),
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "turnstile listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// The subject's granted permission strings.
    pub permissions: Vec<String>,
    /// e.g. ["users:all", "users:read"]
    pub require: Vec<String>,
    /// "single", "any", or "all"
    pub mode: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub allowed: bool,
}

async fn handle_check(Json(req): Json<CheckRequest>) -> impl IntoResponse {
    let requirement = match Requirement::from_parts(&req.mode, req.require) {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };
    let granted: PermissionSet = req.permissions.into();
    Json(CheckResponse {
        allowed: requirement.satisfied_by(&granted),
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct GuardRequest {
    /// Falls back to session-cookie presence when omitted.
    #[serde(default)]
    pub authenticated: Option<bool>,
    /// The path being navigated to, preserved for post-login return.
    pub path: String,
    /// Granted permissions; falls back to the cached snapshot when omitted.
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    pub require: Vec<String>,
    pub mode: String,
}

async fn handle_guard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GuardRequest>,
) -> impl IntoResponse {
    let requirement = match Requirement::from_parts(&req.mode, req.require) {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };

    let authenticated = req
        .authenticated
        .unwrap_or_else(|| session::is_authenticated(&headers));

    let granted: PermissionSet = match req.permissions {
        Some(list) => list.into(),
        None => state
            .store
            .ensure()
            .await
            .permissions()
            .cloned()
            .unwrap_or_default(),
    };

    let guard_state = evaluate_guard(authenticated, &granted, &requirement);
    let verdict = route_verdict(guard_state, &req.path, &state.route_targets());
    tracing::debug!(path = %req.path, ?guard_state, "guard evaluated");
    Json(verdict).into_response()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PermissionsResponse {
    permissions: Vec<String>,
    role_id: Option<String>,
    fetched_at: DateTime<Utc>,
}

async fn current_permissions(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ensure().await {
        SnapshotState::Ready(snap) => Json(PermissionsResponse {
            permissions: snap.permissions.sorted(),
            role_id: snap.role_id.clone(),
            fetched_at: snap.fetched_at,
        })
        .into_response(),
        SnapshotState::Pending => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct InvalidateRequest {
    reason: InvalidationReason,
}

async fn invalidate_snapshot(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> impl IntoResponse {
    state.store.invalidate(req.reason).await;
    StatusCode::NO_CONTENT
}

async fn catalog_grouped(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.catalog.grouped()).into_response()
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

//! Foldergate HTTP server
//!
//! JSON API over the engine for demos and integration testing. The org
//! directory is in-memory and populated through the `/seed/*` endpoints;
//! production deployments wire their own `Directory`/`Folders` backends and
//! keep the engine behind their API layer instead.
//!
//! Run with: cargo run --features server --bin foldergate-server

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::caps;
use crate::directory::{
    BranchView, DepartmentView, FolderView, MemDirectory, MemFolders, UserView,
};
use crate::engine::Engine;
use crate::error::Error;
use crate::grants::{FolderGrants, GrantView, PermissionLevel, TargetKind};
use crate::role::Role;

/// Engine behind the demo server (writes are serialized by the mutex)
pub type SharedEngine = Arc<Mutex<Engine<MemDirectory, MemFolders>>>;

fn lock(state: &SharedEngine) -> MutexGuard<'_, Engine<MemDirectory, MemFolders>> {
    state.lock().unwrap_or_else(|p| p.into_inner())
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SeedUserReq {
    id: u64,
    role: Role,
    branch_id: Option<u64>,
    department_id: Option<u64>,
    #[serde(default = "default_true")]
    active: bool,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SeedBranchReq {
    id: u64,
    #[serde(default = "default_true")]
    active: bool,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SeedDepartmentReq {
    id: u64,
    branch_id: Option<u64>,
    #[serde(default = "default_true")]
    active: bool,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SeedFolderReq {
    id: u64,
    owner_user_id: u64,
    #[serde(default)]
    deleted: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct GrantReq {
    actor: u64,
    target_kind: TargetKind,
    target_id: u64,
    level: PermissionLevel,
}

#[derive(Debug, Deserialize)]
struct RevokeReq {
    actor: u64,
    target_kind: TargetKind,
    target_id: u64,
}

#[derive(Debug, Deserialize)]
struct LevelQuery {
    user: u64,
}

#[derive(Debug, Deserialize)]
struct ActorQuery {
    actor: u64,
}

#[derive(Debug, Deserialize)]
struct SetCapabilityReq {
    actor: u64,
    role: Role,
    capability: String,
    enabled: bool,
}

#[derive(Debug, Deserialize)]
struct ResetReq {
    actor: u64,
}

#[derive(Debug, Deserialize)]
struct AssignRoleReq {
    actor: u64,
    target_user: u64,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct DeleteCheckReq {
    actor: u64,
    target_user: u64,
}

#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct LevelResponse {
    level: Option<PermissionLevel>,
}

#[derive(Debug, Serialize)]
struct UsersResponse {
    users: Vec<UserView>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

// ============================================================================
// Error mapping
// ============================================================================

/// Engine error carried to an HTTP status + JSON body
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError { status: StatusCode::BAD_REQUEST, message: message.into() }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let status = match e {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::PermissionDenied(_) | Error::Escalation { .. } => StatusCode::FORBIDDEN,
            Error::InactiveTarget { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError { status, message: e.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

// ============================================================================
// Handlers
// ============================================================================

async fn seed_user(State(state): State<SharedEngine>, Json(req): Json<SeedUserReq>) -> ApiResult<OkResponse> {
    let mut engine = lock(&state);
    engine.directory_mut().add_user(
        UserView {
            id: req.id,
            role: req.role,
            branch_id: req.branch_id,
            department_id: req.department_id,
            active: req.active,
        },
        &req.name,
    );
    Ok(Json(OkResponse { ok: true }))
}

async fn seed_branch(State(state): State<SharedEngine>, Json(req): Json<SeedBranchReq>) -> ApiResult<OkResponse> {
    let mut engine = lock(&state);
    engine
        .directory_mut()
        .add_branch(BranchView { id: req.id, active: req.active }, &req.name);
    Ok(Json(OkResponse { ok: true }))
}

async fn seed_department(
    State(state): State<SharedEngine>,
    Json(req): Json<SeedDepartmentReq>,
) -> ApiResult<OkResponse> {
    let mut engine = lock(&state);
    engine.directory_mut().add_department(
        DepartmentView { id: req.id, branch_id: req.branch_id, active: req.active },
        &req.name,
    );
    Ok(Json(OkResponse { ok: true }))
}

async fn seed_folder(State(state): State<SharedEngine>, Json(req): Json<SeedFolderReq>) -> ApiResult<OkResponse> {
    let mut engine = lock(&state);
    engine.folders_mut().add_folder(FolderView {
        id: req.id,
        owner_user_id: req.owner_user_id,
        deleted: req.deleted,
    });
    Ok(Json(OkResponse { ok: true }))
}

async fn folder_level(
    State(state): State<SharedEngine>,
    Path(folder_id): Path<u64>,
    Query(q): Query<LevelQuery>,
) -> ApiResult<LevelResponse> {
    let level = lock(&state).effective_level(q.user, folder_id)?;
    Ok(Json(LevelResponse { level }))
}

async fn create_grant(
    State(state): State<SharedEngine>,
    Path(folder_id): Path<u64>,
    Json(req): Json<GrantReq>,
) -> ApiResult<GrantView> {
    let view = lock(&state).grant(req.actor, folder_id, req.target_kind, req.target_id, req.level)?;
    Ok(Json(view))
}

async fn delete_grant(
    State(state): State<SharedEngine>,
    Path(folder_id): Path<u64>,
    Json(req): Json<RevokeReq>,
) -> ApiResult<OkResponse> {
    lock(&state).revoke(req.actor, folder_id, req.target_kind, req.target_id)?;
    Ok(Json(OkResponse { ok: true }))
}

async fn folder_grants(
    State(state): State<SharedEngine>,
    Path(folder_id): Path<u64>,
    Query(q): Query<ActorQuery>,
) -> ApiResult<FolderGrants> {
    let grants = lock(&state).list_grants(q.actor, folder_id)?;
    Ok(Json(grants))
}

async fn get_matrix(State(state): State<SharedEngine>) -> ApiResult<serde_json::Value> {
    let named = lock(&state).capability_matrix().named();
    Ok(Json(serde_json::json!(named)))
}

async fn set_capability(
    State(state): State<SharedEngine>,
    Json(req): Json<SetCapabilityReq>,
) -> ApiResult<OkResponse> {
    let cap = caps::cap_by_name(&req.capability)
        .ok_or_else(|| ApiError::bad_request(format!("unknown capability '{}'", req.capability)))?;
    lock(&state).set_capability(req.actor, req.role, cap, req.enabled)?;
    Ok(Json(OkResponse { ok: true }))
}

async fn reset_matrix(State(state): State<SharedEngine>, Json(req): Json<ResetReq>) -> ApiResult<OkResponse> {
    lock(&state).reset_capabilities(req.actor)?;
    Ok(Json(OkResponse { ok: true }))
}

async fn manageable_users(
    State(state): State<SharedEngine>,
    Query(q): Query<ActorQuery>,
) -> ApiResult<UsersResponse> {
    let users = lock(&state).manageable_users(q.actor)?;
    Ok(Json(UsersResponse { users }))
}

async fn deletable_users(
    State(state): State<SharedEngine>,
    Query(q): Query<ActorQuery>,
) -> ApiResult<UsersResponse> {
    let users = lock(&state).deletable_users(q.actor)?;
    Ok(Json(UsersResponse { users }))
}

async fn assign_role(State(state): State<SharedEngine>, Json(req): Json<AssignRoleReq>) -> ApiResult<OkResponse> {
    lock(&state).authorize_role_assignment(req.actor, req.target_user, req.role)?;
    Ok(Json(OkResponse { ok: true }))
}

async fn delete_check(State(state): State<SharedEngine>, Json(req): Json<DeleteCheckReq>) -> ApiResult<OkResponse> {
    lock(&state).authorize_user_deletion(req.actor, req.target_user)?;
    Ok(Json(OkResponse { ok: true }))
}

// ============================================================================
// Router
// ============================================================================

/// Build the API router over a shared engine
pub fn router(state: SharedEngine) -> Router {
    Router::new()
        .route("/seed/users", post(seed_user))
        .route("/seed/branches", post(seed_branch))
        .route("/seed/departments", post(seed_department))
        .route("/seed/folders", post(seed_folder))
        .route("/folders/:id/level", get(folder_level))
        .route(
            "/folders/:id/grants",
            get(folder_grants).post(create_grant).delete(delete_grant),
        )
        .route("/matrix", get(get_matrix).post(set_capability))
        .route("/matrix/reset", post(reset_matrix))
        .route("/users/manageable", get(manageable_users))
        .route("/users/deletable", get(deletable_users))
        .route("/users/assign-role", post(assign_role))
        .route("/users/delete-check", post(delete_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

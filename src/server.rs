//! Menurbac HTTP server
//!
//! Thin JSON surface over [`Rbac`]. Every response is wrapped in
//! `{ success, data, error }`; failures carry `{ reason, message }` and the
//! status from [`RbacError::status`].

use std::sync::Arc;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{FromRequest, FromRequestParts, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::error::RbacError;
use crate::schema::{
    Menu, MenuFilter, MenuForm, MenuNode, Page, Pagination, Role, RoleFilter, RoleForm, RoleWithMenus, Status, User,
    UserFilter, UserForm, UserStatus, UserWithRoles,
};
use crate::service::Rbac;

// ============================================================================
// Envelope
// ============================================================================

#[derive(Debug, Serialize)]
struct ErrorBody {
    reason: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

#[derive(Debug)]
struct ApiError(RbacError);

impl From<RbacError> for ApiError {
    fn from(e: RbacError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let e = self.0;
        let status = StatusCode::from_u16(e.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %e, "request failed");
        }
        let body: ApiResponse<()> = ApiResponse {
            success: false,
            data: None,
            error: Some(ErrorBody {
                reason: e.reason(),
                message: e.public_message(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

// Malformed bodies, paths and query strings are rejected through the same envelope

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        ApiError(RbacError::InvalidInput(r.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(r: PathRejection) -> Self {
        ApiError(RbacError::InvalidInput(r.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self {
        ApiError(RbacError::InvalidInput(r.body_text()))
    }
}

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
struct JsonBody<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
struct PathParam<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
struct QueryParams<T>(T);

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    }))
}

type AppState = Arc<Rbac>;

// ============================================================================
// Query strings
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MenuQuery {
    page: usize,
    page_size: usize,
    name: Option<String>,
    status: Option<Status>,
    parent_id: Option<u64>,
    parent_path: Option<String>,
    code: Option<String>,
    code_path: Option<String>,
    include_resources: bool,
}

impl MenuQuery {
    fn filter(self) -> (MenuFilter, Pagination) {
        let filter = MenuFilter {
            name_contains: self.name,
            status: self.status,
            parent_id: self.parent_id,
            parent_path_prefix: self.parent_path,
            code: self.code,
            code_path: self.code_path,
            include_resources: self.include_resources,
            ..Default::default()
        };
        (filter, Pagination::new(self.page, self.page_size))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RoleQuery {
    page: usize,
    page_size: usize,
    name: Option<String>,
    code: Option<String>,
    status: Option<Status>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserQuery {
    page: usize,
    page_size: usize,
    username: Option<String>,
    name: Option<String>,
    status: Option<UserStatus>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// Menus

async fn query_menus(State(rbac): State<AppState>, QueryParams(q): QueryParams<MenuQuery>) -> ApiResult<Page<Menu>> {
    let (filter, pagination) = q.filter();
    ok(rbac.query_menus(&filter, pagination)?)
}

async fn menu_tree(State(rbac): State<AppState>, QueryParams(q): QueryParams<MenuQuery>) -> ApiResult<Vec<MenuNode>> {
    ok(rbac.menu_tree(&q.filter().0)?)
}

async fn get_menu(State(rbac): State<AppState>, PathParam(id): PathParam<u64>) -> ApiResult<Menu> {
    ok(rbac.get_menu(id)?)
}

async fn create_menu(State(rbac): State<AppState>, JsonBody(form): JsonBody<MenuForm>) -> ApiResult<Menu> {
    ok(rbac.create_menu(&form)?)
}

async fn update_menu(
    State(rbac): State<AppState>,
    PathParam(id): PathParam<u64>,
    JsonBody(form): JsonBody<MenuForm>,
) -> ApiResult<Menu> {
    ok(rbac.update_menu(id, &form)?)
}

async fn delete_menu(State(rbac): State<AppState>, PathParam(id): PathParam<u64>) -> ApiResult<()> {
    ok(rbac.delete_menu(id)?)
}

// Roles

async fn query_roles(State(rbac): State<AppState>, QueryParams(q): QueryParams<RoleQuery>) -> ApiResult<Page<Role>> {
    let filter = RoleFilter {
        name_contains: q.name,
        code: q.code,
        status: q.status,
    };
    ok(rbac.query_roles(&filter, Pagination::new(q.page, q.page_size))?)
}

async fn get_role(State(rbac): State<AppState>, PathParam(id): PathParam<u64>) -> ApiResult<RoleWithMenus> {
    ok(rbac.get_role(id)?)
}

async fn create_role(State(rbac): State<AppState>, JsonBody(form): JsonBody<RoleForm>) -> ApiResult<RoleWithMenus> {
    ok(rbac.create_role(&form)?)
}

async fn update_role(
    State(rbac): State<AppState>,
    PathParam(id): PathParam<u64>,
    JsonBody(form): JsonBody<RoleForm>,
) -> ApiResult<RoleWithMenus> {
    ok(rbac.update_role(id, &form)?)
}

async fn delete_role(State(rbac): State<AppState>, PathParam(id): PathParam<u64>) -> ApiResult<()> {
    ok(rbac.delete_role(id)?)
}

async fn role_menus(
    State(rbac): State<AppState>,
    PathParam(id): PathParam<u64>,
    QueryParams(q): QueryParams<MenuQuery>,
) -> ApiResult<Vec<Menu>> {
    ok(rbac.menus_for_role(id, &q.filter().0)?)
}

// Users

async fn query_users(State(rbac): State<AppState>, QueryParams(q): QueryParams<UserQuery>) -> ApiResult<Page<User>> {
    let filter = UserFilter {
        username_contains: q.username,
        name_contains: q.name,
        status: q.status,
    };
    ok(rbac.query_users(&filter, Pagination::new(q.page, q.page_size))?)
}

async fn get_user(State(rbac): State<AppState>, PathParam(id): PathParam<u64>) -> ApiResult<UserWithRoles> {
    ok(rbac.get_user(id)?)
}

async fn create_user(State(rbac): State<AppState>, JsonBody(form): JsonBody<UserForm>) -> ApiResult<UserWithRoles> {
    ok(rbac.create_user(&form)?)
}

async fn update_user(
    State(rbac): State<AppState>,
    PathParam(id): PathParam<u64>,
    JsonBody(form): JsonBody<UserForm>,
) -> ApiResult<UserWithRoles> {
    ok(rbac.update_user(id, &form)?)
}

async fn delete_user(State(rbac): State<AppState>, PathParam(id): PathParam<u64>) -> ApiResult<()> {
    ok(rbac.delete_user(id)?)
}

async fn user_menus(
    State(rbac): State<AppState>,
    PathParam(id): PathParam<u64>,
    QueryParams(q): QueryParams<MenuQuery>,
) -> ApiResult<Vec<MenuNode>> {
    ok(rbac.menus_for_user(id, &q.filter().0)?)
}

// ============================================================================
// Router
// ============================================================================

pub fn router(rbac: Arc<Rbac>) -> Router {
    Router::new()
        .route("/health", get(health))
        // Menus
        .route("/menus", get(query_menus).post(create_menu))
        .route("/menus/tree", get(menu_tree))
        .route("/menus/:id", get(get_menu).put(update_menu).delete(delete_menu))
        // Roles
        .route("/roles", get(query_roles).post(create_role))
        .route("/roles/:id", get(get_role).put(update_role).delete(delete_role))
        .route("/roles/:id/menus", get(role_menus))
        // Users
        .route("/users", get(query_users).post(create_user))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/users/:id/menus", get(user_menus))
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(rbac)
}

/// Open storage from `config` and serve until the listener fails
pub async fn serve(config: &Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let rbac = Arc::new(Rbac::open(config)?);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, version = env!("CARGO_PKG_VERSION"), "menurbac-server listening");
    axum::serve(listener, router(rbac)).await?;
    Ok(())
}

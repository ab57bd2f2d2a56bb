use axum::{
    extract::{DefaultBodyLimit, State},
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::database::{KeySchemaResolver, TableRepository};
use crate::handlers::{protected, public};
use crate::middleware::{
    auth_gate, require_roles_permission, require_table_permission, require_users_permission,
};
use crate::services::{AuthService, PermissionAggregator, RoleService, UserService};
use crate::store::StoreHandle;

/// Shared per-process state handed to every handler and gate
#[derive(Clone)]
pub struct AppState {
    pub store: StoreHandle,
    pub resolver: KeySchemaResolver,
    pub permissions: PermissionAggregator,
    pub roles: RoleService,
    pub users: UserService,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(store: StoreHandle, config: &AppConfig) -> Self {
        Self {
            resolver: KeySchemaResolver::new(store.clone(), config.store.cache_key_schemas),
            permissions: PermissionAggregator::new(store.clone()),
            roles: RoleService::new(store.clone()),
            users: UserService::new(store.clone(), config.security.bcrypt_cost),
            auth: AuthService::new(
                store.clone(),
                config.security.jwt_secret.clone(),
                config.security.jwt_expiry_hours,
            ),
            store,
        }
    }

    /// Generic repository over one named table
    pub fn table(&self, table_name: &str) -> TableRepository {
        TableRepository::new(table_name, self.store.clone(), self.resolver.clone())
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let protected = Router::new()
        .merge(session_routes())
        .merge(table_routes())
        .merge(item_routes(state.clone()))
        .merge(role_routes(state.clone()))
        .merge(user_routes(state.clone()))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_gate));

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/login", post(public::login_post))
        .merge(protected)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    // Global middleware
    if config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn session_routes() -> Router<AppState> {
    use protected::session;

    Router::new()
        .route("/me", get(session::me_get))
        .route("/logout", post(session::logout_post))
        .route("/user/permissions", get(session::permissions_get))
}

fn table_routes() -> Router<AppState> {
    use protected::tables;

    Router::new()
        .route("/tables", get(tables::tables_get))
        .route("/tables/names", get(tables::table_names_get))
}

fn item_routes(state: AppState) -> Router<AppState> {
    use protected::items;

    Router::new()
        .route("/table/:table_name/items", get(items::items_get))
        .route("/table/:table_name/item", post(items::item_post))
        .route(
            "/table/:table_name/item/:item_id",
            get(items::item_get)
                .put(items::item_put)
                .delete(items::item_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, require_table_permission))
}

fn role_routes(state: AppState) -> Router<AppState> {
    use protected::roles;

    Router::new()
        .route("/role", get(roles::roles_get).post(roles::role_post))
        .route(
            "/role/:role_id",
            get(roles::role_get)
                .put(roles::role_put)
                .delete(roles::role_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, require_roles_permission))
}

fn user_routes(state: AppState) -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/user", get(users::users_get).post(users::user_post))
        .route(
            "/user/:user_id",
            get(users::user_get)
                .put(users::user_put)
                .delete(users::user_delete),
        )
        .route("/user/:user_id/password", put(users::user_password_put))
        .route_layer(middleware::from_fn_with_state(state, require_users_permission))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "KV Admin API",
            "version": version,
            "description": "Admin console backend over a schema-flexible key-value store",
            "endpoints": {
                "login": "/login (public)",
                "session": "/me, /logout, /user/permissions (protected)",
                "tables": "/tables, /tables/names (protected)",
                "items": "/table/:table_name/items, /table/:table_name/item[/:item_id] (per-table permission)",
                "roles": "/role[/:role_id] (Roles permission)",
                "users": "/user[/:user_id][/password] (Users permission)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.list_tables().await {
        Ok(tables) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "ok",
                    "tables": tables.len()
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": true,
                "message": "store unavailable",
                "code": "SERVICE_UNAVAILABLE",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}

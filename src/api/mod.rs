use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, SeaOrmAccountService, SeaOrmWaypointService, TokenService, WaypointService,
};

pub mod auth;
mod error;
mod health;
mod types;
mod users;
mod waypoints;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub store: Arc<Store>,

    pub accounts: Arc<dyn AccountService>,

    pub waypoints: Arc<dyn WaypointService>,

    pub tokens: TokenService,

    pub start_time: std::time::Instant,
}

pub async fn create_app_state_from_config(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let store = Arc::new(
        Store::with_pool_options(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?,
    );

    let tokens = TokenService::new(&config.auth);

    let accounts: Arc<dyn AccountService> = Arc::new(SeaOrmAccountService::new(
        store.clone(),
        tokens.clone(),
        config.security.clone(),
    ));

    let waypoints: Arc<dyn WaypointService> = Arc::new(SeaOrmWaypointService::new(store.clone()));

    Ok(Arc::new(AppState {
        store,
        accounts,
        waypoints,
        tokens,
        start_time: std::time::Instant::now(),
    }))
}

#[must_use]
pub fn router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let protected_routes = create_protected_router().layer(middleware::from_fn_with_state(
        state.clone(),
        auth::auth_middleware,
    ));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/health", get(health::health))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/users", post(users::create_user))
        .route("/users/{username}", get(users::get_user))
        .route("/users/{username}", put(users::update_user))
        .route("/users/{username}", delete(users::delete_user))
        .route("/users/{username}/history", get(users::user_history))
        .route("/waypoints", get(waypoints::list_waypoint_sets))
        .route("/waypoints", post(waypoints::create_waypoint_set))
        .route("/waypoints/{name}", get(waypoints::get_waypoint_set))
        .route("/waypoints/{name}", put(waypoints::update_waypoint_set))
        .route("/waypoints/{name}", delete(waypoints::delete_waypoint_set))
        .route(
            "/waypoints/{name}/history",
            get(waypoints::waypoint_set_history),
        )
}

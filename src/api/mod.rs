use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{PasswordService, TokenService};
use crate::config::Config;
use crate::db::Store;
use crate::domain::Permission;
use crate::services::{
    AuthService, IncidentService, SeaOrmAuthService, SeaOrmIncidentService,
};

pub mod auth;
mod boards;
mod error;
pub mod guard;
mod incidents;
mod observability;
mod system;
mod types;
pub mod validation;

pub use auth::AuthUser;
pub use error::ApiError;
pub use observability::{logging_middleware, security_headers_middleware};
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: Arc<TokenService>,

    pub auth_service: Arc<dyn AuthService>,

    pub incident_service: Arc<dyn IncidentService>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub fn create_app_state(
    config: Config,
    store: Store,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let passwords = PasswordService::from_config(&config.auth)?;
    let tokens = Arc::new(TokenService::from_config(&config.auth));

    let auth_service = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        passwords,
        tokens.clone(),
    ));
    let incident_service = Arc::new(SeaOrmIncidentService::new(store.clone()));

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        store,
        tokens,
        auth_service,
        incident_service,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_url,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    create_app_state(config, store, prometheus_handle)
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();
    let public_stats = state.config.incidents.public_stats;

    let mut public_routes = Router::new()
        .route("/health", get(system::health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::signin))
        .route("/auth/signout", post(auth::signout))
        .route("/test/all", get(boards::public_board))
        .route("/incidents/public/published", get(incidents::list_published));

    let mut protected_routes = create_protected_router();

    if public_stats {
        public_routes = public_routes.route("/incidents/public/stats", get(incidents::get_stats));
    } else {
        protected_routes =
            protected_routes.route("/incidents/public/stats", get(incidents::get_stats));
    }

    let protected_routes = protected_routes.route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::auth_middleware,
    ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/", get(system::welcome))
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Routes behind the token check. Routes that also need a particular role add
/// a [`guard::require_permission`] layer of their own, which runs after the
/// token has been verified.
fn create_protected_router() -> Router<Arc<AppState>> {
    use guard::require_permission;
    use middleware::from_fn_with_state;

    Router::new()
        .route("/auth/me", get(auth::me))
        .route(
            "/test/user",
            get(boards::user_board).route_layer(from_fn_with_state(
                Permission::ViewUserBoard,
                require_permission,
            )),
        )
        .route(
            "/test/mod",
            get(boards::moderator_board).route_layer(from_fn_with_state(
                Permission::ViewModeratorBoard,
                require_permission,
            )),
        )
        .route(
            "/test/admin",
            get(boards::admin_board).route_layer(from_fn_with_state(
                Permission::ViewAdminBoard,
                require_permission,
            )),
        )
        .route(
            "/incidents",
            get(incidents::list_incidents)
                .post(incidents::create_incident)
                .merge(delete(incidents::delete_all_incidents).route_layer(
                    from_fn_with_state(Permission::DeleteAllIncidents, require_permission),
                )),
        )
        .route(
            "/incidents/admin/all",
            get(incidents::list_all_incidents).route_layer(from_fn_with_state(
                Permission::ListAllIncidents,
                require_permission,
            )),
        )
        .route(
            "/incidents/{id}",
            get(incidents::get_incident)
                .put(incidents::update_incident)
                .delete(incidents::delete_incident),
        )
        .route(
            "/metrics",
            get(observability::get_metrics).route_layer(from_fn_with_state(
                Permission::ViewMetrics,
                require_permission,
            )),
        )
}

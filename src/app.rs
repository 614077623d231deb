use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::Store;
use crate::handlers::{health, protected, public};
use crate::middleware::require_admin;
use crate::services::{AuthService, EnrollmentService, JobService};
use crate::validation::Validator;

/// Everything a handler needs, shared across requests. Built once at startup; tests build
/// it around a [`crate::database::MemoryStore`].
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenIssuer>,
    pub validator: Arc<Validator>,
    pub auth: Arc<AuthService>,
    pub jobs: Arc<JobService>,
    pub enrollment: Arc<EnrollmentService>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenIssuer>) -> Result<Self, regex::Error> {
        Ok(Self {
            validator: Arc::new(Validator::new()?),
            auth: Arc::new(AuthService::new(store.clone(), tokens.clone())),
            jobs: Arc::new(JobService::new(store.clone())),
            enrollment: Arc::new(EnrollmentService::new(store.clone())),
            store,
            tokens,
        })
    }
}

pub fn app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(public::auth::login))
        .route("/jobs", get(public::jobs::list))
        .route("/jobs/:id", get(public::jobs::get))
        .route("/candidates", post(public::candidates::enroll))
}

/// Same paths as the public routes for some entries; only the methods listed here are gated.
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/jobs", post(protected::jobs::create))
        .route(
            "/jobs/:id",
            put(protected::jobs::update).delete(protected::jobs::delete),
        )
        .route("/candidates", get(protected::candidates::list))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

/// Permissive in development when no origins are configured; otherwise an allow-list,
/// which outside development admits no cross-origin callers until `CORS_ORIGINS` is set.
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.server.cors_origins.is_empty() {
        if config.is_development() {
            return CorsLayer::permissive();
        }
        tracing::warn!(
            "CORS_ORIGINS is unset in {:?}; cross-origin requests will be refused",
            config.environment
        );
    }

    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

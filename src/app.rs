use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AuthGate, SecretHasher};
use crate::config::{config, Environment};
use crate::database::Store;
use crate::handlers::{addresses, contacts, users};
use crate::middleware::token_auth_middleware;
use crate::services::{AddressService, ContactService, UserService};

/// Shared handles for every request
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthGate,
    pub users: UserService,
    pub contacts: ContactService,
    pub addresses: AddressService,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn SecretHasher>) -> Self {
        Self {
            auth: AuthGate::new(store.clone(), hasher.clone()),
            users: UserService::new(store.clone(), hasher),
            contacts: ContactService::new(store.clone()),
            addresses: AddressService::new(store.clone()),
            store,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cfg = config();

    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/users", post(users::register))
        .route("/api/users/login", post(users::login))
        // Protected
        .merge(protected_routes(state.clone()))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer())
                .layer(DefaultBodyLimit::max(cfg.api.max_request_size_bytes)),
        );

    if cfg.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/users/current",
            get(users::current).patch(users::update).delete(users::logout),
        )
        .route("/api/contacts", post(contacts::create).get(contacts::search))
        .route(
            "/api/contacts/:contact_id",
            get(contacts::get).put(contacts::update).delete(contacts::delete),
        )
        .route(
            "/api/contacts/:contact_id/addresses",
            post(addresses::create).get(addresses::list),
        )
        .route(
            "/api/contacts/:contact_id/addresses/:address_id",
            get(addresses::get).put(addresses::update).delete(addresses::delete),
        )
        .route_layer(middleware::from_fn_with_state(state, token_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let cfg = config();
    if !cfg.security.enable_cors {
        return CorsLayer::new();
    }
    if cfg.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cfg
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Contact Directory API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "users": "/api/users, /api/users/login (public)",
                "current": "/api/users/current (protected)",
                "contacts": "/api/contacts[/:contact_id] (protected)",
                "addresses": "/api/contacts/:contact_id/addresses[/:address_id] (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}

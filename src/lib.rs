//! Warung API: a small food-ordering backend.
//!
//! Layout follows a three-layer split: `handlers` speak HTTP and own the
//! request/response DTOs, `services` own the business rules and all
//! persistence, `entities` are the SeaORM models. `auth` issues and
//! verifies bearer tokens; `services::midtrans` is the payment-gateway
//! client.

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod services;

use crate::auth::{AuthConfig, AuthService};
use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::services::midtrans::MidtransClient;
use crate::services::{
    AddressService, CartService, CatalogService, OrderService, PaymentService, ReviewService,
};
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

/// One instance of every service, wired once at startup and shared.
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub addresses: Arc<AddressService>,
    pub catalog: Arc<CatalogService>,
    pub cart: Arc<CartService>,
    pub orders: Arc<OrderService>,
    pub payments: Arc<PaymentService>,
    pub reviews: Arc<ReviewService>,
}

impl AppServices {
    pub fn build(db: Arc<DatabaseConnection>, config: &AppConfig) -> Self {
        let gateway = MidtransClient::from_config(&config.midtrans);
        let payments = Arc::new(PaymentService::new(db.clone(), gateway));
        Self {
            auth: Arc::new(AuthService::new(
                AuthConfig {
                    jwt_secret: config.jwt_secret.clone(),
                    token_expiration: Duration::from_secs(config.jwt_expiration),
                },
                db.clone(),
            )),
            addresses: Arc::new(AddressService::new(db.clone())),
            catalog: Arc::new(CatalogService::new(db.clone())),
            cart: Arc::new(CartService::new(db.clone())),
            orders: Arc::new(OrderService::new(db.clone(), payments.clone())),
            payments,
            reviews: Arc::new(ReviewService::new(db)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub services: Arc<AppServices>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: AppConfig) -> Self {
        let services = Arc::new(AppServices::build(db.clone(), &config));
        Self {
            db,
            config: Arc::new(config),
            services,
        }
    }
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.db.ping().await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    Json(json!({ "status": "ok", "database": database }))
}

/// Builds the full application router. Every route the server exposes is
/// registered here; tests mount the same router over an in-memory store.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(handlers::products::routes())
        .merge(handlers::cart::routes())
        .merge(handlers::orders::routes())
        .merge(handlers::payments::routes())
        .merge(handlers::reviews::routes())
        .merge(handlers::addresses::routes())
        .merge(handlers::auth::user_routes())
        .nest("/auth", handlers::auth::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .with_state(state)
}

/// Boots the HTTP server: binds, serves, and drains on SIGINT/SIGTERM.
pub async fn serve(state: AppState) -> Result<(), ServiceError> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ServiceError::InternalError(format!("failed to bind {}: {}", addr, e)))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServiceError::InternalError(format!("server error: {}", e)))?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, draining connections");
}

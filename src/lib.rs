//! ReliefStock API Library
//!
//! Relief-supply inventory tracking over an append-only stock ledger.
//! Current stock is always a projection over ledger entries, never a stored
//! aggregate.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod ledger;
pub mod migrator;
pub mod openapi;
pub mod projection;
pub mod services;

use axum::{extract::State, response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: services::AppServices,
    pub auth_service: Arc<auth::AuthService>,
}

impl AppState {
    /// Wires the full service stack over one connection pool
    pub fn build(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let auth_service = Arc::new(auth::AuthService::new(&config));
        let services = services::AppServices {
            stock: Arc::new(services::stock::StockService::new(
                db.clone(),
                event_sender.clone(),
            )),
            distributions: Arc::new(services::distributions::DistributionService::new(
                db.clone(),
                event_sender.clone(),
            )),
            items: Arc::new(services::items::ItemService::new(
                db.clone(),
                event_sender.clone(),
            )),
            campaigns: Arc::new(services::campaigns::CampaignService::new(
                db.clone(),
                event_sender.clone(),
            )),
            users: Arc::new(services::users::UserService::new(
                db.clone(),
                event_sender.clone(),
            )),
        };

        Self {
            db,
            config,
            event_sender,
            services,
            auth_service,
        }
    }
}

// Common response wrapper
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn message(message: String) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message),
            errors: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
        }
    }
}

/// All `/api/v1` routes
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/stock", handlers::stock::stock_router())
        .nest("/distributions", handlers::distributions::distribution_router())
        .nest("/items", handlers::items::item_router())
        .nest("/campaigns", handlers::campaigns::campaign_router())
        .nest("/users", handlers::users::user_router())
        .route("/status", get(api_status))
        .route("/openapi.json", get(openapi::openapi_json))
}

/// Root router: liveness plus the versioned API
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1_routes())
}

async fn api_status() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    })))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

#[cfg(test)]
mod response_tests {
    use super::*;

    #[test]
    fn success_wraps_data() {
        let response = ApiResponse::success(42);
        assert!(response.success);
        assert_eq!(response.data, Some(42));
        assert!(response.message.is_none());
    }

    #[test]
    fn error_carries_message() {
        let response = ApiResponse::<()>::error("oops".into());
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("oops"));
    }
}

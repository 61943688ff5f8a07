// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Provides liveness and database-backed readiness endpoints for load balancers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use recipe_core::constants::{endpoints, service_names};
use serde_json::{json, Value};
use tracing::warn;

use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(endpoints::HEALTH, get(Self::handle_health))
            .route(endpoints::READY, get(Self::handle_ready))
            .with_state(resources)
    }

    async fn handle_health() -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "service": service_names::RECIPE_API_SERVER,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339()
        }))
    }

    async fn handle_ready(
        State(resources): State<Arc<ServerResources>>,
    ) -> (StatusCode, Json<Value>) {
        match resources.database.health_check().await {
            Ok(()) => (
                StatusCode::OK,
                Json(json!({
                    "status": "ready",
                    "database": "ok",
                    "timestamp": Utc::now().to_rfc3339()
                })),
            ),
            Err(e) => {
                warn!("Readiness check failed: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({
                        "status": "unavailable",
                        "database": "error",
                        "timestamp": Utc::now().to_rfc3339()
                    })),
                )
            }
        }
    }
}

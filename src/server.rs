// ABOUTME: HTTP server assembly and lifecycle for the recipe API
// ABOUTME: Merges domain routers, applies CORS and tracing layers, serves with graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

use std::future::pending;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use recipe_core::constants::endpoints;
use recipe_core::models::{Ingredient, Tag};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::middleware::{setup_cors, with_request_tracing};
use crate::resources::ServerResources;
use crate::routes::{AttributeRoutes, HealthRoutes, RecipeRoutes, UserRoutes};

/// Build the complete application router
#[must_use]
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let router = Router::new()
        .merge(HealthRoutes::routes(Arc::clone(resources)))
        .merge(UserRoutes::routes(Arc::clone(resources)))
        .merge(AttributeRoutes::<Tag>::routes(
            Arc::clone(resources),
            endpoints::TAGS,
        ))
        .merge(AttributeRoutes::<Ingredient>::routes(
            Arc::clone(resources),
            endpoints::INGREDIENTS,
        ))
        .merge(RecipeRoutes::routes(Arc::clone(resources)))
        .layer(setup_cors(&resources.config));

    with_request_tracing(router)
}

/// Bind `port` on all interfaces and serve until Ctrl-C or SIGTERM
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails
pub async fn run_server(resources: Arc<ServerResources>, port: u16) -> Result<()> {
    let app = build_router(&resources);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {addr}"))?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

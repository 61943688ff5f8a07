// ABOUTME: Server binary for the recipe API
// ABOUTME: Loads configuration, initializes logging and storage, then serves HTTP until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

//! # Recipe API Server Binary
//!
//! Reads configuration from the environment, applies command-line overrides,
//! opens the SQLite database and serves the JSON API.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use recipe_api_server::{
    config::{DatabaseUrl, ServerConfig},
    database::Database,
    logging,
    resources::ServerResources,
    server::run_server,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "recipe-api-server")]
#[command(about = "Recipe API - users, tags, ingredients and recipes over JSON HTTP")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL (e.g. `sqlite:./data/recipes.db` or `sqlite::memory:`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url.as_deref() {
        config.database.url = DatabaseUrl::parse_url(database_url)?;
    }
    config.validate()?;

    logging::init_from_env()?;

    info!("Starting Recipe API server");
    info!("{}", config.summary());

    let database = Database::new(
        &config.database.url.to_connection_string(),
        config.database.max_connections,
    )
    .await?;
    info!("Database initialized successfully");

    let port = config.http_port;
    let resources = Arc::new(ServerResources::from_config(database, Arc::new(config)));

    if let Err(e) = run_server(resources, port).await {
        error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}

// ABOUTME: Command-line utility that creates a staff superuser account
// ABOUTME: Uses the configured database and the same validation as public registration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

//! Usage:
//! ```bash
//! cargo run --bin create-superuser -- --email admin@example.com --password secret123
//!
//! # Against a specific database
//! cargo run --bin create-superuser -- --email admin@example.com --password secret123 \
//!     --name "Site Admin" --database-url sqlite:./data/recipes.db
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use recipe_api_server::{
    config::{DatabaseUrl, ServerConfig},
    database::Database,
    logging,
    resources::ServerResources,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "create-superuser",
    about = "Create a Recipe API superuser",
    long_about = "Create a staff superuser in the configured database. The email must be unused."
)]
struct CreateSuperuserArgs {
    /// Email address used to log in
    #[arg(long)]
    email: String,

    /// Password (at least 5 characters)
    #[arg(long)]
    password: String,

    /// Display name
    #[arg(long, default_value = "")]
    name: String,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CreateSuperuserArgs::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(database_url) = args.database_url.as_deref() {
        config.database.url = DatabaseUrl::parse_url(database_url)?;
    }

    let database = Database::new(
        &config.database.url.to_connection_string(),
        config.database.max_connections,
    )
    .await?;
    let resources = ServerResources::from_config(database, Arc::new(config));

    match resources
        .user_service
        .create_superuser(&args.email, &args.password, &args.name)
        .await
    {
        Ok(user) => {
            info!(user_id = user.id, "Superuser created: {}", user.email);
            Ok(())
        }
        Err(e) => {
            error!("Failed to create superuser: {}", e);
            Err(e.into())
        }
    }
}

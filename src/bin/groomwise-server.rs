// ABOUTME: Main server binary for the grooming scheduling backend
// ABOUTME: Loads environment configuration, connects the database, and serves HTTP
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use groomwise::config::environment::ServerConfig;
use groomwise::database_plugins::{factory::Database, DatabaseProvider};
use groomwise::logging;
use groomwise::server::{self, ServerResources};

#[derive(Parser)]
#[command(name = "groomwise-server", about = "Pet grooming scheduling backend")]
struct Args {
    /// Override the HTTP listen port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override the database connection URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.http_port {
        config.http_port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    logging::init(&config.log_level, &config.environment)?;
    info!("{}", config.summary());

    let database = Database::new(&config.database.url).await?;
    info!(backend = database.backend_info(), "Database ready");

    let resources = Arc::new(ServerResources::new(database, config));
    server::run(resources).await?;
    Ok(())
}

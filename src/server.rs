// ABOUTME: HTTP server assembly and lifecycle for the grooming scheduling backend
// ABOUTME: Builds the axum router from route modules and serves it with graceful shutdown
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::environment::ServerConfig;
use crate::database_plugins::factory::Database;
use crate::errors::{AppError, AppResult};
use crate::routes::{
    AppointmentRoutes, HealthRoutes, PetRoutes, ServiceConfigurationRoutes, ServiceRoutes,
    SpeciesRoutes, UserRoutes, WeightClassRoutes,
};

/// Shared resources handed to every route module
pub struct ServerResources {
    pub database: Database,
    pub config: ServerConfig,
}

impl ServerResources {
    #[must_use]
    pub const fn new(database: Database, config: ServerConfig) -> Self {
        Self { database, config }
    }
}

/// Assemble the full application router
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(AppointmentRoutes::routes(resources.clone()))
        .merge(UserRoutes::routes(resources.clone()))
        .merge(PetRoutes::routes(resources.clone()))
        .merge(SpeciesRoutes::routes(resources.clone()))
        .merge(WeightClassRoutes::routes(resources.clone()))
        .merge(ServiceRoutes::routes(resources.clone()))
        .merge(ServiceConfigurationRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until shutdown
pub async fn run(resources: Arc<ServerResources>) -> AppResult<()> {
    let addr = format!(
        "{}:{}",
        resources.config.http_host, resources.config.http_port
    );
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::config(format!("failed to bind {addr}: {e}")))?;

    info!(
        address = %addr,
        backend = resources.database.backend_info(),
        "Server listening"
    );

    let router = build_router(resources);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("server error: {e}")))?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {e}");
    }
}

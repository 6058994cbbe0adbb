// ABOUTME: Health check endpoint for load balancers and monitoring
// ABOUTME: Reports service status and the active database backend
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;

use crate::server::ServerResources;

pub struct HealthRoutes;

impl HealthRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(health))
            .with_state(resources)
    }
}

async fn health(State(resources): State<Arc<ServerResources>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "backend": resources.database.backend_info(),
    }))
}

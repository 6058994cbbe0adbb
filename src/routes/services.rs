// ABOUTME: Grooming service catalog endpoints
// ABOUTME: Base price is advisory; appointments snapshot the configured price instead
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use std::sync::Arc;

use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::models::{NewService, ServiceUpdate};
use crate::server::ServerResources;

pub struct ServiceRoutes;

impl ServiceRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/services", post(create).get(list))
            .route("/services/:id", get(find_by_id))
            .route("/services/:id", patch(update))
            .route("/services/:id", delete(remove))
            .with_state(resources)
    }
}

async fn create(
    State(resources): State<Arc<ServerResources>>,
    Json(payload): Json<NewService>,
) -> AppResult<impl IntoResponse> {
    let service = resources.database.create_service(&payload).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

async fn list(State(resources): State<Arc<ServerResources>>) -> AppResult<impl IntoResponse> {
    let services = resources.database.get_services().await?;
    Ok(Json(services))
}

async fn find_by_id(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let service = resources
        .database
        .get_service(id)
        .await?
        .ok_or_else(|| AppError::not_found("service not found"))?;
    Ok(Json(service))
}

async fn update(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
    Json(payload): Json<ServiceUpdate>,
) -> AppResult<impl IntoResponse> {
    let service = resources.database.update_service(id, &payload).await?;
    Ok(Json(service))
}

async fn remove(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    resources.database.delete_service(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ABOUTME: Weight class catalog endpoints
// ABOUTME: Weight class labels participate in the service configuration composite key
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::server::ServerResources;

#[derive(Debug, Deserialize)]
pub struct WeightClassPayload {
    pub label: String,
}

pub struct WeightClassRoutes;

impl WeightClassRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/weight_classes", post(create).get(list))
            .route("/weight_classes/:id", get(find_by_id))
            .route("/weight_classes/:id", patch(update))
            .route("/weight_classes/:id", delete(remove))
            .with_state(resources)
    }
}

async fn create(
    State(resources): State<Arc<ServerResources>>,
    Json(payload): Json<WeightClassPayload>,
) -> AppResult<impl IntoResponse> {
    let weight_class = resources
        .database
        .create_weight_class(&payload.label)
        .await?;
    Ok((StatusCode::CREATED, Json(weight_class)))
}

async fn list(State(resources): State<Arc<ServerResources>>) -> AppResult<impl IntoResponse> {
    let weight_classes = resources.database.get_weight_classes().await?;
    Ok(Json(weight_classes))
}

async fn find_by_id(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let weight_class = resources
        .database
        .get_weight_class(id)
        .await?
        .ok_or_else(|| AppError::not_found("weight class not found"))?;
    Ok(Json(weight_class))
}

async fn update(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
    Json(payload): Json<WeightClassPayload>,
) -> AppResult<impl IntoResponse> {
    let weight_class = resources
        .database
        .update_weight_class(id, &payload.label)
        .await?;
    Ok(Json(weight_class))
}

async fn remove(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    resources.database.delete_weight_class(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ABOUTME: Pet registration and management endpoints
// ABOUTME: Reclassifying a pet's weight class affects future bookings only
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
use crate::models::{NewPet, PetUpdate};
use crate::server::ServerResources;

pub struct PetRoutes;

impl PetRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/pets", post(create).get(list))
            .route("/pets/:id", get(find_by_id))
            .route("/pets/:id", patch(update))
            .route("/pets/:id", delete(remove))
            .with_state(resources)
    }
}

async fn create(
    State(resources): State<Arc<ServerResources>>,
    Json(payload): Json<NewPet>,
) -> AppResult<impl IntoResponse> {
    let pet = resources.database.create_pet(&payload).await?;
    Ok((StatusCode::CREATED, Json(pet)))
}

async fn list(State(resources): State<Arc<ServerResources>>) -> AppResult<impl IntoResponse> {
    let pets = resources.database.get_pets().await?;
    Ok(Json(pets))
}

async fn find_by_id(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let pet = resources
        .database
        .get_pet(id)
        .await?
        .ok_or_else(|| AppError::not_found("pet not found"))?;
    Ok(Json(pet))
}

async fn update(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
    Json(payload): Json<PetUpdate>,
) -> AppResult<impl IntoResponse> {
    let pet = resources.database.update_pet(id, &payload).await?;
    Ok(Json(pet))
}

async fn remove(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    resources.database.delete_pet(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ABOUTME: Species catalog endpoints
// ABOUTME: Deleting a species still referenced by pets or configurations is rejected
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
pub struct SpeciesPayload {
    pub name: String,
}

pub struct SpeciesRoutes;

impl SpeciesRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/species", post(create).get(list))
            .route("/species/:id", get(find_by_id))
            .route("/species/:id", patch(update))
            .route("/species/:id", delete(remove))
            .with_state(resources)
    }
}

async fn create(
    State(resources): State<Arc<ServerResources>>,
    Json(payload): Json<SpeciesPayload>,
) -> AppResult<impl IntoResponse> {
    let species = resources.database.create_species(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(species)))
}

async fn list(State(resources): State<Arc<ServerResources>>) -> AppResult<impl IntoResponse> {
    let species = resources.database.get_species_list().await?;
    Ok(Json(species))
}

async fn find_by_id(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let species = resources
        .database
        .get_species(id)
        .await?
        .ok_or_else(|| AppError::not_found("species not found"))?;
    Ok(Json(species))
}

async fn update(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
    Json(payload): Json<SpeciesPayload>,
) -> AppResult<impl IntoResponse> {
    let species = resources.database.update_species(id, &payload.name).await?;
    Ok(Json(species))
}

async fn remove(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    resources.database.delete_species(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ABOUTME: Service configuration endpoints keyed by (species, service, weight class)
// ABOUTME: Editing a configuration never rewrites snapshots on existing appointments
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::models::{ConfigurationUpdate, NewServiceConfiguration};
use crate::server::ServerResources;

pub struct ServiceConfigurationRoutes;

impl ServiceConfigurationRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/service_configurations", post(create).get(list))
            .route(
                "/service_configurations/service/:service_id",
                get(list_for_service),
            )
            .route(
                "/service_configurations/:species_id/:service_id/:weight_class_id",
                get(find_by_key).patch(update).delete(remove),
            )
            .with_state(resources)
    }
}

async fn create(
    State(resources): State<Arc<ServerResources>>,
    Json(payload): Json<NewServiceConfiguration>,
) -> AppResult<impl IntoResponse> {
    let config = resources.database.create_configuration(&payload).await?;
    Ok((StatusCode::CREATED, Json(config)))
}

async fn list(State(resources): State<Arc<ServerResources>>) -> AppResult<impl IntoResponse> {
    let configs = resources.database.get_configurations().await?;
    Ok(Json(configs))
}

async fn list_for_service(
    State(resources): State<Arc<ServerResources>>,
    Path(service_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let configs = resources
        .database
        .get_configurations_for_service(service_id)
        .await?;
    Ok(Json(configs))
}

async fn find_by_key(
    State(resources): State<Arc<ServerResources>>,
    Path((species_id, service_id, weight_class_id)): Path<(i64, i64, i64)>,
) -> AppResult<impl IntoResponse> {
    let config = resources
        .database
        .get_configuration(species_id, service_id, weight_class_id)
        .await?
        .ok_or_else(|| AppError::not_found("configuration not found"))?;
    Ok(Json(config))
}

async fn update(
    State(resources): State<Arc<ServerResources>>,
    Path((species_id, service_id, weight_class_id)): Path<(i64, i64, i64)>,
    Json(payload): Json<ConfigurationUpdate>,
) -> AppResult<impl IntoResponse> {
    let config = resources
        .database
        .update_configuration(species_id, service_id, weight_class_id, &payload)
        .await?;
    Ok(Json(config))
}

async fn remove(
    State(resources): State<Arc<ServerResources>>,
    Path((species_id, service_id, weight_class_id)): Path<(i64, i64, i64)>,
) -> AppResult<impl IntoResponse> {
    resources
        .database
        .delete_configuration(species_id, service_id, weight_class_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

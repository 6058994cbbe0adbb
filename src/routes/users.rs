// ABOUTME: Client (pet owner) management endpoints
// ABOUTME: CRUD plus a nested listing of the client's pets
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
use crate::models::{NewUser, UserUpdate};
use crate::server::ServerResources;

pub struct UserRoutes;

impl UserRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/users", post(create).get(list))
            .route("/users/:id", get(find_by_id))
            .route("/users/:id", patch(update))
            .route("/users/:id", delete(remove))
            .route("/users/:id/pets", get(list_pets))
            .with_state(resources)
    }
}

async fn create(
    State(resources): State<Arc<ServerResources>>,
    Json(payload): Json<NewUser>,
) -> AppResult<impl IntoResponse> {
    let user = resources.database.create_user(&payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list(State(resources): State<Arc<ServerResources>>) -> AppResult<impl IntoResponse> {
    let users = resources.database.get_users().await?;
    Ok(Json(users))
}

async fn find_by_id(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let user = resources
        .database
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    Ok(Json(user))
}

async fn update(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<impl IntoResponse> {
    let user = resources.database.update_user(id, &payload).await?;
    Ok(Json(user))
}

async fn remove(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    resources.database.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_pets(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let pets = resources.database.get_pets_by_owner(id).await?;
    Ok(Json(pets))
}

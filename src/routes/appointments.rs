// ABOUTME: Appointment booking, lookup, cancellation, and reschedule endpoints
// ABOUTME: All conflict detection happens inside the scheduling engine's transactions
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::BookingRequest;
use crate::scheduling;
use crate::server::ServerResources;

/// Body for PATCH /appointments/:id/reschedule
#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub start_time: DateTime<Utc>,
}

pub struct AppointmentRoutes;

impl AppointmentRoutes {
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/appointments", post(book))
            .route("/appointments/:id", get(find_by_id))
            .route("/appointments/:id/cancel", patch(cancel))
            .route("/appointments/:id/reschedule", patch(reschedule))
            .route("/pets/:id/appointments", get(list_for_pet))
            .with_state(resources)
    }
}

async fn book(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<BookingRequest>,
) -> AppResult<impl IntoResponse> {
    // A missing pet or configuration here is a bad booking request, not a
    // missing appointment resource, so it reports as a validation failure.
    let appointment = scheduling::book(&resources.database, &request)
        .await
        .map_err(|e| match e.code {
            ErrorCode::ResourceNotFound => AppError::invalid_input(e.message),
            _ => e,
        })?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn find_by_id(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let appointment = scheduling::find_by_id(&resources.database, id).await?;
    Ok(Json(appointment))
}

async fn list_for_pet(
    State(resources): State<Arc<ServerResources>>,
    Path(pet_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let appointments = scheduling::list_for_pet(&resources.database, pet_id).await?;
    Ok(Json(appointments))
}

async fn cancel(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let appointment = scheduling::cancel(&resources.database, id).await?;
    Ok(Json(appointment))
}

async fn reschedule(
    State(resources): State<Arc<ServerResources>>,
    Path(id): Path<i64>,
    Json(request): Json<RescheduleRequest>,
) -> AppResult<impl IntoResponse> {
    let appointment =
        scheduling::reschedule(&resources.database, id, request.start_time).await?;
    Ok(Json(appointment))
}

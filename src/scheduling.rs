// ABOUTME: Scheduling engine for booking, cancelling, and rescheduling appointments
// ABOUTME: Thin orchestration layer between HTTP handlers and the database plugins
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Appointment scheduling operations
//!
//! The hard guarantees (pet-level locking, price/duration snapshots, the
//! no-overlap invariant) live in the database plugins; this module adds
//! request-level orchestration and structured logging around them.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::database_plugins::{factory::Database, DatabaseProvider};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Appointment, BookingRequest};

/// Book a new appointment
///
/// Pricing and duration are resolved from the active configuration for the
/// pet's (species, service, weight class) key and frozen into the
/// appointment row.
pub async fn book(db: &Database, request: &BookingRequest) -> AppResult<Appointment> {
    let appointment = db.book_appointment(request).await.inspect_err(|e| {
        if e.code == ErrorCode::BookingConflict {
            warn!(
                pet_id = request.pet_id,
                start_time = %request.start_time,
                "Booking rejected: slot overlaps an existing appointment"
            );
        }
    })?;

    info!(
        appointment_id = appointment.id,
        pet_id = appointment.pet_id,
        start_time = %appointment.start_time,
        end_time = %appointment.end_time,
        "Appointment booked"
    );
    Ok(appointment)
}

/// Fetch a single appointment
pub async fn find_by_id(db: &Database, appointment_id: i64) -> AppResult<Appointment> {
    db.get_appointment(appointment_id)
        .await?
        .ok_or_else(|| AppError::not_found("appointment not found"))
}

/// List appointments for one pet, newest first
pub async fn list_for_pet(db: &Database, pet_id: i64) -> AppResult<Vec<Appointment>> {
    db.get_appointments_for_pet(pet_id).await
}

/// Cancel an appointment
///
/// Idempotent: cancelling an already cancelled appointment succeeds and
/// leaves the row unchanged apart from its update timestamp.
pub async fn cancel(db: &Database, appointment_id: i64) -> AppResult<Appointment> {
    let appointment = db.cancel_appointment(appointment_id).await?;
    info!(appointment_id, "Appointment cancelled");
    Ok(appointment)
}

/// Move an appointment to a new start time
///
/// The duration snapshot taken at booking is reused; the status returns to
/// booked, which also revives a previously cancelled appointment when its
/// new slot is free.
pub async fn reschedule(
    db: &Database,
    appointment_id: i64,
    new_start_time: DateTime<Utc>,
) -> AppResult<Appointment> {
    let appointment = db
        .reschedule_appointment(appointment_id, new_start_time)
        .await
        .inspect_err(|e| {
            if e.code == ErrorCode::BookingConflict {
                warn!(
                    appointment_id,
                    start_time = %new_start_time,
                    "Reschedule rejected: new slot overlaps an existing appointment"
                );
            }
        })?;

    info!(
        appointment_id,
        start_time = %appointment.start_time,
        end_time = %appointment.end_time,
        "Appointment rescheduled"
    );
    Ok(appointment)
}

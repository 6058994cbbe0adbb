// ABOUTME: Core data models for the grooming scheduling API
// ABOUTME: Defines Appointment, Pet, ServiceConfiguration and related payload types
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Data Models
//!
//! Core data structures shared by the storage backends, the scheduling
//! engine, and the HTTP layer.
//!
//! ## Design Principles
//!
//! - **Backend Agnostic**: the same structs round-trip through SQLite and
//!   PostgreSQL; backend-specific column mapping stays in the backends
//! - **Serializable**: every persisted model serializes to the wire format
//!   listed in the API contract
//! - **Validated at the boundary**: payload types validate themselves before
//!   any I/O happens
//!
//! ## Core Models
//!
//! - [`Appointment`]: a booked time slot carrying price/duration snapshots
//! - [`ServiceConfiguration`]: per-(species, service, weight-class) pricing
//! - [`Pet`]: the scheduling subject; its classification drives pricing

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Maximum length for user, species, and service names
pub const MAX_NAME_LENGTH: usize = 60;
/// Maximum length for pet names
pub const MAX_PET_NAME_LENGTH: usize = 20;

/// Validate that an identifier is a positive integer
pub fn validate_id(id: i64, name: &str) -> AppResult<i64> {
    if id <= 0 {
        return Err(AppError::invalid_input(format!("invalid {name}")));
    }
    Ok(id)
}

/// Trim a name and enforce a length limit
pub fn normalize_name(name: &str, what: &str, max_len: usize) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input(format!("{what} cannot be empty")));
    }
    if trimmed.len() > max_len {
        return Err(AppError::invalid_input(format!(
            "{what} cannot exceed {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Appointment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Stable string form used in storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }
}

impl Display for AppointmentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booked" => Ok(Self::Booked),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "no_show" => Ok(Self::NoShow),
            other => Err(AppError::internal(format!(
                "unknown appointment status: {other}"
            ))),
        }
    }
}

/// A client of the grooming business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A groomable species (dog, cat, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A pet size category; selects pricing together with species
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightClass {
    pub id: i64,
    pub label: String,
}

/// A groomable service (wash, trim, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroomingService {
    pub id: i64,
    pub name: String,
    pub base_price: Decimal,
    pub uuid: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A pet owned by a user
///
/// The species and weight-class classification feeds the configuration lookup
/// at booking time; reclassifying a pet affects future bookings only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub species_id: i64,
    pub owner_id: i64,
    pub weight_class_id: Option<i64>,
    pub uuid: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Active price/duration for a (species, service, weight-class) triple
///
/// At most one row exists per composite key. Appointments copy price and
/// duration out of this row at booking time; later edits never touch
/// existing appointments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfiguration {
    pub species_id: i64,
    pub service_id: i64,
    pub weight_class_id: i64,
    pub price: Decimal,
    pub duration_minutes: i32,
    pub is_active: bool,
}

/// A booked appointment
///
/// `price_snapshot` and `duration_snapshot` are captured verbatim from the
/// service configuration when the appointment is booked and are never
/// recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub user_id: i64,
    pub pet_id: i64,
    pub service_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub price_snapshot: Decimal,
    pub duration_snapshot: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// Payload for creating a user
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub phone: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> AppResult<()> {
        normalize_name(&self.full_name, "full_name", MAX_NAME_LENGTH)?;
        if self.phone.trim().is_empty() {
            return Err(AppError::invalid_input("phone cannot be empty"));
        }
        Ok(())
    }
}

/// Partial update for a user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
}

impl UserUpdate {
    pub fn validate(&self) -> AppResult<()> {
        if self.is_empty() {
            return Err(AppError::invalid_input("no fields provided for update"));
        }
        if let Some(name) = &self.full_name {
            normalize_name(name, "full_name", MAX_NAME_LENGTH)?;
        }
        if let Some(phone) = &self.phone {
            if phone.trim().is_empty() {
                return Err(AppError::invalid_input("phone cannot be empty"));
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.description.is_none()
    }
}

/// Payload for creating a pet
#[derive(Debug, Clone, Deserialize)]
pub struct NewPet {
    pub name: String,
    pub species_id: i64,
    pub owner_id: i64,
    #[serde(default)]
    pub weight_class_id: Option<i64>,
}

impl NewPet {
    pub fn validate(&self) -> AppResult<()> {
        normalize_name(&self.name, "pet name", MAX_PET_NAME_LENGTH)?;
        validate_id(self.species_id, "species_id")?;
        validate_id(self.owner_id, "owner_id")?;
        if let Some(wc) = self.weight_class_id {
            validate_id(wc, "weight_class_id")?;
        }
        Ok(())
    }
}

/// Partial update for a pet
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PetUpdate {
    pub name: Option<String>,
    pub species_id: Option<i64>,
    pub weight_class_id: Option<i64>,
}

impl PetUpdate {
    pub fn validate(&self) -> AppResult<()> {
        if self.is_empty() {
            return Err(AppError::invalid_input("no fields provided for update"));
        }
        if let Some(name) = &self.name {
            normalize_name(name, "pet name", MAX_PET_NAME_LENGTH)?;
        }
        if let Some(id) = self.species_id {
            validate_id(id, "species_id")?;
        }
        if let Some(id) = self.weight_class_id {
            validate_id(id, "weight_class_id")?;
        }
        Ok(())
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.species_id.is_none() && self.weight_class_id.is_none()
    }
}

/// Payload for creating a grooming service
#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
    pub name: String,
    pub base_price: Decimal,
}

impl NewService {
    pub fn validate(&self) -> AppResult<()> {
        normalize_name(&self.name, "service name", MAX_NAME_LENGTH)?;
        if self.base_price.is_sign_negative() {
            return Err(AppError::invalid_input("invalid price"));
        }
        Ok(())
    }
}

/// Partial update for a grooming service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub base_price: Option<Decimal>,
}

impl ServiceUpdate {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.is_none() && self.base_price.is_none() {
            return Err(AppError::invalid_input("no fields provided for update"));
        }
        if let Some(name) = &self.name {
            normalize_name(name, "service name", MAX_NAME_LENGTH)?;
        }
        if let Some(price) = self.base_price {
            if price.is_sign_negative() {
                return Err(AppError::invalid_input("invalid price"));
            }
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

/// Payload for creating a service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NewServiceConfiguration {
    pub species_id: i64,
    pub service_id: i64,
    pub weight_class_id: i64,
    pub price: Decimal,
    pub duration_minutes: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl NewServiceConfiguration {
    pub fn validate(&self) -> AppResult<()> {
        validate_id(self.species_id, "species_id")?;
        validate_id(self.service_id, "service_id")?;
        validate_id(self.weight_class_id, "weight_class_id")?;
        if self.price.is_sign_negative() {
            return Err(AppError::invalid_input("invalid price"));
        }
        if self.duration_minutes <= 0 {
            return Err(AppError::invalid_input("invalid duration"));
        }
        Ok(())
    }
}

/// Partial update for a service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigurationUpdate {
    pub price: Option<Decimal>,
    pub duration_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

impl ConfigurationUpdate {
    pub fn validate(&self) -> AppResult<()> {
        if self.price.is_none() && self.duration_minutes.is_none() && self.is_active.is_none() {
            return Err(AppError::invalid_input("no fields provided for update"));
        }
        if let Some(price) = self.price {
            if price.is_sign_negative() {
                return Err(AppError::invalid_input("invalid price"));
            }
        }
        if let Some(minutes) = self.duration_minutes {
            if minutes <= 0 {
                return Err(AppError::invalid_input("invalid duration"));
            }
        }
        Ok(())
    }
}

/// Booking request consumed by the scheduling engine
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub user_id: i64,
    pub pet_id: i64,
    pub service_id: i64,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            AppointmentStatus::Booked,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ] {
            let parsed: AppointmentStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("lost".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_validate_id_rejects_non_positive() {
        assert!(validate_id(1, "id").is_ok());
        assert!(validate_id(0, "id").is_err());
        assert!(validate_id(-3, "pet_id").is_err());
    }

    #[test]
    fn test_pet_name_length_limit() {
        let pet = NewPet {
            name: "x".repeat(MAX_PET_NAME_LENGTH + 1),
            species_id: 1,
            owner_id: 1,
            weight_class_id: None,
        };
        assert!(pet.validate().is_err());
    }

    #[test]
    fn test_empty_update_rejected() {
        assert!(PetUpdate::default().validate().is_err());
        assert!(UserUpdate::default().validate().is_err());
        assert!(ConfigurationUpdate::default().validate().is_err());
    }

    #[test]
    fn test_configuration_validation() {
        let mut cfg = NewServiceConfiguration {
            species_id: 1,
            service_id: 1,
            weight_class_id: 1,
            price: Decimal::new(4000, 2),
            duration_minutes: 30,
            is_active: true,
        };
        assert!(cfg.validate().is_ok());

        cfg.duration_minutes = 0;
        assert!(cfg.validate().is_err());

        cfg.duration_minutes = 30;
        cfg.price = Decimal::new(-100, 2);
        assert!(cfg.validate().is_err());
    }
}

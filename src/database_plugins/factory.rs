// ABOUTME: Database factory for selecting a backend from the connection URL
// ABOUTME: Validates payloads once, then delegates to the SQLite or PostgreSQL plugin
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Database factory for multi-backend support
//!
//! Payload validation happens here, once, so every backend receives only
//! well-formed input and the HTTP layer never talks to a plugin directly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use super::sqlite::SqliteDatabase;
use super::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::models::{
    normalize_name, validate_id, Appointment, BookingRequest, ConfigurationUpdate,
    GroomingService, NewPet, NewService, NewServiceConfiguration, NewUser, Pet, PetUpdate,
    ServiceConfiguration, ServiceUpdate, Species, User, UserUpdate, WeightClass,
    MAX_NAME_LENGTH,
};

#[cfg(feature = "postgresql")]
use super::postgres::PostgresDatabase;

/// Database abstraction enum supporting multiple backends
#[derive(Clone)]
pub enum Database {
    /// SQLite backend for local development and self-hosted deployments
    SQLite(SqliteDatabase),
    /// PostgreSQL backend for production deployments
    #[cfg(feature = "postgresql")]
    PostgreSQL(PostgresDatabase),
}

/// Database type detection from URL scheme
fn detect_database_type(database_url: &str) -> AppResult<&'static str> {
    if database_url.starts_with("sqlite:") {
        Ok("sqlite")
    } else if database_url.starts_with("postgres:") || database_url.starts_with("postgresql:") {
        Ok("postgresql")
    } else {
        Err(AppError::config(format!(
            "unsupported database URL scheme: {database_url}"
        )))
    }
}

impl Database {
    /// Get backend information for logging
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        match self {
            Self::SQLite(_) => "SQLite",
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(_) => "PostgreSQL",
        }
    }

    fn validate_configuration_key(
        species_id: i64,
        service_id: i64,
        weight_class_id: i64,
    ) -> AppResult<()> {
        validate_id(species_id, "species_id")?;
        validate_id(service_id, "service_id")?;
        validate_id(weight_class_id, "weight_class_id")?;
        Ok(())
    }
}

#[async_trait]
impl DatabaseProvider for Database {
    async fn new(database_url: &str) -> AppResult<Self> {
        match detect_database_type(database_url)? {
            "sqlite" => {
                info!("Creating SQLite database connection");
                let db = SqliteDatabase::new(database_url).await?;
                Ok(Self::SQLite(db))
            }
            #[cfg(feature = "postgresql")]
            "postgresql" => {
                info!("Creating PostgreSQL database connection");
                let db = PostgresDatabase::new(database_url).await?;
                Ok(Self::PostgreSQL(db))
            }
            #[cfg(not(feature = "postgresql"))]
            "postgresql" => Err(AppError::config(
                "PostgreSQL support not compiled in; rebuild with --features postgresql",
            )),
            other => Err(AppError::config(format!(
                "unsupported database type: {other}"
            ))),
        }
    }

    async fn migrate(&self) -> AppResult<()> {
        match self {
            Self::SQLite(db) => db.migrate().await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.migrate().await,
        }
    }

    // ================================
    // Users
    // ================================

    async fn create_user(&self, user: &NewUser) -> AppResult<User> {
        user.validate()?;
        match self {
            Self::SQLite(db) => db.create_user(user).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.create_user(user).await,
        }
    }

    async fn get_users(&self) -> AppResult<Vec<User>> {
        match self {
            Self::SQLite(db) => db.get_users().await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_users().await,
        }
    }

    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        validate_id(user_id, "user_id")?;
        match self {
            Self::SQLite(db) => db.get_user(user_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_user(user_id).await,
        }
    }

    async fn update_user(&self, user_id: i64, update: &UserUpdate) -> AppResult<User> {
        validate_id(user_id, "user_id")?;
        update.validate()?;
        match self {
            Self::SQLite(db) => db.update_user(user_id, update).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.update_user(user_id, update).await,
        }
    }

    async fn delete_user(&self, user_id: i64) -> AppResult<()> {
        validate_id(user_id, "user_id")?;
        match self {
            Self::SQLite(db) => db.delete_user(user_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.delete_user(user_id).await,
        }
    }

    // ================================
    // Species
    // ================================

    async fn create_species(&self, name: &str) -> AppResult<Species> {
        let name = normalize_name(name, "species name", MAX_NAME_LENGTH)?;
        match self {
            Self::SQLite(db) => db.create_species(&name).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.create_species(&name).await,
        }
    }

    async fn get_species_list(&self) -> AppResult<Vec<Species>> {
        match self {
            Self::SQLite(db) => db.get_species_list().await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_species_list().await,
        }
    }

    async fn get_species(&self, species_id: i64) -> AppResult<Option<Species>> {
        validate_id(species_id, "species_id")?;
        match self {
            Self::SQLite(db) => db.get_species(species_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_species(species_id).await,
        }
    }

    async fn update_species(&self, species_id: i64, name: &str) -> AppResult<Species> {
        validate_id(species_id, "species_id")?;
        let name = normalize_name(name, "species name", MAX_NAME_LENGTH)?;
        match self {
            Self::SQLite(db) => db.update_species(species_id, &name).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.update_species(species_id, &name).await,
        }
    }

    async fn delete_species(&self, species_id: i64) -> AppResult<()> {
        validate_id(species_id, "species_id")?;
        match self {
            Self::SQLite(db) => db.delete_species(species_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.delete_species(species_id).await,
        }
    }

    // ================================
    // Weight Classes
    // ================================

    async fn create_weight_class(&self, label: &str) -> AppResult<WeightClass> {
        let label = normalize_name(label, "weight class label", MAX_NAME_LENGTH)?;
        match self {
            Self::SQLite(db) => db.create_weight_class(&label).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.create_weight_class(&label).await,
        }
    }

    async fn get_weight_classes(&self) -> AppResult<Vec<WeightClass>> {
        match self {
            Self::SQLite(db) => db.get_weight_classes().await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_weight_classes().await,
        }
    }

    async fn get_weight_class(&self, weight_class_id: i64) -> AppResult<Option<WeightClass>> {
        validate_id(weight_class_id, "weight_class_id")?;
        match self {
            Self::SQLite(db) => db.get_weight_class(weight_class_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_weight_class(weight_class_id).await,
        }
    }

    async fn update_weight_class(
        &self,
        weight_class_id: i64,
        label: &str,
    ) -> AppResult<WeightClass> {
        validate_id(weight_class_id, "weight_class_id")?;
        let label = normalize_name(label, "weight class label", MAX_NAME_LENGTH)?;
        match self {
            Self::SQLite(db) => db.update_weight_class(weight_class_id, &label).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.update_weight_class(weight_class_id, &label).await,
        }
    }

    async fn delete_weight_class(&self, weight_class_id: i64) -> AppResult<()> {
        validate_id(weight_class_id, "weight_class_id")?;
        match self {
            Self::SQLite(db) => db.delete_weight_class(weight_class_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.delete_weight_class(weight_class_id).await,
        }
    }

    // ================================
    // Grooming Services
    // ================================

    async fn create_service(&self, service: &NewService) -> AppResult<GroomingService> {
        service.validate()?;
        match self {
            Self::SQLite(db) => db.create_service(service).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.create_service(service).await,
        }
    }

    async fn get_services(&self) -> AppResult<Vec<GroomingService>> {
        match self {
            Self::SQLite(db) => db.get_services().await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_services().await,
        }
    }

    async fn get_service(&self, service_id: i64) -> AppResult<Option<GroomingService>> {
        validate_id(service_id, "service_id")?;
        match self {
            Self::SQLite(db) => db.get_service(service_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_service(service_id).await,
        }
    }

    async fn update_service(
        &self,
        service_id: i64,
        update: &ServiceUpdate,
    ) -> AppResult<GroomingService> {
        validate_id(service_id, "service_id")?;
        update.validate()?;
        match self {
            Self::SQLite(db) => db.update_service(service_id, update).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.update_service(service_id, update).await,
        }
    }

    async fn delete_service(&self, service_id: i64) -> AppResult<()> {
        validate_id(service_id, "service_id")?;
        match self {
            Self::SQLite(db) => db.delete_service(service_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.delete_service(service_id).await,
        }
    }

    // ================================
    // Pets
    // ================================

    async fn create_pet(&self, pet: &NewPet) -> AppResult<Pet> {
        pet.validate()?;
        match self {
            Self::SQLite(db) => db.create_pet(pet).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.create_pet(pet).await,
        }
    }

    async fn get_pets(&self) -> AppResult<Vec<Pet>> {
        match self {
            Self::SQLite(db) => db.get_pets().await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_pets().await,
        }
    }

    async fn get_pet(&self, pet_id: i64) -> AppResult<Option<Pet>> {
        validate_id(pet_id, "pet_id")?;
        match self {
            Self::SQLite(db) => db.get_pet(pet_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_pet(pet_id).await,
        }
    }

    async fn get_pets_by_owner(&self, owner_id: i64) -> AppResult<Vec<Pet>> {
        validate_id(owner_id, "owner_id")?;
        match self {
            Self::SQLite(db) => db.get_pets_by_owner(owner_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_pets_by_owner(owner_id).await,
        }
    }

    async fn update_pet(&self, pet_id: i64, update: &PetUpdate) -> AppResult<Pet> {
        validate_id(pet_id, "pet_id")?;
        update.validate()?;
        match self {
            Self::SQLite(db) => db.update_pet(pet_id, update).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.update_pet(pet_id, update).await,
        }
    }

    async fn delete_pet(&self, pet_id: i64) -> AppResult<()> {
        validate_id(pet_id, "pet_id")?;
        match self {
            Self::SQLite(db) => db.delete_pet(pet_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.delete_pet(pet_id).await,
        }
    }

    // ================================
    // Service Configurations
    // ================================

    async fn create_configuration(
        &self,
        config: &NewServiceConfiguration,
    ) -> AppResult<ServiceConfiguration> {
        config.validate()?;
        match self {
            Self::SQLite(db) => db.create_configuration(config).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.create_configuration(config).await,
        }
    }

    async fn get_configurations(&self) -> AppResult<Vec<ServiceConfiguration>> {
        match self {
            Self::SQLite(db) => db.get_configurations().await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_configurations().await,
        }
    }

    async fn get_configurations_for_service(
        &self,
        service_id: i64,
    ) -> AppResult<Vec<ServiceConfiguration>> {
        validate_id(service_id, "service_id")?;
        match self {
            Self::SQLite(db) => db.get_configurations_for_service(service_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_configurations_for_service(service_id).await,
        }
    }

    async fn get_configuration(
        &self,
        species_id: i64,
        service_id: i64,
        weight_class_id: i64,
    ) -> AppResult<Option<ServiceConfiguration>> {
        Self::validate_configuration_key(species_id, service_id, weight_class_id)?;
        match self {
            Self::SQLite(db) => {
                db.get_configuration(species_id, service_id, weight_class_id)
                    .await
            }
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => {
                db.get_configuration(species_id, service_id, weight_class_id)
                    .await
            }
        }
    }

    async fn update_configuration(
        &self,
        species_id: i64,
        service_id: i64,
        weight_class_id: i64,
        update: &ConfigurationUpdate,
    ) -> AppResult<ServiceConfiguration> {
        Self::validate_configuration_key(species_id, service_id, weight_class_id)?;
        update.validate()?;
        match self {
            Self::SQLite(db) => {
                db.update_configuration(species_id, service_id, weight_class_id, update)
                    .await
            }
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => {
                db.update_configuration(species_id, service_id, weight_class_id, update)
                    .await
            }
        }
    }

    async fn delete_configuration(
        &self,
        species_id: i64,
        service_id: i64,
        weight_class_id: i64,
    ) -> AppResult<()> {
        Self::validate_configuration_key(species_id, service_id, weight_class_id)?;
        match self {
            Self::SQLite(db) => {
                db.delete_configuration(species_id, service_id, weight_class_id)
                    .await
            }
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => {
                db.delete_configuration(species_id, service_id, weight_class_id)
                    .await
            }
        }
    }

    // ================================
    // Appointments
    // ================================

    async fn book_appointment(&self, request: &BookingRequest) -> AppResult<Appointment> {
        validate_id(request.user_id, "user_id")?;
        validate_id(request.pet_id, "pet_id")?;
        validate_id(request.service_id, "service_id")?;
        match self {
            Self::SQLite(db) => db.book_appointment(request).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.book_appointment(request).await,
        }
    }

    async fn get_appointment(&self, appointment_id: i64) -> AppResult<Option<Appointment>> {
        validate_id(appointment_id, "appointment_id")?;
        match self {
            Self::SQLite(db) => db.get_appointment(appointment_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_appointment(appointment_id).await,
        }
    }

    async fn get_appointments_for_pet(&self, pet_id: i64) -> AppResult<Vec<Appointment>> {
        validate_id(pet_id, "pet_id")?;
        match self {
            Self::SQLite(db) => db.get_appointments_for_pet(pet_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.get_appointments_for_pet(pet_id).await,
        }
    }

    async fn cancel_appointment(&self, appointment_id: i64) -> AppResult<Appointment> {
        validate_id(appointment_id, "appointment_id")?;
        match self {
            Self::SQLite(db) => db.cancel_appointment(appointment_id).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => db.cancel_appointment(appointment_id).await,
        }
    }

    async fn reschedule_appointment(
        &self,
        appointment_id: i64,
        new_start_time: DateTime<Utc>,
    ) -> AppResult<Appointment> {
        validate_id(appointment_id, "appointment_id")?;
        match self {
            Self::SQLite(db) => db.reschedule_appointment(appointment_id, new_start_time).await,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(db) => {
                db.reschedule_appointment(appointment_id, new_start_time).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_sqlite_urls() {
        assert_eq!(detect_database_type("sqlite::memory:").unwrap(), "sqlite");
        assert_eq!(
            detect_database_type("sqlite:./data/groomwise.db").unwrap(),
            "sqlite"
        );
    }

    #[test]
    fn test_detect_postgres_urls() {
        assert_eq!(
            detect_database_type("postgresql://localhost/groomwise").unwrap(),
            "postgresql"
        );
        assert_eq!(
            detect_database_type("postgres://localhost/groomwise").unwrap(),
            "postgresql"
        );
    }

    #[test]
    fn test_detect_rejects_unknown_scheme() {
        assert!(detect_database_type("mysql://localhost/groomwise").is_err());
    }
}

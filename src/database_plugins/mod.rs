// ABOUTME: Database abstraction layer for the grooming scheduling backend
// ABOUTME: Plugin architecture with SQLite and PostgreSQL backends
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::AppResult;
use crate::models::{
    Appointment, BookingRequest, ConfigurationUpdate, GroomingService, NewPet, NewService,
    NewServiceConfiguration, NewUser, Pet, PetUpdate, ServiceConfiguration, ServiceUpdate, Species,
    User, UserUpdate, WeightClass,
};

pub mod factory;
pub mod shared;
pub mod sqlite;

#[cfg(feature = "postgresql")]
pub mod postgres;

/// Core database abstraction trait
///
/// All database implementations must implement this trait to provide a
/// consistent interface for the application layer. Payload validation happens
/// before these methods are called; implementations translate their
/// storage-level constraint violations into the shared error taxonomy.
#[async_trait]
pub trait DatabaseProvider: Send + Sync + Clone {
    /// Create a new database connection
    async fn new(database_url: &str) -> AppResult<Self>
    where
        Self: Sized;

    /// Run database migrations to set up schema
    async fn migrate(&self) -> AppResult<()>;

    // ================================
    // Users
    // ================================

    /// Create a new client record
    async fn create_user(&self, user: &NewUser) -> AppResult<User>;

    /// List all clients
    async fn get_users(&self) -> AppResult<Vec<User>>;

    /// Get client by ID
    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>>;

    /// Partially update a client
    async fn update_user(&self, user_id: i64, update: &UserUpdate) -> AppResult<User>;

    /// Delete a client
    async fn delete_user(&self, user_id: i64) -> AppResult<()>;

    // ================================
    // Species
    // ================================

    /// Create a species
    async fn create_species(&self, name: &str) -> AppResult<Species>;

    /// List all species ordered by name
    async fn get_species_list(&self) -> AppResult<Vec<Species>>;

    /// Get species by ID
    async fn get_species(&self, species_id: i64) -> AppResult<Option<Species>>;

    /// Rename a species
    async fn update_species(&self, species_id: i64, name: &str) -> AppResult<Species>;

    /// Delete a species; fails while pets still reference it
    async fn delete_species(&self, species_id: i64) -> AppResult<()>;

    // ================================
    // Weight Classes
    // ================================

    /// Create a weight class
    async fn create_weight_class(&self, label: &str) -> AppResult<WeightClass>;

    /// List all weight classes
    async fn get_weight_classes(&self) -> AppResult<Vec<WeightClass>>;

    /// Get weight class by ID
    async fn get_weight_class(&self, weight_class_id: i64) -> AppResult<Option<WeightClass>>;

    /// Relabel a weight class
    async fn update_weight_class(&self, weight_class_id: i64, label: &str)
        -> AppResult<WeightClass>;

    /// Delete a weight class; fails while pets or configurations reference it
    async fn delete_weight_class(&self, weight_class_id: i64) -> AppResult<()>;

    // ================================
    // Grooming Services
    // ================================

    /// Create a groomable service
    async fn create_service(&self, service: &NewService) -> AppResult<GroomingService>;

    /// List all services
    async fn get_services(&self) -> AppResult<Vec<GroomingService>>;

    /// Get service by ID
    async fn get_service(&self, service_id: i64) -> AppResult<Option<GroomingService>>;

    /// Partially update a service
    async fn update_service(
        &self,
        service_id: i64,
        update: &ServiceUpdate,
    ) -> AppResult<GroomingService>;

    /// Delete a service
    async fn delete_service(&self, service_id: i64) -> AppResult<()>;

    // ================================
    // Pets
    // ================================

    /// Register a pet
    async fn create_pet(&self, pet: &NewPet) -> AppResult<Pet>;

    /// List all pets
    async fn get_pets(&self) -> AppResult<Vec<Pet>>;

    /// Get pet by ID
    async fn get_pet(&self, pet_id: i64) -> AppResult<Option<Pet>>;

    /// List pets belonging to an owner
    async fn get_pets_by_owner(&self, owner_id: i64) -> AppResult<Vec<Pet>>;

    /// Partially update a pet; reclassification affects future bookings only
    async fn update_pet(&self, pet_id: i64, update: &PetUpdate) -> AppResult<Pet>;

    /// Delete a pet
    async fn delete_pet(&self, pet_id: i64) -> AppResult<()>;

    // ================================
    // Service Configurations
    // ================================

    /// Create a price/duration configuration for a composite key
    async fn create_configuration(
        &self,
        config: &NewServiceConfiguration,
    ) -> AppResult<ServiceConfiguration>;

    /// List all configurations
    async fn get_configurations(&self) -> AppResult<Vec<ServiceConfiguration>>;

    /// List all configurations priced for one service
    async fn get_configurations_for_service(
        &self,
        service_id: i64,
    ) -> AppResult<Vec<ServiceConfiguration>>;

    /// Get configuration by composite key, active or not
    async fn get_configuration(
        &self,
        species_id: i64,
        service_id: i64,
        weight_class_id: i64,
    ) -> AppResult<Option<ServiceConfiguration>>;

    /// Partially update a configuration
    async fn update_configuration(
        &self,
        species_id: i64,
        service_id: i64,
        weight_class_id: i64,
        update: &ConfigurationUpdate,
    ) -> AppResult<ServiceConfiguration>;

    /// Delete a configuration
    async fn delete_configuration(
        &self,
        species_id: i64,
        service_id: i64,
        weight_class_id: i64,
    ) -> AppResult<()>;

    // ================================
    // Appointments
    // ================================

    /// Book an appointment atomically: lock the pet row, resolve the active
    /// configuration, snapshot price/duration, insert under the no-overlap
    /// invariant. Rolls back fully on any failure.
    async fn book_appointment(&self, request: &BookingRequest) -> AppResult<Appointment>;

    /// Get appointment by ID
    async fn get_appointment(&self, appointment_id: i64) -> AppResult<Option<Appointment>>;

    /// List appointments for a pet, newest first
    async fn get_appointments_for_pet(&self, pet_id: i64) -> AppResult<Vec<Appointment>>;

    /// Set an appointment's status to cancelled
    async fn cancel_appointment(&self, appointment_id: i64) -> AppResult<Appointment>;

    /// Move an appointment to a new start time, reusing its duration
    /// snapshot; re-validates the no-overlap invariant in the same
    /// transaction and resets status to booked
    async fn reschedule_appointment(
        &self,
        appointment_id: i64,
        new_start_time: DateTime<Utc>,
    ) -> AppResult<Appointment>;
}

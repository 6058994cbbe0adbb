// ABOUTME: SQLite database implementation for local development and tests
// ABOUTME: Enforces the no-overlap invariant with an explicit check inside the booking transaction
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! SQLite database implementation
//!
//! SQLite has no range exclusion constraints, so the no-overlap invariant is
//! enforced with an explicit overlap query performed inside the same write
//! transaction as the insert/update. The transaction starts with a touch-write
//! on the locked row, which takes SQLite's write lock and serializes
//! same-database bookings; concurrent writers see `database is locked` and go
//! through the shared retry helper.
//!
//! Timestamps are stored as fixed-width UTC text (`%Y-%m-%dT%H:%M:%S%.3fZ`)
//! so the overlap range predicates compare correctly as strings.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use uuid::Uuid;

use super::shared::transactions::retry_transaction;
use super::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::models::{
    Appointment, AppointmentStatus, BookingRequest, ConfigurationUpdate, GroomingService, NewPet,
    NewService, NewServiceConfiguration, NewUser, Pet, PetUpdate, ServiceConfiguration,
    ServiceUpdate, Species, User, UserUpdate, WeightClass,
};

/// Fixed-width UTC timestamp format; lexicographic order equals temporal order
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Retry budget for write transactions hitting `database is locked`
const WRITE_RETRIES: u32 = 5;

fn fmt_time(t: &DateTime<Utc>) -> String {
    t.format(TIME_FORMAT).to_string()
}

fn parse_time(s: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("corrupt timestamp in storage: {e}")))
}

fn parse_price(s: &str) -> AppResult<Decimal> {
    Decimal::from_str(s).map_err(|e| AppError::internal(format!("corrupt price in storage: {e}")))
}

fn parse_uuid(s: &str) -> AppResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| AppError::internal(format!("corrupt uuid in storage: {e}")))
}

/// Map constraint violations raised by a statement to domain errors; anything
/// else stays a storage error
fn translate_constraint(e: sqlx::Error, duplicate: &str, referential: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return AppError::already_exists(duplicate);
        }
        if db.is_foreign_key_violation() {
            return AppError::referential_violation(referential);
        }
    }
    AppError::from(e)
}

/// Map a foreign-key violation on DELETE to a resource-in-use error
fn translate_delete_restriction(e: sqlx::Error, in_use: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            return AppError::resource_in_use(in_use);
        }
    }
    AppError::from(e)
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        description: row.try_get("description")?,
        created_at: parse_time(&row.try_get::<String, _>("created_at")?)?,
    })
}

fn row_to_species(row: &SqliteRow) -> AppResult<Species> {
    Ok(Species {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: parse_time(&row.try_get::<String, _>("created_at")?)?,
    })
}

fn row_to_weight_class(row: &SqliteRow) -> AppResult<WeightClass> {
    Ok(WeightClass {
        id: row.try_get("id")?,
        label: row.try_get("label")?,
    })
}

fn row_to_service(row: &SqliteRow) -> AppResult<GroomingService> {
    Ok(GroomingService {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        base_price: parse_price(&row.try_get::<String, _>("base_price")?)?,
        uuid: parse_uuid(&row.try_get::<String, _>("uuid")?)?,
        created_at: parse_time(&row.try_get::<String, _>("created_at")?)?,
    })
}

fn row_to_pet(row: &SqliteRow) -> AppResult<Pet> {
    Ok(Pet {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        species_id: row.try_get("species")?,
        owner_id: row.try_get("owner")?,
        weight_class_id: row.try_get("weight_class_id")?,
        uuid: parse_uuid(&row.try_get::<String, _>("uuid")?)?,
        created_at: parse_time(&row.try_get::<String, _>("created_at")?)?,
        updated_at: parse_time(&row.try_get::<String, _>("updated_at")?)?,
    })
}

fn row_to_configuration(row: &SqliteRow) -> AppResult<ServiceConfiguration> {
    Ok(ServiceConfiguration {
        species_id: row.try_get("species_id")?,
        service_id: row.try_get("service_id")?,
        weight_class_id: row.try_get("weight_class_id")?,
        price: parse_price(&row.try_get::<String, _>("price")?)?,
        duration_minutes: row.try_get("duration_minutes")?,
        is_active: row.try_get("is_active")?,
    })
}

fn row_to_appointment(row: &SqliteRow) -> AppResult<Appointment> {
    Ok(Appointment {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        pet_id: row.try_get("pet_id")?,
        service_id: row.try_get("service_id")?,
        start_time: parse_time(&row.try_get::<String, _>("start_time")?)?,
        end_time: parse_time(&row.try_get::<String, _>("end_time")?)?,
        status: AppointmentStatus::from_str(&row.try_get::<String, _>("status")?)?,
        price_snapshot: parse_price(&row.try_get::<String, _>("price_snapshot")?)?,
        duration_snapshot: row.try_get("duration_snapshot")?,
        description: row.try_get("description")?,
        created_at: parse_time(&row.try_get::<String, _>("created_at")?)?,
        updated_at: parse_time(&row.try_get::<String, _>("updated_at")?)?,
    })
}

/// SQLite database implementation
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: Pool<Sqlite>,
}

impl SqliteDatabase {
    /// Attempt the booking transaction once; retried by the caller on lock
    /// contention
    async fn try_book(&self, request: &BookingRequest) -> AppResult<Appointment> {
        let mut tx = self.pool.begin().await?;

        // Touch-write the pet row: verifies it exists, returns the
        // classification, and takes the write lock so same-database bookings
        // serialize (the SQLite stand-in for SELECT ... FOR UPDATE).
        let pet_row = sqlx::query(
            "UPDATE pets SET updated_at = updated_at WHERE id = ?1 \
             RETURNING species, weight_class_id",
        )
        .bind(request.pet_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(pet_row) = pet_row else {
            return Err(AppError::not_found("pet not found"));
        };
        let species_id: i64 = pet_row.try_get("species")?;
        let weight_class_id: Option<i64> = pet_row.try_get("weight_class_id")?;

        // A NULL weight class matches no configuration, which lands on the
        // same business-rule gap as a missing row.
        let config = sqlx::query(
            "SELECT price, duration_minutes FROM service_configurations \
             WHERE species_id = ?1 AND service_id = ?2 AND weight_class_id = ?3 \
               AND is_active = 1",
        )
        .bind(species_id)
        .bind(request.service_id)
        .bind(weight_class_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(config) = config else {
            return Err(AppError::not_found("service configuration not found"));
        };
        let price: String = config.try_get("price")?;
        let duration_minutes: i32 = config.try_get("duration_minutes")?;

        let start = request.start_time;
        let end = start + Duration::minutes(i64::from(duration_minutes));

        // Explicit overlap check in place of the range exclusion constraint
        // SQLite does not have; same transaction as the insert, so no
        // check-then-act window remains.
        let overlapping: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments \
             WHERE pet_id = ?1 AND status <> 'cancelled' \
               AND start_time < ?2 AND end_time > ?3",
        )
        .bind(request.pet_id)
        .bind(fmt_time(&end))
        .bind(fmt_time(&start))
        .fetch_one(&mut *tx)
        .await?;

        if overlapping > 0 {
            return Err(AppError::booking_conflict(
                "appointment overlaps existing booking",
            ));
        }

        let now = fmt_time(&Utc::now());
        let row = sqlx::query(
            "INSERT INTO appointments \
               (user_id, pet_id, service_id, start_time, end_time, status, \
                price_snapshot, duration_snapshot, description, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 'booked', ?6, ?7, ?8, ?9, ?9) \
             RETURNING *",
        )
        .bind(request.user_id)
        .bind(request.pet_id)
        .bind(request.service_id)
        .bind(fmt_time(&start))
        .bind(fmt_time(&end))
        .bind(price)
        .bind(duration_minutes)
        .bind(request.description.as_deref())
        .bind(&now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            translate_constraint(
                e,
                "appointment already exists",
                "invalid user, pet, or service",
            )
        })?;

        let appointment = row_to_appointment(&row)?;
        tx.commit().await?;
        Ok(appointment)
    }

    /// Attempt the reschedule transaction once
    async fn try_reschedule(
        &self,
        appointment_id: i64,
        new_start_time: DateTime<Utc>,
    ) -> AppResult<Appointment> {
        let mut tx = self.pool.begin().await?;

        // Touch-write takes the write lock and yields the preserved snapshot.
        let row = sqlx::query(
            "UPDATE appointments SET updated_at = updated_at WHERE id = ?1 \
             RETURNING pet_id, duration_snapshot",
        )
        .bind(appointment_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(AppError::not_found("appointment not found"));
        };
        let pet_id: i64 = row.try_get("pet_id")?;
        // Duration is never recomputed from the current configuration.
        let duration_snapshot: i32 = row.try_get("duration_snapshot")?;

        let end = new_start_time + Duration::minutes(i64::from(duration_snapshot));

        let overlapping: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments \
             WHERE pet_id = ?1 AND id <> ?2 AND status <> 'cancelled' \
               AND start_time < ?3 AND end_time > ?4",
        )
        .bind(pet_id)
        .bind(appointment_id)
        .bind(fmt_time(&end))
        .bind(fmt_time(&new_start_time))
        .fetch_one(&mut *tx)
        .await?;

        if overlapping > 0 {
            return Err(AppError::booking_conflict(
                "new time overlaps existing booking",
            ));
        }

        let row = sqlx::query(
            "UPDATE appointments \
             SET start_time = ?1, end_time = ?2, status = 'booked', updated_at = ?3 \
             WHERE id = ?4 \
             RETURNING *",
        )
        .bind(fmt_time(&new_start_time))
        .bind(fmt_time(&end))
        .bind(fmt_time(&Utc::now()))
        .bind(appointment_id)
        .fetch_one(&mut *tx)
        .await?;

        let appointment = row_to_appointment(&row)?;
        tx.commit().await?;
        Ok(appointment)
    }
}

#[async_trait]
impl DatabaseProvider for SqliteDatabase {
    async fn new(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("invalid sqlite url: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5));

        // Every new in-memory connection gets its own empty database, so
        // in-memory pools must stay at a single connection.
        let max_connections = if database_url.contains(":memory:") || database_url.contains("mode=memory") {
            1
        } else {
            5
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                full_name TEXT NOT NULL UNIQUE,
                email TEXT UNIQUE,
                phone TEXT NOT NULL UNIQUE,
                description TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS species (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS weight_classes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                label TEXT NOT NULL UNIQUE
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS services (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                base_price TEXT NOT NULL,
                uuid TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS pets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                species INTEGER NOT NULL REFERENCES species(id),
                owner INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                weight_class_id INTEGER REFERENCES weight_classes(id),
                uuid TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS service_configurations (
                species_id INTEGER NOT NULL REFERENCES species(id) ON DELETE CASCADE,
                service_id INTEGER NOT NULL REFERENCES services(id) ON DELETE CASCADE,
                weight_class_id INTEGER NOT NULL REFERENCES weight_classes(id) ON DELETE CASCADE,
                price TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
                is_active INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (species_id, service_id, weight_class_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                pet_id INTEGER NOT NULL REFERENCES pets(id),
                service_id INTEGER NOT NULL REFERENCES services(id),
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL CHECK (end_time > start_time),
                status TEXT NOT NULL DEFAULT 'booked'
                    CHECK (status IN ('booked', 'confirmed', 'completed', 'cancelled', 'no_show')),
                price_snapshot TEXT NOT NULL,
                duration_snapshot INTEGER NOT NULL CHECK (duration_snapshot > 0),
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Overlap checks scan per pet and time range
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_appointments_pet_time \
             ON appointments(pet_id, start_time)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ================================
    // Users
    // ================================

    async fn create_user(&self, user: &NewUser) -> AppResult<User> {
        let row = sqlx::query(
            "INSERT INTO users (full_name, email, phone, description, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING *",
        )
        .bind(user.full_name.trim())
        .bind(user.email.as_deref())
        .bind(user.phone.trim())
        .bind(user.description.as_deref())
        .bind(fmt_time(&Utc::now()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate_constraint(e, "user already exists", "invalid user"))?;
        row_to_user(&row)
    }

    async fn get_users(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_user).collect()
    }

    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn update_user(&self, user_id: i64, update: &UserUpdate) -> AppResult<User> {
        let row = sqlx::query(
            "UPDATE users SET \
                full_name = COALESCE(?1, full_name), \
                email = COALESCE(?2, email), \
                phone = COALESCE(?3, phone), \
                description = COALESCE(?4, description) \
             WHERE id = ?5 RETURNING *",
        )
        .bind(update.full_name.as_deref().map(str::trim))
        .bind(update.email.as_deref())
        .bind(update.phone.as_deref().map(str::trim))
        .bind(update.description.as_deref())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| translate_constraint(e, "user already exists", "invalid user"))?;
        row.as_ref()
            .map(row_to_user)
            .transpose()?
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    async fn delete_user(&self, user_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| translate_delete_restriction(e, "cannot delete user in use"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("user not found"));
        }
        Ok(())
    }

    // ================================
    // Species
    // ================================

    async fn create_species(&self, name: &str) -> AppResult<Species> {
        let row = sqlx::query(
            "INSERT INTO species (name, created_at) VALUES (?1, ?2) RETURNING *",
        )
        .bind(name.trim())
        .bind(fmt_time(&Utc::now()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate_constraint(e, "species already exists", "invalid species"))?;
        row_to_species(&row)
    }

    async fn get_species_list(&self) -> AppResult<Vec<Species>> {
        let rows = sqlx::query("SELECT * FROM species ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_species).collect()
    }

    async fn get_species(&self, species_id: i64) -> AppResult<Option<Species>> {
        let row = sqlx::query("SELECT * FROM species WHERE id = ?1")
            .bind(species_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_species).transpose()
    }

    async fn update_species(&self, species_id: i64, name: &str) -> AppResult<Species> {
        let row = sqlx::query("UPDATE species SET name = ?1 WHERE id = ?2 RETURNING *")
            .bind(name.trim())
            .bind(species_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| translate_constraint(e, "species already exists", "invalid species"))?;
        row.as_ref()
            .map(row_to_species)
            .transpose()?
            .ok_or_else(|| AppError::not_found("species not found"))
    }

    async fn delete_species(&self, species_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM species WHERE id = ?1")
            .bind(species_id)
            .execute(&self.pool)
            .await
            .map_err(|e| translate_delete_restriction(e, "cannot delete species in use"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("species not found"));
        }
        Ok(())
    }

    // ================================
    // Weight Classes
    // ================================

    async fn create_weight_class(&self, label: &str) -> AppResult<WeightClass> {
        let row = sqlx::query("INSERT INTO weight_classes (label) VALUES (?1) RETURNING *")
            .bind(label.trim())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                translate_constraint(e, "weight class already exists", "invalid weight class")
            })?;
        row_to_weight_class(&row)
    }

    async fn get_weight_classes(&self) -> AppResult<Vec<WeightClass>> {
        let rows = sqlx::query("SELECT * FROM weight_classes ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_weight_class).collect()
    }

    async fn get_weight_class(&self, weight_class_id: i64) -> AppResult<Option<WeightClass>> {
        let row = sqlx::query("SELECT * FROM weight_classes WHERE id = ?1")
            .bind(weight_class_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_weight_class).transpose()
    }

    async fn update_weight_class(
        &self,
        weight_class_id: i64,
        label: &str,
    ) -> AppResult<WeightClass> {
        let row = sqlx::query("UPDATE weight_classes SET label = ?1 WHERE id = ?2 RETURNING *")
            .bind(label.trim())
            .bind(weight_class_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                translate_constraint(e, "weight class already exists", "invalid weight class")
            })?;
        row.as_ref()
            .map(row_to_weight_class)
            .transpose()?
            .ok_or_else(|| AppError::not_found("weight class not found"))
    }

    async fn delete_weight_class(&self, weight_class_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM weight_classes WHERE id = ?1")
            .bind(weight_class_id)
            .execute(&self.pool)
            .await
            .map_err(|e| translate_delete_restriction(e, "cannot delete weight class in use"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("weight class not found"));
        }
        Ok(())
    }

    // ================================
    // Grooming Services
    // ================================

    async fn create_service(&self, service: &NewService) -> AppResult<GroomingService> {
        let row = sqlx::query(
            "INSERT INTO services (name, base_price, uuid, created_at) \
             VALUES (?1, ?2, ?3, ?4) RETURNING *",
        )
        .bind(service.name.trim())
        .bind(service.base_price.to_string())
        .bind(Uuid::new_v4().to_string())
        .bind(fmt_time(&Utc::now()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate_constraint(e, "service already exists", "invalid service"))?;
        row_to_service(&row)
    }

    async fn get_services(&self) -> AppResult<Vec<GroomingService>> {
        let rows = sqlx::query("SELECT * FROM services ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_service).collect()
    }

    async fn get_service(&self, service_id: i64) -> AppResult<Option<GroomingService>> {
        let row = sqlx::query("SELECT * FROM services WHERE id = ?1")
            .bind(service_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_service).transpose()
    }

    async fn update_service(
        &self,
        service_id: i64,
        update: &ServiceUpdate,
    ) -> AppResult<GroomingService> {
        let row = sqlx::query(
            "UPDATE services SET \
                name = COALESCE(?1, name), \
                base_price = COALESCE(?2, base_price) \
             WHERE id = ?3 RETURNING *",
        )
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.base_price.map(|p| p.to_string()))
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| translate_constraint(e, "service already exists", "invalid service"))?;
        row.as_ref()
            .map(row_to_service)
            .transpose()?
            .ok_or_else(|| AppError::not_found("service not found"))
    }

    async fn delete_service(&self, service_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?1")
            .bind(service_id)
            .execute(&self.pool)
            .await
            .map_err(|e| translate_delete_restriction(e, "cannot delete service in use"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("service not found"));
        }
        Ok(())
    }

    // ================================
    // Pets
    // ================================

    async fn create_pet(&self, pet: &NewPet) -> AppResult<Pet> {
        let now = fmt_time(&Utc::now());
        let row = sqlx::query(
            "INSERT INTO pets (name, species, owner, weight_class_id, uuid, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING *",
        )
        .bind(pet.name.trim())
        .bind(pet.species_id)
        .bind(pet.owner_id)
        .bind(pet.weight_class_id)
        .bind(Uuid::new_v4().to_string())
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            translate_constraint(e, "pet already exists", "invalid species, owner, or weight class")
        })?;
        row_to_pet(&row)
    }

    async fn get_pets(&self) -> AppResult<Vec<Pet>> {
        let rows = sqlx::query("SELECT * FROM pets ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_pet).collect()
    }

    async fn get_pet(&self, pet_id: i64) -> AppResult<Option<Pet>> {
        let row = sqlx::query("SELECT * FROM pets WHERE id = ?1")
            .bind(pet_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_pet).transpose()
    }

    async fn get_pets_by_owner(&self, owner_id: i64) -> AppResult<Vec<Pet>> {
        let rows = sqlx::query("SELECT * FROM pets WHERE owner = ?1 ORDER BY created_at DESC")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_pet).collect()
    }

    async fn update_pet(&self, pet_id: i64, update: &PetUpdate) -> AppResult<Pet> {
        let row = sqlx::query(
            "UPDATE pets SET \
                name = COALESCE(?1, name), \
                species = COALESCE(?2, species), \
                weight_class_id = COALESCE(?3, weight_class_id), \
                updated_at = ?4 \
             WHERE id = ?5 RETURNING *",
        )
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.species_id)
        .bind(update.weight_class_id)
        .bind(fmt_time(&Utc::now()))
        .bind(pet_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            translate_constraint(e, "pet already exists", "invalid species or weight class")
        })?;
        row.as_ref()
            .map(row_to_pet)
            .transpose()?
            .ok_or_else(|| AppError::not_found("pet not found"))
    }

    async fn delete_pet(&self, pet_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM pets WHERE id = ?1")
            .bind(pet_id)
            .execute(&self.pool)
            .await
            .map_err(|e| translate_delete_restriction(e, "cannot delete pet with appointments"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("pet not found"));
        }
        Ok(())
    }

    // ================================
    // Service Configurations
    // ================================

    async fn create_configuration(
        &self,
        config: &NewServiceConfiguration,
    ) -> AppResult<ServiceConfiguration> {
        let row = sqlx::query(
            "INSERT INTO service_configurations \
               (species_id, service_id, weight_class_id, price, duration_minutes, is_active) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING *",
        )
        .bind(config.species_id)
        .bind(config.service_id)
        .bind(config.weight_class_id)
        .bind(config.price.to_string())
        .bind(config.duration_minutes)
        .bind(config.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            translate_constraint(
                e,
                "configuration already exists",
                "invalid species, service, or weight class",
            )
        })?;
        row_to_configuration(&row)
    }

    async fn get_configurations(&self) -> AppResult<Vec<ServiceConfiguration>> {
        let rows = sqlx::query(
            "SELECT * FROM service_configurations \
             ORDER BY species_id, service_id, weight_class_id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_configuration).collect()
    }

    async fn get_configurations_for_service(
        &self,
        service_id: i64,
    ) -> AppResult<Vec<ServiceConfiguration>> {
        let rows = sqlx::query(
            "SELECT * FROM service_configurations WHERE service_id = ?1 \
             ORDER BY species_id, weight_class_id",
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_configuration).collect()
    }

    async fn get_configuration(
        &self,
        species_id: i64,
        service_id: i64,
        weight_class_id: i64,
    ) -> AppResult<Option<ServiceConfiguration>> {
        let row = sqlx::query(
            "SELECT * FROM service_configurations \
             WHERE species_id = ?1 AND service_id = ?2 AND weight_class_id = ?3",
        )
        .bind(species_id)
        .bind(service_id)
        .bind(weight_class_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_configuration).transpose()
    }

    async fn update_configuration(
        &self,
        species_id: i64,
        service_id: i64,
        weight_class_id: i64,
        update: &ConfigurationUpdate,
    ) -> AppResult<ServiceConfiguration> {
        let row = sqlx::query(
            "UPDATE service_configurations SET \
                price = COALESCE(?1, price), \
                duration_minutes = COALESCE(?2, duration_minutes), \
                is_active = COALESCE(?3, is_active) \
             WHERE species_id = ?4 AND service_id = ?5 AND weight_class_id = ?6 \
             RETURNING *",
        )
        .bind(update.price.map(|p| p.to_string()))
        .bind(update.duration_minutes)
        .bind(update.is_active)
        .bind(species_id)
        .bind(service_id)
        .bind(weight_class_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref()
            .map(row_to_configuration)
            .transpose()?
            .ok_or_else(|| AppError::not_found("configuration not found"))
    }

    async fn delete_configuration(
        &self,
        species_id: i64,
        service_id: i64,
        weight_class_id: i64,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM service_configurations \
             WHERE species_id = ?1 AND service_id = ?2 AND weight_class_id = ?3",
        )
        .bind(species_id)
        .bind(service_id)
        .bind(weight_class_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("configuration not found"));
        }
        Ok(())
    }

    // ================================
    // Appointments
    // ================================

    async fn book_appointment(&self, request: &BookingRequest) -> AppResult<Appointment> {
        retry_transaction(|| self.try_book(request), WRITE_RETRIES).await
    }

    async fn get_appointment(&self, appointment_id: i64) -> AppResult<Option<Appointment>> {
        let row = sqlx::query("SELECT * FROM appointments WHERE id = ?1")
            .bind(appointment_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_appointment).transpose()
    }

    async fn get_appointments_for_pet(&self, pet_id: i64) -> AppResult<Vec<Appointment>> {
        let rows = sqlx::query(
            "SELECT * FROM appointments WHERE pet_id = ?1 ORDER BY start_time DESC",
        )
        .bind(pet_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_appointment).collect()
    }

    async fn cancel_appointment(&self, appointment_id: i64) -> AppResult<Appointment> {
        // Cancellation only ever removes a constraint footprint, so a single
        // update suffices; no overlap re-check is needed.
        let row = sqlx::query(
            "UPDATE appointments SET status = 'cancelled', updated_at = ?1 \
             WHERE id = ?2 RETURNING *",
        )
        .bind(fmt_time(&Utc::now()))
        .bind(appointment_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref()
            .map(row_to_appointment)
            .transpose()?
            .ok_or_else(|| AppError::not_found("appointment not found"))
    }

    async fn reschedule_appointment(
        &self,
        appointment_id: i64,
        new_start_time: DateTime<Utc>,
    ) -> AppResult<Appointment> {
        retry_transaction(
            || self.try_reschedule(appointment_id, new_start_time),
            WRITE_RETRIES,
        )
        .await
    }
}

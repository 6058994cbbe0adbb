// ABOUTME: Integration tests for the appointment booking engine
// ABOUTME: Covers the no-overlap invariant, snapshots, cancellation, and reschedule semantics
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use groomwise::database_plugins::{factory::Database, DatabaseProvider};
use groomwise::errors::ErrorCode;
use groomwise::models::{
    AppointmentStatus, BookingRequest, ConfigurationUpdate, NewPet, NewService,
    NewServiceConfiguration, NewUser,
};
use groomwise::test_utils::create_test_db;

struct Fixture {
    user_id: i64,
    pet_id: i64,
    service_id: i64,
    species_id: i64,
    weight_class_id: i64,
}

/// Seed a Dog/Small Wash world: price 40, duration 30 minutes
async fn seed(db: &Database) -> Fixture {
    let user = db
        .create_user(&NewUser {
            full_name: "Alice Example".into(),
            email: Some("alice@example.com".into()),
            phone: "555-0100".into(),
            description: None,
        })
        .await
        .unwrap();

    let species = db.create_species("Dog").await.unwrap();
    let weight_class = db.create_weight_class("Small").await.unwrap();
    let service = db
        .create_service(&NewService {
            name: "Wash".into(),
            base_price: Decimal::new(40, 0),
        })
        .await
        .unwrap();

    db.create_configuration(&NewServiceConfiguration {
        species_id: species.id,
        service_id: service.id,
        weight_class_id: weight_class.id,
        price: Decimal::new(40, 0),
        duration_minutes: 30,
        is_active: true,
    })
    .await
    .unwrap();

    let pet = db
        .create_pet(&NewPet {
            name: "Rex".into(),
            species_id: species.id,
            owner_id: user.id,
            weight_class_id: Some(weight_class.id),
        })
        .await
        .unwrap();

    Fixture {
        user_id: user.id,
        pet_id: pet.id,
        service_id: service.id,
        species_id: species.id,
        weight_class_id: weight_class.id,
    }
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, hour, minute, 0).unwrap()
}

fn booking(fixture: &Fixture, start: DateTime<Utc>) -> BookingRequest {
    BookingRequest {
        user_id: fixture.user_id,
        pet_id: fixture.pet_id,
        service_id: fixture.service_id,
        start_time: start,
        description: None,
    }
}

#[tokio::test]
async fn test_book_cancel_rebook_scenario() {
    let db = create_test_db().await.unwrap();
    let fixture = seed(&db).await;

    let first = db
        .book_appointment(&booking(&fixture, at(10, 0)))
        .await
        .unwrap();
    assert_eq!(first.start_time, at(10, 0));
    assert_eq!(first.end_time, at(10, 30));
    assert_eq!(first.price_snapshot, Decimal::new(40, 0));
    assert_eq!(first.duration_snapshot, 30);
    assert_eq!(first.status, AppointmentStatus::Booked);

    let overlap = db
        .book_appointment(&booking(&fixture, at(10, 15)))
        .await
        .unwrap_err();
    assert_eq!(overlap.code, ErrorCode::BookingConflict);
    assert_eq!(overlap.message, "appointment overlaps existing booking");

    let cancelled = db.cancel_appointment(first.id).await.unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    let rebooked = db
        .book_appointment(&booking(&fixture, at(10, 15)))
        .await
        .unwrap();
    assert_eq!(rebooked.end_time, at(10, 45));
}

#[tokio::test]
async fn test_touching_intervals_do_not_conflict() {
    let db = create_test_db().await.unwrap();
    let fixture = seed(&db).await;

    db.book_appointment(&booking(&fixture, at(10, 0)))
        .await
        .unwrap();

    // End is exclusive: a booking starting exactly at the previous end fits.
    let next = db
        .book_appointment(&booking(&fixture, at(10, 30)))
        .await
        .unwrap();
    assert_eq!(next.start_time, at(10, 30));
}

#[tokio::test]
async fn test_snapshots_survive_configuration_edits() {
    let db = create_test_db().await.unwrap();
    let fixture = seed(&db).await;

    let appointment = db
        .book_appointment(&booking(&fixture, at(9, 0)))
        .await
        .unwrap();

    db.update_configuration(
        fixture.species_id,
        fixture.service_id,
        fixture.weight_class_id,
        &ConfigurationUpdate {
            price: Some(Decimal::new(55, 0)),
            duration_minutes: Some(45),
            is_active: None,
        },
    )
    .await
    .unwrap();

    let reloaded = db.get_appointment(appointment.id).await.unwrap().unwrap();
    assert_eq!(reloaded.price_snapshot, Decimal::new(40, 0));
    assert_eq!(reloaded.duration_snapshot, 30);

    // New bookings pick up the edited configuration.
    let fresh = db
        .book_appointment(&booking(&fixture, at(12, 0)))
        .await
        .unwrap();
    assert_eq!(fresh.price_snapshot, Decimal::new(55, 0));
    assert_eq!(fresh.duration_snapshot, 45);
}

#[tokio::test]
async fn test_reschedule_preserves_duration_snapshot() {
    let db = create_test_db().await.unwrap();
    let fixture = seed(&db).await;

    let appointment = db
        .book_appointment(&booking(&fixture, at(9, 0)))
        .await
        .unwrap();

    db.update_configuration(
        fixture.species_id,
        fixture.service_id,
        fixture.weight_class_id,
        &ConfigurationUpdate {
            price: None,
            duration_minutes: Some(90),
            is_active: None,
        },
    )
    .await
    .unwrap();

    let moved = db
        .reschedule_appointment(appointment.id, at(14, 0))
        .await
        .unwrap();
    assert_eq!(moved.start_time, at(14, 0));
    assert_eq!(moved.end_time, at(14, 30));
    assert_eq!(moved.duration_snapshot, 30);
    assert_eq!(moved.status, AppointmentStatus::Booked);
}

#[tokio::test]
async fn test_reschedule_into_occupied_slot_conflicts() {
    let db = create_test_db().await.unwrap();
    let fixture = seed(&db).await;

    db.book_appointment(&booking(&fixture, at(10, 0)))
        .await
        .unwrap();
    let second = db
        .book_appointment(&booking(&fixture, at(11, 0)))
        .await
        .unwrap();

    let err = db
        .reschedule_appointment(second.id, at(10, 15))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BookingConflict);
    assert_eq!(err.message, "new time overlaps existing booking");

    // The failed reschedule left the appointment untouched.
    let unchanged = db.get_appointment(second.id).await.unwrap().unwrap();
    assert_eq!(unchanged.start_time, at(11, 0));
}

#[tokio::test]
async fn test_reschedule_onto_own_slot_is_allowed() {
    let db = create_test_db().await.unwrap();
    let fixture = seed(&db).await;

    let appointment = db
        .book_appointment(&booking(&fixture, at(10, 0)))
        .await
        .unwrap();

    // The appointment's own row never conflicts with itself.
    let moved = db
        .reschedule_appointment(appointment.id, at(10, 10))
        .await
        .unwrap();
    assert_eq!(moved.start_time, at(10, 10));
}

#[tokio::test]
async fn test_reschedule_revives_cancelled_appointment() {
    let db = create_test_db().await.unwrap();
    let fixture = seed(&db).await;

    let appointment = db
        .book_appointment(&booking(&fixture, at(10, 0)))
        .await
        .unwrap();
    db.cancel_appointment(appointment.id).await.unwrap();

    let revived = db
        .reschedule_appointment(appointment.id, at(16, 0))
        .await
        .unwrap();
    assert_eq!(revived.status, AppointmentStatus::Booked);
    assert_eq!(revived.start_time, at(16, 0));
}

#[tokio::test]
async fn test_concurrent_same_slot_bookings_conflict_exactly_once() {
    let db = create_test_db().await.unwrap();
    let fixture = seed(&db).await;

    let request = booking(&fixture, at(10, 0));
    let (a, b) = tokio::join!(db.book_appointment(&request), db.book_appointment(&request));

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one booking must win the slot");

    let loser = if a.is_err() { a } else { b };
    assert_eq!(loser.unwrap_err().code, ErrorCode::BookingConflict);

    let appointments = db.get_appointments_for_pet(fixture.pet_id).await.unwrap();
    assert_eq!(appointments.len(), 1);
}

#[tokio::test]
async fn test_booking_unknown_pet_is_not_found() {
    let db = create_test_db().await.unwrap();
    let fixture = seed(&db).await;

    let mut request = booking(&fixture, at(10, 0));
    request.pet_id = 9999;
    let err = db.book_appointment(&request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    assert_eq!(err.message, "pet not found");
}

#[tokio::test]
async fn test_booking_without_configuration_is_not_found() {
    let db = create_test_db().await.unwrap();
    let fixture = seed(&db).await;

    // A pet with no weight class has no configuration key.
    let stray = db
        .create_pet(&NewPet {
            name: "Mystery".into(),
            species_id: fixture.species_id,
            owner_id: fixture.user_id,
            weight_class_id: None,
        })
        .await
        .unwrap();

    let mut request = booking(&fixture, at(10, 0));
    request.pet_id = stray.id;
    let err = db.book_appointment(&request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    assert_eq!(err.message, "service configuration not found");
}

#[tokio::test]
async fn test_inactive_configuration_blocks_booking() {
    let db = create_test_db().await.unwrap();
    let fixture = seed(&db).await;

    db.update_configuration(
        fixture.species_id,
        fixture.service_id,
        fixture.weight_class_id,
        &ConfigurationUpdate {
            price: None,
            duration_minutes: None,
            is_active: Some(false),
        },
    )
    .await
    .unwrap();

    let err = db
        .book_appointment(&booking(&fixture, at(10, 0)))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    assert_eq!(err.message, "service configuration not found");
}

#[tokio::test]
async fn test_different_pets_share_a_slot() {
    let db = create_test_db().await.unwrap();
    let fixture = seed(&db).await;

    let other = db
        .create_pet(&NewPet {
            name: "Bella".into(),
            species_id: fixture.species_id,
            owner_id: fixture.user_id,
            weight_class_id: Some(fixture.weight_class_id),
        })
        .await
        .unwrap();

    db.book_appointment(&booking(&fixture, at(10, 0)))
        .await
        .unwrap();

    let mut request = booking(&fixture, at(10, 0));
    request.pet_id = other.id;
    db.book_appointment(&request).await.unwrap();
}

#[tokio::test]
async fn test_cancel_unknown_appointment_is_not_found() {
    let db = create_test_db().await.unwrap();
    seed(&db).await;

    let err = db.cancel_appointment(42).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    assert_eq!(err.message, "appointment not found");
}

#[tokio::test]
async fn test_bookings_persist_across_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}/groomwise.db", dir.path().display());

    let appointment_id = {
        let db = Database::new(&url).await.unwrap();
        let fixture = seed(&db).await;
        db.book_appointment(&booking(&fixture, at(10, 0)))
            .await
            .unwrap()
            .id
    };

    let db = Database::new(&url).await.unwrap();
    let appointment = db.get_appointment(appointment_id).await.unwrap().unwrap();
    assert_eq!(appointment.start_time, at(10, 0));
    assert_eq!(appointment.price_snapshot, Decimal::new(40, 0));
}

#[tokio::test]
async fn test_invalid_ids_rejected_before_io() {
    let db = create_test_db().await.unwrap();
    let fixture = seed(&db).await;

    let mut request = booking(&fixture, at(10, 0));
    request.pet_id = 0;
    let err = db.book_appointment(&request).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = db.get_appointment(-1).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

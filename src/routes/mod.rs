// ABOUTME: HTTP route modules for the grooming scheduling backend
// ABOUTME: Each module exposes a struct with a routes() constructor taking shared server resources
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

pub mod appointments;
pub mod health;
pub mod pets;
pub mod service_configurations;
pub mod services;
pub mod species;
pub mod users;
pub mod weight_classes;

pub use appointments::AppointmentRoutes;
pub use health::HealthRoutes;
pub use pets::PetRoutes;
pub use service_configurations::ServiceConfigurationRoutes;
pub use services::ServiceRoutes;
pub use species::SpeciesRoutes;
pub use users::UserRoutes;
pub use weight_classes::WeightClassRoutes;

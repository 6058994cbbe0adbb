// ABOUTME: Library crate for the groomwise pet grooming scheduling backend
// ABOUTME: Exposes the scheduling engine, database plugins, and HTTP server assembly
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Groomwise
//!
//! Scheduling backend for a pet grooming salon. The core guarantee is that
//! no two non-cancelled appointments for the same pet ever overlap in time,
//! enforced transactionally in the storage layer. Pricing and duration are
//! resolved from per-(species, service, weight class) configurations at
//! booking time and frozen into the appointment as snapshots.
//!
//! Supports SQLite (default) and PostgreSQL (`postgresql` feature) through
//! the plugin architecture in [`database_plugins`].

pub mod config;
pub mod database_plugins;
pub mod errors;
pub mod logging;
pub mod models;
pub mod routes;
pub mod scheduling;
pub mod server;
pub mod test_utils;

// ABOUTME: Shared helpers for integration and unit tests
// ABOUTME: Provides in-memory database construction so tests need no external services
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use crate::database_plugins::{factory::Database, DatabaseProvider};
use crate::errors::AppResult;

/// Create a fresh in-memory database with migrations applied
pub async fn create_test_db() -> AppResult<Database> {
    Database::new("sqlite::memory:").await
}

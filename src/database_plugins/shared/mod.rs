// ABOUTME: Helpers shared by the SQLite and PostgreSQL backends
// ABOUTME: Currently transaction retry logic for transient storage failures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

pub mod transactions;

// ABOUTME: Configuration module aggregating environment-based settings
// ABOUTME: Re-exports ServerConfig and related types
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Configuration management

pub mod environment;

pub use environment::{DatabaseConfig, Environment, LogLevel, ServerConfig};

// ABOUTME: Structured logging setup for observability and debugging
// ABOUTME: Configures tracing-subscriber with env-filter and json/pretty output
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Production-ready logging configuration with structured output

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Environment, LogLevel};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Production
/// environments emit JSON lines; everything else gets human-readable output.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init(level: &LogLevel, environment: &Environment) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    if environment.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;
    }

    Ok(())
}

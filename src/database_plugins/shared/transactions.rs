// ABOUTME: Transaction retry with exponential backoff for transient storage failures
// ABOUTME: Covers SQLite busy/locked errors and PostgreSQL deadlocks
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Transaction retry for transient storage failures
//!
//! Booking and reschedule transactions take write locks; under contention
//! SQLite reports `database is locked` and PostgreSQL can detect deadlocks.
//! Both are transient: the transaction that lost simply runs again.
//! Constraint violations are never retried; a booking conflict stays a
//! conflict no matter how often it is replayed.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, warn};

use crate::errors::{AppResult, ErrorCode};

/// Retry a transactional operation if it fails for a transient reason.
///
/// Exponential backoff: 10ms, 20ms, 40ms, ... per attempt.
///
/// # Errors
///
/// Returns the last error once `max_retries` is exhausted, or immediately
/// for non-retryable errors.
pub async fn retry_transaction<F, Fut, T>(mut f: F, max_retries: u32) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempts = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if attempts >= max_retries {
                    error!(
                        attempts,
                        max_retries,
                        error = %e,
                        "transaction failed after max retries"
                    );
                    return Err(e);
                }

                if is_retryable(&e.code, &e.message) {
                    let backoff_ms = 10 * (1 << attempts);
                    warn!(
                        attempt = attempts,
                        backoff_ms,
                        error = %e,
                        "transaction hit transient failure, retrying after backoff"
                    );
                    sleep(Duration::from_millis(backoff_ms)).await;
                } else {
                    return Err(e);
                }
            }
        }
    }
}

/// Transient failures may succeed on retry: lock contention, deadlocks,
/// serialization failures, timeouts. Conflicts, validation errors, and
/// missing rows are deterministic and propagate immediately.
fn is_retryable(code: &ErrorCode, message: &str) -> bool {
    if *code != ErrorCode::DatabaseError {
        return false;
    }

    let lower = message.to_lowercase();
    lower.contains("database is locked")
        || lower.contains("busy")
        || lower.contains("deadlock")
        || lower.contains("could not serialize")
        || lower.contains("timed out")
        || lower.contains("timeout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retries_locked_database() {
        let calls = AtomicU32::new(0);
        let result = retry_transaction(
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(AppError::database("database is locked"))
                } else {
                    Ok(42)
                }
            },
            5,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_conflict_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = retry_transaction(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::booking_conflict(
                    "appointment overlaps existing booking",
                ))
            },
            5,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = retry_transaction(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::database("database is locked"))
            },
            3,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}

//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database
//! operations. Methods are organized across submodules by domain:
//! - `players.rs` - player record reads, inserts and CAS updates
//! - `referrals.rs` - referral ledger operations
//! - `tasks.rs` - task catalog and per-player instances

mod players;
mod referrals;
mod tasks;

use crate::domain::Amount;
use sqlx::sqlite::SqlitePool;
use std::str::FromStr;
use tracing::warn;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }
}

/// Parse a stored canonical amount, logging and defaulting to 0 on
/// corruption rather than failing the whole read.
pub(crate) fn parse_amount(column: &str, raw: &str) -> Amount {
    Amount::from_str(raw).unwrap_or_else(|e| {
        warn!(
            column = column,
            value = raw,
            error = %e,
            "Failed to parse stored amount, using 0"
        );
        Amount::zero()
    })
}

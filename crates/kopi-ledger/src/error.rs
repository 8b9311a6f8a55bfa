//! # Ledger Error Types
//!
//! Error types for local ledger operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LedgerError (this module) ← Adds context and categorization           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SyncError / host application ← Decides retry vs. surface              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Loud Failure Policy
//! [`LedgerError::StorageUnavailable`] is the one error that must never be
//! swallowed: a POS without its local store cannot take orders, and limping
//! along silently would lose sales. Hosts should treat it as fatal at
//! startup and as a prominent operator alert at runtime.

use thiserror::Error;

use kopi_core::ValidationError;

/// Local ledger operation errors.
///
/// Wraps sqlx errors with categories the callers actually branch on.
/// Absence of a record is NOT an error for reads; those return `Option`.
/// `NotFound` is reserved for operations that require the record to exist.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The local store cannot be opened or has gone away.
    ///
    /// ## When This Occurs
    /// - Database file cannot be created (permissions, disk full)
    /// - Pool closed mid-operation
    /// - I/O error from the storage layer
    #[error("Local store unavailable: {0}")]
    StorageUnavailable(String),

    /// A record failed validation and was not persisted.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An operation that requires an existing record did not find it.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A multi-statement transaction could not be committed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Merge requested with no surviving source holds.
    #[error("Merge requires at least one existing hold order")]
    EmptyMerge,

    /// Split groups do not partition the original hold's items.
    #[error("Split groups do not partition the hold: {0}")]
    SplitMismatch(String),

    /// A stored payload could not be decoded (corrupt hold items JSON).
    #[error("Corrupt stored record: {0}")]
    CorruptRecord(String),

    /// Internal ledger error.
    #[error("Internal ledger error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        LedgerError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Convert sqlx errors to LedgerError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → LedgerError::NotFound
/// sqlx::Error::Database       → LedgerError::QueryFailed
/// sqlx::Error::PoolTimedOut   → LedgerError::PoolExhausted
/// sqlx::Error::PoolClosed/Io  → LedgerError::StorageUnavailable
/// Other                       → LedgerError::Internal
/// ```
impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => LedgerError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => LedgerError::QueryFailed(db_err.message().to_string()),

            sqlx::Error::PoolTimedOut => LedgerError::PoolExhausted,

            sqlx::Error::PoolClosed => {
                LedgerError::StorageUnavailable("Pool is closed".to_string())
            }

            sqlx::Error::Io(io_err) => LedgerError::StorageUnavailable(io_err.to_string()),

            _ => LedgerError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for LedgerError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        LedgerError::MigrationFailed(err.to_string())
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_maps_to_exhausted() {
        let err: LedgerError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, LedgerError::PoolExhausted));
    }

    #[test]
    fn test_pool_closed_maps_to_storage_unavailable() {
        let err: LedgerError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, LedgerError::StorageUnavailable(_)));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: LedgerError = ValidationError::Empty {
            field: "items".to_string(),
        }
        .into();
        assert!(matches!(err, LedgerError::Validation(_)));
    }
}

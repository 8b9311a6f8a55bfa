//! # Sync Error Types
//!
//! Error types for sync operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │      Ledger             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  TransportFailed│  │  Ledger (wrapped)       │ │
//! │  │                 │  │  PushRejected   │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  A failed push is never fatal to the engine: the order keeps its        │
//! │  unsynced flag and the next cycle retries it.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use kopi_ledger::LedgerError;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering engine and transport failures.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// The transport could not reach the remote store.
    #[error("Transport failed: {0}")]
    TransportFailed(String),

    /// The remote store answered but refused the order.
    #[error("Push rejected for order {order_id}: {reason}")]
    PushRejected { order_id: String, reason: String },

    /// Local ledger failure during a sync operation.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Failed to serialize a payload for the wire.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Engine is shutting down.
    #[error("Sync engine is shutting down")]
    ShuttingDown,
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl SyncError {
    /// Returns true if the operation should be retried on a later cycle.
    ///
    /// ## Retryable
    /// - Transport failures (network blips, server down)
    /// - Rejections (the remote may accept after its own recovery; the
    ///   order stays local either way, so retrying is free)
    ///
    /// ## Non-Retryable
    /// - Configuration errors
    /// - Serialization failures (same payload will fail the same way)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::TransportFailed(_)
                | SyncError::PushRejected { .. }
                | SyncError::Ledger(LedgerError::PoolExhausted)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(SyncError::TransportFailed("timeout".into()).is_retryable());
        assert!(SyncError::PushRejected {
            order_id: "order-1".into(),
            reason: "server busy".into()
        }
        .is_retryable());

        assert!(!SyncError::InvalidConfig("bad interval".into()).is_retryable());
        assert!(!SyncError::SerializationFailed("bad payload".into()).is_retryable());
    }

    #[test]
    fn test_ledger_error_wraps() {
        let err: SyncError = LedgerError::PoolExhausted.into();
        assert!(matches!(err, SyncError::Ledger(_)));
    }
}

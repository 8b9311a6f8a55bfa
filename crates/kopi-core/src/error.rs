//! # Error Types
//!
//! Domain-specific error types for kopi-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kopi-core errors (this file)                                           │
//! │  ├── CoreError        - General domain errors                           │
//! │  └── ValidationError  - Record/input validation failures                │
//! │                                                                         │
//! │  kopi-ledger errors (separate crate)                                    │
//! │  └── LedgerError      - Local store failures                            │
//! │                                                                         │
//! │  kopi-sync errors (separate crate)                                      │
//! │  └── SyncError        - Transport / reconciliation failures             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → SyncError → caller   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Absence of a record is NOT an error anywhere in this subsystem —
//!    reads return `Option`

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations in the cart/checkout layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout attempted on an empty cart. A cart becomes an order only
    /// with at least one line item.
    #[error("Cannot checkout an empty cart")]
    EmptyCart,

    /// Amount tendered does not cover the total.
    #[error("Insufficient payment: total {total}, paid {paid}")]
    InsufficientPayment { total: i64, paid: i64 },

    /// Cart line not found for a mutation.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Record/input validation errors.
///
/// A record failing these is never persisted; batch operations (cloud
/// upsert) skip-and-log instead of aborting.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (bad timestamp, malformed payload field).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the closed enumeration.
    #[error("{field} '{value}' is not one of {allowed:?}")]
    NotAllowed {
        field: String,
        value: String,
        allowed: &'static [&'static str],
    },

    /// A collection that must not be empty is empty.
    #[error("{field} must not be empty")]
    Empty { field: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientPayment {
            total: 50000,
            paid: 40000,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient payment: total 50000, paid 40000"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "id".to_string(),
        };
        assert_eq!(err.to_string(), "id is required");

        let err = ValidationError::NotAllowed {
            field: "paymentMethod".to_string(),
            value: "VISA".to_string(),
            allowed: &["CASH", "DANA", "BCA", "QRIS"],
        };
        assert!(err.to_string().contains("VISA"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Empty {
            field: "items".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

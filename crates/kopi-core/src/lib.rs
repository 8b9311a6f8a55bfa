//! # kopi-core: Pure Business Logic for Kopi POS
//!
//! This crate is the **heart** of the Kopi POS order subsystem. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kopi POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                UI / Route Handlers (out of scope)               │   │
//! │  │   Catalog ──► Cart UI ──► Hold list ──► Checkout ──► Receipt    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kopi-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   cart    │  │  receipt  │  │ validation│   │   │
//! │  │   │  Order    │  │   Cart    │  │ Snapshot  │  │   rules   │   │   │
//! │  │   │ HoldOrder │  │ CartState │  │ Checkout  │  │  checks   │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  kopi-ledger (Local Ledger Store)                │   │
//! │  │           SQLite queries, migrations, hold-order manager         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, OrderItem, HoldOrder, enums)
//! - [`cart`] - Editable cart + hold-order bridge
//! - [`receipt`] - Checkout finalization and receipt snapshots
//! - [`validation`] - Record-level validation rules
//! - [`error`] - Domain error types
//! - [`id`] - Offline-safe id generation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all amounts are whole Rupiah (i64), no floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod id;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kopi_core::Order` instead of
// `use kopi_core::types::Order`

pub use cart::{Cart, CartState};
pub use error::{CoreError, CoreResult, ValidationError, ValidationResult};
pub use id::new_id;
pub use receipt::{Checkout, CheckoutRequest, ReceiptSnapshot};
pub use types::*;
pub use validation::{validate_hold_order, validate_order};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Id prefix for finalized orders.
pub const ORDER_ID_PREFIX: &str = "order";

/// Id prefix for hold (parked) orders.
pub const HOLD_ID_PREFIX: &str = "hold";

/// Id prefix synthesized for remote items that arrived without one.
/// Full form: `item-legacy-{index}`.
pub const LEGACY_ITEM_ID_PREFIX: &str = "item-legacy";

//! # kopi-ledger: Local Ledger Store for Kopi POS
//!
//! Device-local SQLite persistence for orders and hold orders, plus the
//! hold-order manager and the remote-record normalization boundary.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kopi POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   kopi-core (pure domain)                        │   │
//! │  │            Order, HoldOrder, Cart, validation                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ kopi-ledger (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌────────────┐ ┌───────────┐ ┌──────────────┐   │   │
//! │  │   │   pool   │ │ repository │ │ normalize │ │ hold_manager │   │   │
//! │  │   │  Ledger  │ │ orders     │ │ remote →  │ │ park/resume  │   │   │
//! │  │   │  config  │ │ holds      │ │ strict    │ │ merge/split  │   │   │
//! │  │   └──────────┘ └────────────┘ └───────────┘ └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   SQLite · WAL · embedded migrations · transactional writes     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  kopi-sync (Cloud Sync Engine)                   │   │
//! │  │          scans unsynced orders, pushes, flips flags              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Durability Rules
//!
//! 1. **Local first**: an order is durable here before any sync attempt
//! 2. **Loud failure**: a broken local store is fatal, never silent
//! 3. **Atomic sets**: orders+items, merge, split each commit in one
//!    transaction
//! 4. **Monotonic sync flag**: `is_synced` can only go false → true

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod hold_manager;
pub mod migrations;
pub mod normalize;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{LedgerError, LedgerResult};
pub use hold_manager::HoldOrderManager;
pub use pool::{Ledger, LedgerConfig};
pub use repository::{HoldRepository, OrderRepository, UpsertReport};

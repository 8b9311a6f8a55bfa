//! # kopi-sync: Cloud Sync Engine for Kopi POS
//!
//! Background reconciliation between the local ledger and the cloud store,
//! built for offline-first operation: the ledger is always the source of
//! truth for this terminal, and sync is a best-effort drain of whatever
//! connectivity allows.
//!
//! ## Sync Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Sync Model                                     │
//! │                                                                         │
//! │   LOCAL LEDGER                                 CLOUD STORE              │
//! │   ┌──────────────────┐                        ┌──────────────────┐     │
//! │   │ orders           │      push (per order)  │                  │     │
//! │   │  is_synced = 0 ──┼──────────────────────► │  accepted        │     │
//! │   │  is_synced = 1 ◄─┼── ack flips the flag   │                  │     │
//! │   │                  │                        │                  │     │
//! │   │  upsert        ◄─┼── remote batch (pull   │  other terminals'│     │
//! │   │  (normalized,    │    handled by host)    │  orders          │     │
//! │   │   synced = 1)    │                        │                  │     │
//! │   └──────────────────┘                        └──────────────────┘     │
//! │                                                                         │
//! │   RULES                                                                 │
//! │   • An order is durable locally BEFORE any push is attempted            │
//! │   • Pushes are sequential, oldest first, one pass at a time             │
//! │   • A failed push = log + retry next cycle; never blocks the rest       │
//! │   • is_synced is monotonic: once acknowledged, never un-acknowledged    │
//! │   • Remote records are normalized and validated before touching the     │
//! │     ledger; malformed ones are skipped and logged                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`engine`] - The `SyncEngine` loop, its handle, status, and events
//! - [`transport`] - The `OrderTransport` trait (the wire seam)
//! - [`config`] - Engine tunables
//! - [`error`] - Sync error types with retry categorization
//!
//! ## Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use kopi_ledger::{Ledger, LedgerConfig};
//! use kopi_sync::{SyncConfig, SyncEngine};
//!
//! let ledger = Ledger::new(LedgerConfig::new("./kopi.db")).await?;
//! let transport = Arc::new(MyHttpTransport::new(api_base));
//!
//! let (engine, handle) = SyncEngine::new(SyncConfig::default(), &ledger, transport)?;
//! tokio::spawn(engine.run());
//!
//! // Wire connectivity callbacks and UI actions to the handle
//! handle.set_online().await;
//! let status = handle.status().await;
//! println!("pending: {}", status.pending_count);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod transport;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::SyncConfig;
pub use engine::{
    ConnectivityEvent, NoOpEmitter, PushSummary, SyncEngine, SyncEngineHandle, SyncEventEmitter,
    SyncStatus,
};
pub use error::{SyncError, SyncResult};
pub use transport::OrderTransport;

//! # Repository Module
//!
//! Repository pattern implementations for ledger access.
//!
//! ## Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Repository Pattern                                  │
//! │                                                                         │
//! │  Caller (checkout, hold manager, sync engine)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Repository (this module) ← Typed methods, owns the SQL                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqlitePool ← Raw connection management                                 │
//! │                                                                         │
//! │  Rules:                                                                 │
//! │  • SQL strings live ONLY in repositories                                │
//! │  • Every write validates before touching the pool                      │
//! │  • Reads return Option / Vec, never NotFound errors                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod hold;
pub mod order;

pub use hold::HoldRepository;
pub use order::{OrderRepository, UpsertReport};

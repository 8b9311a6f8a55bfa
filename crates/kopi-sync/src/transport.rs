//! # Order Transport
//!
//! The seam between the sync engine and the actual wire.
//!
//! The engine owns WHEN to push and what happens to the local flag; a
//! transport owns HOW one order travels. Production wires in an HTTP or
//! vendor-SDK client; tests wire in a mock that records calls and fails on
//! command.

use async_trait::async_trait;

use kopi_core::Order;

use crate::error::SyncResult;

/// Pushes single orders to the remote store.
///
/// ## Contract
/// - `Ok(())` means the remote store has durably accepted the order; the
///   engine will flip the local `is_synced` flag on this signal and never
///   push the order again. Do NOT return `Ok` for a queued-but-unconfirmed
///   send.
/// - Any `Err` leaves the order unsynced; the engine logs it and retries
///   on a later cycle.
/// - Pushes are sequential: the engine never calls this concurrently for
///   the same pass.
#[async_trait]
pub trait OrderTransport: Send + Sync {
    /// Pushes one order to the remote store.
    async fn push_order(&self, order: &Order) -> SyncResult<()>;

    /// Pushes a batch sequentially, stopping at the first failure.
    ///
    /// Transports with a real bulk endpoint can override this; the default
    /// just drains through [`push_order`](Self::push_order).
    async fn push_orders(&self, orders: &[Order]) -> SyncResult<()> {
        for order in orders {
            self.push_order(order).await?;
        }
        Ok(())
    }
}

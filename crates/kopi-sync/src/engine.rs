//! # Sync Engine
//!
//! Background reconciliation loop between the local ledger and the cloud.
//!
//! ## Engine Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SyncEngine Architecture                          │
//! │                                                                         │
//! │  Host application                                                       │
//! │       │  SyncEngine::new(config, ledger, transport)                     │
//! │       ▼                                                                 │
//! │  (SyncEngine, SyncEngineHandle)                                         │
//! │       │                 │                                               │
//! │       │ tokio::spawn    │ kept by the host                              │
//! │       ▼                 ▼                                               │
//! │  ┌───────────────┐  ┌──────────────────────────────────────────────┐   │
//! │  │  run() loop   │  │  SyncEngineHandle                            │   │
//! │  │               │  │                                              │   │
//! │  │ interval tick │  │  set_online()/set_offline()  connectivity    │   │
//! │  │ connectivity  │  │  sync_now()                  manual pass     │   │
//! │  │ shutdown      │  │  apply_remote_batch()        cloud → ledger  │   │
//! │  │               │  │  status()                    for the UI      │   │
//! │  └───────┬───────┘  └──────────────┬───────────────────────────────┘   │
//! │          │                         │                                    │
//! │          └────────► push pass ◄────┘   (single-flight via try_lock)     │
//! │                        │                                                │
//! │          get_unsynced ─┴─► push ─► ack ─► mark_synced, one by one       │
//! │                                                                         │
//! │  FAILURE RULE: a failed push logs, leaves the flag alone, and the       │
//! │  pass continues with the next order. Retry is simply the next cycle.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use kopi_ledger::repository::UpsertReport;
use kopi_ledger::{Ledger, OrderRepository};

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::transport::OrderTransport;

// =============================================================================
// Sync Status
// =============================================================================

/// Current sync status for external queries (status bar, diagnostics).
#[derive(Debug, Clone, Default)]
pub struct SyncStatus {
    /// Whether the host has reported connectivity.
    pub is_online: bool,

    /// Whether a push pass is running right now.
    pub is_syncing: bool,

    /// Number of orders still awaiting cloud acknowledgement.
    pub pending_count: i64,

    /// Last fully clean push pass (ISO-8601), if any.
    pub last_sync: Option<String>,

    /// Last push or reconciliation error message, if any.
    pub last_error: Option<String>,
}

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Trait for emitting sync events (implemented by the host UI layer).
pub trait SyncEventEmitter: Send + Sync {
    /// Emits a sync status change event.
    fn emit_status(&self, status: &SyncStatus);

    /// Emits a push progress event.
    fn emit_progress(&self, pending: i64, pushed: i64);

    /// Emits a sync error event.
    fn emit_error(&self, message: &str, retryable: bool);
}

/// No-op event emitter for headless use and testing.
pub struct NoOpEmitter;

impl SyncEventEmitter for NoOpEmitter {
    fn emit_status(&self, _status: &SyncStatus) {}
    fn emit_progress(&self, _pending: i64, _pushed: i64) {}
    fn emit_error(&self, _message: &str, _retryable: bool) {}
}

// =============================================================================
// Connectivity Events
// =============================================================================

/// Connectivity transitions reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    /// Network is up; the engine pushes immediately, then per interval.
    Online,
    /// Network is down; push passes pause, orders keep accumulating.
    Offline,
}

// =============================================================================
// Push Summary
// =============================================================================

/// Outcome of one push pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushSummary {
    /// Orders acknowledged and flagged this pass.
    pub pushed: usize,
    /// Orders that failed and will be retried next cycle.
    pub failed: usize,
    /// Orders still pending after the pass.
    pub remaining: i64,
}

// =============================================================================
// Engine Core (shared between loop and handle)
// =============================================================================

struct EngineCore {
    orders: OrderRepository,
    transport: Arc<dyn OrderTransport>,
    status: Arc<RwLock<SyncStatus>>,
    emitter: Arc<dyn SyncEventEmitter>,

    /// Single-flight guard: a pass started from the interval and one
    /// started from `sync_now` must never interleave their pushes.
    pass_gate: Mutex<()>,
}

impl EngineCore {
    async fn is_online(&self) -> bool {
        self.status.read().await.is_online
    }

    async fn set_connectivity(&self, online: bool) {
        let snapshot = {
            let mut status = self.status.write().await;
            status.is_online = online;
            status.clone()
        };
        info!(online, "Connectivity changed");
        self.emitter.emit_status(&snapshot);
    }

    /// Runs one push pass: scan unsynced orders oldest-first, push each,
    /// flip the flag on ack, carry on past failures.
    ///
    /// Returns `None` when skipped (offline, or another pass holds the
    /// gate).
    async fn push_pass(&self) -> SyncResult<Option<PushSummary>> {
        if !self.is_online().await {
            debug!("Push pass skipped, offline");
            return Ok(None);
        }

        let _gate = match self.pass_gate.try_lock() {
            Ok(gate) => gate,
            Err(_) => {
                debug!("Push pass skipped, another pass is running");
                return Ok(None);
            }
        };

        {
            let mut status = self.status.write().await;
            status.is_syncing = true;
        }

        let pending = self.orders.get_unsynced().await?;
        debug!(pending = pending.len(), "Push pass started");

        let mut summary = PushSummary::default();
        let mut last_error = None;

        for order in &pending {
            // TODO: bound each push with tokio::time::timeout once the
            // production HTTP transport lands; a hung request currently
            // stalls the whole pass.
            match self.transport.push_order(order).await {
                Ok(()) => {
                    self.orders.mark_synced(&order.id).await?;
                    summary.pushed += 1;
                    debug!(order_id = %order.id, "Order acknowledged");
                }
                Err(err) => {
                    warn!(
                        order_id = %order.id,
                        %err,
                        "Push failed, will retry next cycle"
                    );
                    self.emitter.emit_error(&err.to_string(), err.is_retryable());
                    last_error = Some(err.to_string());
                    summary.failed += 1;
                }
            }
        }

        summary.remaining = self.orders.count_unsynced().await?;

        let snapshot = {
            let mut status = self.status.write().await;
            status.is_syncing = false;
            status.pending_count = summary.remaining;
            if summary.failed == 0 {
                status.last_sync = Some(Utc::now().to_rfc3339());
            }
            if let Some(message) = last_error {
                status.last_error = Some(message);
            }
            status.clone()
        };

        self.emitter.emit_status(&snapshot);
        self.emitter
            .emit_progress(summary.remaining, summary.pushed as i64);

        if summary.pushed > 0 || summary.failed > 0 {
            info!(
                pushed = summary.pushed,
                failed = summary.failed,
                remaining = summary.remaining,
                "Push pass done"
            );
        }
        Ok(Some(summary))
    }

    /// Reconciles a batch of remote records into the ledger and refreshes
    /// the pending count.
    async fn apply_remote_batch(&self, records: &[serde_json::Value]) -> SyncResult<UpsertReport> {
        let report = self.orders.upsert_from_cloud(records).await?;

        let snapshot = {
            let mut status = self.status.write().await;
            status.pending_count = self.orders.count_unsynced().await?;
            if report.skipped > 0 {
                status.last_error = Some(format!(
                    "{} remote records skipped as malformed",
                    report.skipped
                ));
            }
            status.clone()
        };
        self.emitter.emit_status(&snapshot);

        info!(
            applied = report.applied,
            skipped = report.skipped,
            "Remote batch reconciled"
        );
        Ok(report)
    }
}

// =============================================================================
// Sync Engine
// =============================================================================

/// The background sync loop. Create with [`SyncEngine::new`], then hand
/// `run()` to `tokio::spawn` and keep the [`SyncEngineHandle`].
pub struct SyncEngine {
    core: Arc<EngineCore>,
    config: SyncConfig,
    connectivity_rx: mpsc::Receiver<ConnectivityEvent>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl SyncEngine {
    /// Creates an engine over the given ledger and transport, with no
    /// event emitter.
    pub fn new(
        config: SyncConfig,
        ledger: &Ledger,
        transport: Arc<dyn OrderTransport>,
    ) -> SyncResult<(SyncEngine, SyncEngineHandle)> {
        Self::with_emitter(config, ledger, transport, Arc::new(NoOpEmitter))
    }

    /// Creates an engine with a custom event emitter.
    pub fn with_emitter(
        config: SyncConfig,
        ledger: &Ledger,
        transport: Arc<dyn OrderTransport>,
        emitter: Arc<dyn SyncEventEmitter>,
    ) -> SyncResult<(SyncEngine, SyncEngineHandle)> {
        config.validate()?;

        let status = Arc::new(RwLock::new(SyncStatus {
            is_online: config.start_online,
            ..Default::default()
        }));

        let core = Arc::new(EngineCore {
            orders: ledger.orders(),
            transport,
            status,
            emitter,
            pass_gate: Mutex::new(()),
        });

        let (connectivity_tx, connectivity_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let engine = SyncEngine {
            core: core.clone(),
            config,
            connectivity_rx,
            shutdown_rx,
        };
        let handle = SyncEngineHandle {
            core,
            connectivity_tx,
            shutdown_tx,
        };

        Ok((engine, handle))
    }

    /// Runs the engine until shutdown (or until the handle is dropped).
    ///
    /// The interval ticks immediately on start, so an online engine with
    /// a backlog begins pushing right away rather than waiting a full
    /// interval.
    pub async fn run(mut self) {
        info!(interval = ?self.config.push_interval, "Sync engine running");

        let mut ticker = tokio::time::interval(self.config.push_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.core.push_pass().await {
                        warn!(%err, "Push pass failed");
                    }
                }

                event = self.connectivity_rx.recv() => {
                    match event {
                        Some(ConnectivityEvent::Online) => {
                            // State was already flipped by the handle; the
                            // event exists to trigger the immediate pass.
                            if let Err(err) = self.core.push_pass().await {
                                warn!(%err, "Reconnect push pass failed");
                            }
                        }
                        Some(ConnectivityEvent::Offline) => {
                            debug!("Engine paused, offline");
                        }
                        None => {
                            info!("Sync engine handle dropped, stopping");
                            break;
                        }
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Sync engine received shutdown");
                    break;
                }
            }
        }

        info!("Sync engine stopped");
    }
}

// =============================================================================
// Engine Handle (for external control)
// =============================================================================

/// Handle for controlling a running [`SyncEngine`].
///
/// Cheap to clone; the host keeps one and wires UI actions to it.
#[derive(Clone)]
pub struct SyncEngineHandle {
    core: Arc<EngineCore>,
    connectivity_tx: mpsc::Sender<ConnectivityEvent>,
    shutdown_tx: mpsc::Sender<()>,
}

impl SyncEngineHandle {
    /// Returns the current sync status.
    pub async fn status(&self) -> SyncStatus {
        self.core.status.read().await.clone()
    }

    /// Reports that connectivity is available. The running engine reacts
    /// with an immediate push pass, then resumes its interval.
    pub async fn set_online(&self) {
        self.core.set_connectivity(true).await;
        let _ = self.connectivity_tx.send(ConnectivityEvent::Online).await;
    }

    /// Reports that connectivity is gone. Push passes pause; orders keep
    /// accumulating locally.
    pub async fn set_offline(&self) {
        self.core.set_connectivity(false).await;
        let _ = self.connectivity_tx.send(ConnectivityEvent::Offline).await;
    }

    /// Runs a push pass right now (the "Sync now" button).
    ///
    /// Returns `None` when skipped because the engine is offline or a
    /// pass is already in flight.
    pub async fn sync_now(&self) -> SyncResult<Option<PushSummary>> {
        self.core.push_pass().await
    }

    /// Reconciles a batch of remote order records into the local ledger.
    ///
    /// Malformed records are skipped and counted in the report; valid
    /// ones land with `is_synced` forced true.
    pub async fn apply_remote_batch(
        &self,
        records: &[serde_json::Value],
    ) -> SyncResult<UpsertReport> {
        self.core.apply_remote_batch(records).await
    }

    /// Signals the engine to shut down gracefully.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

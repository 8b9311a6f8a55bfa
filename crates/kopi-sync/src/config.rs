//! # Sync Configuration
//!
//! Tunables for the sync engine. Kept deliberately small: the engine has
//! one job (push unsynced orders, accept remote batches) and most behavior
//! is fixed by the offline-first rules rather than configurable.

use std::time::Duration;

use crate::error::{SyncError, SyncResult};

/// Sync engine configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = SyncConfig::default().push_interval(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How often a push pass runs while online.
    /// Default: 30 seconds.
    pub push_interval: Duration,

    /// Whether the engine assumes connectivity at startup.
    /// Default: false. Offline-first: the engine stays quiet until the
    /// host reports the network is actually up.
    pub start_online: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            push_interval: Duration::from_secs(30),
            start_online: false,
        }
    }
}

impl SyncConfig {
    /// Sets the push pass interval.
    pub fn push_interval(mut self, interval: Duration) -> Self {
        self.push_interval = interval;
        self
    }

    /// Sets whether the engine starts in the online state.
    pub fn start_online(mut self, online: bool) -> Self {
        self.start_online = online;
        self
    }

    /// Validates the configuration.
    ///
    /// A sub-second interval would hammer the ledger with scans for no
    /// benefit; reject it outright.
    pub fn validate(&self) -> SyncResult<()> {
        if self.push_interval < Duration::from_secs(1) {
            return Err(SyncError::InvalidConfig(format!(
                "push_interval must be at least 1s, got {:?}",
                self.push_interval
            )));
        }
        Ok(())
    }
}

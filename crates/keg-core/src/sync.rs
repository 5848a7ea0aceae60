//! Sync control debounce.
//!
//! The sync control ignores presses while a sync is in flight and for a fixed
//! cooldown after it settles, showing the outcome during the cooldown.

use std::time::{Duration, Instant};

use crate::config::DEFAULT_SYNC_COOLDOWN;

/// Label shown while the control is armed.
pub const IDLE_LABEL: &str = "Sync from Brewfather";

/// Label shown while a sync is in flight.
pub const SYNCING_LABEL: &str = "Syncing…";

/// Label shown after a failed sync.
pub const FAILED_LABEL: &str = "Sync failed!";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Idle,
    Syncing,
    Cooldown { until: Instant, label: String },
}

/// State of the sync control.
#[derive(Debug, Clone)]
pub struct SyncGuard {
    phase: Phase,
    cooldown: Duration,
}

impl Default for SyncGuard {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_COOLDOWN)
    }
}

impl SyncGuard {
    /// Create an armed guard with the given cooldown.
    #[must_use]
    pub const fn new(cooldown: Duration) -> Self {
        Self {
            phase: Phase::Idle,
            cooldown,
        }
    }

    /// Try to start a sync. Returns false, and changes nothing, while a sync
    /// is in flight or cooling down.
    pub fn begin(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.phase = Phase::Syncing;
        true
    }

    /// Record the outcome of the in-flight sync and start the cooldown.
    ///
    /// `Ok(n)` is the number of batches synced. Ignored when no sync is in
    /// flight.
    pub fn settle<E>(&mut self, outcome: &Result<u64, E>, now: Instant) {
        if self.phase != Phase::Syncing {
            return;
        }
        let label = match outcome {
            Ok(n) => format!("Synced {n} batches"),
            Err(_) => FAILED_LABEL.to_string(),
        };
        self.phase = Phase::Cooldown {
            until: now + self.cooldown,
            label,
        };
    }

    /// Re-arm once the cooldown has elapsed. Returns true on the transition.
    pub fn poll(&mut self, now: Instant) -> bool {
        match &self.phase {
            Phase::Cooldown { until, .. } if now >= *until => {
                self.phase = Phase::Idle;
                true
            }
            _ => false,
        }
    }

    /// Whether presses are currently ignored.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Whether a sync is in flight.
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.phase == Phase::Syncing
    }

    /// Current label of the control.
    #[must_use]
    pub fn label(&self) -> &str {
        match &self.phase {
            Phase::Idle => IDLE_LABEL,
            Phase::Syncing => SYNCING_LABEL,
            Phase::Cooldown { label, .. } => label,
        }
    }

    /// Label as of `now`, showing the armed label once the cooldown has
    /// elapsed even if [`SyncGuard::poll`] has not run yet.
    #[must_use]
    pub fn label_at(&self, now: Instant) -> &str {
        match &self.phase {
            Phase::Cooldown { until, .. } if now >= *until => IDLE_LABEL,
            _ => self.label(),
        }
    }
}

//! Service counters.
//!
//! Thread-safe counters for the service's observable activity, sampled as
//! a point-in-time snapshot for dashboards and tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// A point-in-time readout of the service counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Reports accepted into the store.
    pub reports_submitted: u64,
    /// Accepted reports whose aggregate was unchanged (no fan-out).
    pub reports_unchanged: u64,
    /// Aggregate views successfully delivered to listeners.
    pub deliveries: u64,
    /// Listeners pruned after a dead-channel delivery failure.
    pub listeners_pruned: u64,
    /// Refresh cycles run.
    pub refresh_cycles: u64,
    /// Sources that missed their solicitation window.
    pub sources_timed_out: u64,
    /// Explicit source-failure signals recorded.
    pub source_errors: u64,
    /// Action executions requested.
    pub actions_requested: u64,
}

/// Relaxed atomic counters shared across the service.
#[derive(Debug, Default)]
pub struct ServiceStats {
    reports_submitted: AtomicU64,
    reports_unchanged: AtomicU64,
    deliveries: AtomicU64,
    listeners_pruned: AtomicU64,
    refresh_cycles: AtomicU64,
    sources_timed_out: AtomicU64,
    source_errors: AtomicU64,
    actions_requested: AtomicU64,
}

impl ServiceStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A report was accepted into the store.
    pub fn record_report(&self) {
        self.reports_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// An accepted report produced no visible aggregate change.
    pub fn record_unchanged(&self) {
        self.reports_unchanged.fetch_add(1, Ordering::Relaxed);
    }

    /// Views were delivered to `count` listeners.
    pub fn record_deliveries(&self, count: usize) {
        self.deliveries.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// `count` dead listeners were pruned.
    pub fn record_pruned(&self, count: usize) {
        self.listeners_pruned.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// A refresh cycle completed.
    pub fn record_refresh_cycle(&self) {
        self.refresh_cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// A source missed its solicitation window.
    pub fn record_source_timeout(&self) {
        self.sources_timed_out.fetch_add(1, Ordering::Relaxed);
    }

    /// A source explicitly reported a failure.
    pub fn record_source_error(&self) {
        self.source_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// An action execution was requested.
    pub fn record_action(&self) {
        self.actions_requested.fetch_add(1, Ordering::Relaxed);
    }

    /// Sample all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reports_submitted: self.reports_submitted.load(Ordering::Relaxed),
            reports_unchanged: self.reports_unchanged.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            listeners_pruned: self.listeners_pruned.load(Ordering::Relaxed),
            refresh_cycles: self.refresh_cycles.load(Ordering::Relaxed),
            sources_timed_out: self.sources_timed_out.load(Ordering::Relaxed),
            source_errors: self.source_errors.load(Ordering::Relaxed),
            actions_requested: self.actions_requested.load(Ordering::Relaxed),
        }
    }
}

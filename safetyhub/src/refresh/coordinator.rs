//! Refresh cycle dispatch.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::report::{SourceId, SourceReport, UserId};
use crate::stats::ServiceStats;

use super::SourceConnector;

/// Why a refresh cycle was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshReason {
    /// The aggregate view was opened by the user.
    PageOpen,
    /// The user explicitly asked for a rescan.
    ButtonClicked,
    /// The device rebooted since sources last reported.
    DeviceReboot,
    /// Periodic background rescan.
    Periodic,
    /// Any other collaborator-defined reason.
    Other,
}

impl RefreshReason {
    /// Returns a string representation of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshReason::PageOpen => "page_open",
            RefreshReason::ButtonClicked => "button_clicked",
            RefreshReason::DeviceReboot => "device_reboot",
            RefreshReason::Periodic => "periodic",
            RefreshReason::Other => "other",
        }
    }
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A solicited report on its way back into the ordinary submission path.
#[derive(Debug)]
pub struct Resubmission {
    /// The report the source produced.
    pub report: SourceReport,
    /// Package the source is scoped to.
    pub package_name: String,
    /// User the cycle was run for.
    pub user: UserId,
}

/// A source the coordinator can solicit.
#[derive(Clone)]
pub struct SourceRegistration {
    source_id: SourceId,
    package_name: String,
    connector: Arc<dyn SourceConnector>,
    /// Per-source solicitation window; the coordinator's default applies
    /// when unset.
    timeout: Option<Duration>,
}

impl SourceRegistration {
    /// Register a solicitable source.
    pub fn new(
        source_id: impl Into<SourceId>,
        package_name: impl Into<String>,
        connector: Arc<dyn SourceConnector>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            package_name: package_name.into(),
            connector,
            timeout: None,
        }
    }

    /// Override the solicitation window for this source.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Id of the source.
    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    /// Package the source is scoped to.
    pub fn package_name(&self) -> &str {
        &self.package_name
    }
}

impl fmt::Debug for SourceRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceRegistration")
            .field("source_id", &self.source_id)
            .field("package_name", &self.package_name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Drives rescan cycles across configured and dynamically added sources.
///
/// Owns no report data. All mutation of the coordinator (the additional
/// source set, cycle numbering) is serialized by the facade's refresh
/// lock; solicited reports funnel back through the resubmission channel
/// and take the data lock independently, like any external submission.
pub struct RefreshCoordinator {
    configured: Vec<SourceRegistration>,
    additional: Vec<SourceRegistration>,
    resubmit_tx: mpsc::UnboundedSender<Resubmission>,
    default_timeout: Duration,
    next_cycle: u64,
    stats: Arc<ServiceStats>,
}

impl RefreshCoordinator {
    /// Create a coordinator over the configured source set.
    pub fn new(
        configured: Vec<SourceRegistration>,
        resubmit_tx: mpsc::UnboundedSender<Resubmission>,
        default_timeout: Duration,
        stats: Arc<ServiceStats>,
    ) -> Self {
        Self {
            configured,
            additional: Vec::new(),
            resubmit_tx,
            default_timeout,
            next_cycle: 0,
            stats,
        }
    }

    /// Add a dynamically registered source to solicit on refresh.
    ///
    /// A registration for the same (source, package) replaces the prior
    /// one, so a source is never solicited twice per cycle.
    pub fn add_additional_source(&mut self, registration: SourceRegistration) {
        self.additional.retain(|r| {
            r.source_id != registration.source_id || r.package_name != registration.package_name
        });
        debug!(
            source = %registration.source_id,
            package = %registration.package_name,
            "additional source registered"
        );
        self.additional.push(registration);
    }

    /// Drop all dynamically registered sources.
    pub fn clear_additional_sources(&mut self) {
        debug!(count = self.additional.len(), "clearing additional sources");
        self.additional.clear();
    }

    /// Number of sources a cycle would solicit.
    pub fn source_count(&self) -> usize {
        self.configured.len() + self.additional.len()
    }

    /// Run one rescan cycle for the user.
    ///
    /// Every configured and additional source is solicited concurrently,
    /// each bounded by its window; the cycle completes when every source
    /// has responded or timed out. A non-responding source is simply
    /// absent from the cycle (its previous report, if any, stands) and is
    /// not retried. Returns the number of sources solicited.
    pub async fn run_cycle(&mut self, reason: RefreshReason, user: UserId) -> usize {
        let cycle = self.next_cycle;
        self.next_cycle += 1;

        let registrations: Vec<SourceRegistration> = self
            .configured
            .iter()
            .chain(self.additional.iter())
            .cloned()
            .collect();
        let count = registrations.len();
        info!(cycle, reason = %reason, user = %user, sources = count, "refresh cycle started");

        let solicitations = registrations.into_iter().map(|registration| {
            self.solicit(registration, reason, user, cycle)
        });
        join_all(solicitations).await;

        self.stats.record_refresh_cycle();
        info!(cycle, user = %user, "refresh cycle complete");
        count
    }

    /// Solicit a single source, bounded by its window.
    async fn solicit(
        &self,
        registration: SourceRegistration,
        reason: RefreshReason,
        user: UserId,
        cycle: u64,
    ) {
        let window = registration.timeout.unwrap_or(self.default_timeout);
        let request = registration.connector.request_report(reason, user);

        match tokio::time::timeout(window, request).await {
            Ok(Some(report)) => {
                trace!(
                    source = %registration.source_id,
                    cycle,
                    issues = report.issue_count(),
                    "source responded"
                );
                let resubmission = Resubmission {
                    report,
                    package_name: registration.package_name,
                    user,
                };
                if self.resubmit_tx.send(resubmission).is_err() {
                    debug!(cycle, "service shut down, dropping solicited report");
                }
            }
            Ok(None) => {
                debug!(source = %registration.source_id, cycle, "source has no data this cycle");
            }
            Err(_) => {
                self.stats.record_source_timeout();
                debug!(
                    source = %registration.source_id,
                    cycle,
                    window_ms = window.as_millis() as u64,
                    "source did not respond within its window"
                );
            }
        }
    }
}

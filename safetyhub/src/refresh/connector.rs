//! The solicitation seam between the coordinator and actual sources.

use std::time::Duration;

use futures::future::BoxFuture;

use crate::report::{SourceReport, UserId};

use super::RefreshReason;

/// Asks a source to (re)produce its report for a user.
///
/// This trait is the cross-process boundary: real implementations wrap
/// whatever transport reaches the source. The coordinator bounds each call
/// with the registration's timeout; implementations do not need their own.
/// Returning `None` means the source has no data to contribute this cycle.
pub trait SourceConnector: Send + Sync {
    /// Request a fresh report from the source.
    fn request_report(
        &self,
        reason: RefreshReason,
        user: UserId,
    ) -> BoxFuture<'static, Option<SourceReport>>;
}

/// Connector that serves a preset report after an optional delay.
///
/// Used by the demo CLI and by tests that need a deterministic source
/// (set the delay above the registration timeout to simulate a source
/// that never responds).
pub struct StaticConnector {
    report: SourceReport,
    delay: Duration,
}

impl StaticConnector {
    /// Connector that responds immediately with the given report.
    pub fn new(report: SourceReport) -> Self {
        Self {
            report,
            delay: Duration::ZERO,
        }
    }

    /// Delay every response by the given duration.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl SourceConnector for StaticConnector {
    fn request_report(
        &self,
        _reason: RefreshReason,
        _user: UserId,
    ) -> BoxFuture<'static, Option<SourceReport>> {
        let report = self.report.clone();
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Some(report)
        })
    }
}

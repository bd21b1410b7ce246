//! The report store.
//!
//! Holds the latest [`SourceReport`] per (source, package, user) key,
//! per-user dismissed-issue sets, and per-key source-error records. The
//! store has no locking of its own; the service facade serializes every
//! access under its data lock.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::report::{
    IssueId, ReportError, ReportKey, SourceError, SourceId, SourceReport, UserId,
};
use crate::view::{combine, AggregateView};

/// A stored report plus its bookkeeping.
#[derive(Debug, Clone)]
struct StoredReport {
    report: SourceReport,
    /// Monotonic insertion sequence; replacement keeps the original so
    /// aggregation order is stable across re-submissions.
    seq: u64,
    stored_at: DateTime<Utc>,
}

/// An explicitly reported source failure, with receipt time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedError {
    /// The failure as the source reported it.
    pub error: SourceError,
    /// When the signal was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// In-memory store mapping source reports to per-user aggregate views.
#[derive(Debug, Default)]
pub struct ReportStore {
    entries: HashMap<ReportKey, StoredReport>,
    dismissed: HashMap<UserId, HashSet<IssueId>>,
    source_errors: HashMap<ReportKey, RecordedError>,
    /// Last aggregate handed out for delivery, per user. Missing entry
    /// means nothing has been delivered yet.
    delivered: HashMap<UserId, AggregateView>,
    next_seq: u64,
}

impl ReportStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace the report under (report.source_id, package, user).
    ///
    /// Returns `Some(view)` when the recomputed aggregate differs from the
    /// last delivered one and listeners should be notified, `None` when
    /// the update is not visible in the aggregate. The comparison is a
    /// full structural comparison of aggregate views, not of the raw
    /// report, since dismissal state can make identical reports aggregate
    /// differently.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::MissingPackage`] for an empty package name.
    /// The store is untouched on error.
    pub fn put_report(
        &mut self,
        report: SourceReport,
        package_name: &str,
        user: UserId,
    ) -> Result<Option<AggregateView>, ReportError> {
        if package_name.is_empty() {
            return Err(ReportError::MissingPackage);
        }

        let key = ReportKey::new(report.source_id().clone(), package_name, user);
        let seq = match self.entries.get(&key) {
            Some(existing) => existing.seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            }
        };
        trace!(key = %key, seq, issues = report.issue_count(), "storing report");
        self.entries.insert(
            key,
            StoredReport {
                report,
                seq,
                stored_at: Utc::now(),
            },
        );

        Ok(self.refresh_delivered(user))
    }

    /// Last stored report for the key, or `None` if none exists.
    pub fn report(
        &self,
        source_id: &SourceId,
        package_name: &str,
        user: UserId,
    ) -> Option<SourceReport> {
        let key = ReportKey::new(source_id.clone(), package_name, user);
        self.entries.get(&key).map(|e| e.report.clone())
    }

    /// When the report under the key was last stored.
    pub fn stored_at(
        &self,
        source_id: &SourceId,
        package_name: &str,
        user: UserId,
    ) -> Option<DateTime<Utc>> {
        let key = ReportKey::new(source_id.clone(), package_name, user);
        self.entries.get(&key).map(|e| e.stored_at)
    }

    /// Compute the current aggregate for the user.
    ///
    /// Well-defined for any user: with zero contributing reports this is
    /// [`AggregateView::empty`]. Does not alter delivery bookkeeping.
    pub fn aggregate(&self, user: UserId) -> AggregateView {
        let mut contributing: Vec<(&ReportKey, &StoredReport)> = self
            .entries
            .iter()
            .filter(|(key, _)| key.user == user)
            .collect();
        contributing.sort_by_key(|(_, stored)| stored.seq);

        let ordered: Vec<(&ReportKey, &SourceReport)> = contributing
            .iter()
            .map(|(key, stored)| (*key, &stored.report))
            .collect();

        let no_dismissals = HashSet::new();
        let dismissed = self.dismissed.get(&user).unwrap_or(&no_dismissals);
        combine(&ordered, dismissed)
    }

    /// Mark an issue as dismissed for the user.
    ///
    /// Dismissal is presentation state: the issue disappears from the
    /// aggregate while the underlying report is untouched. Returns
    /// `Some(view)` when the aggregate visibly changed. Idempotent.
    pub fn dismiss_issue(&mut self, issue_id: IssueId, user: UserId) -> Option<AggregateView> {
        let inserted = self.dismissed.entry(user).or_default().insert(issue_id);
        if !inserted {
            return None;
        }
        self.refresh_delivered(user)
    }

    /// Record an explicit source-failure signal. Latest signal per key
    /// wins; stored reports and aggregates are unaffected.
    pub fn record_source_error(
        &mut self,
        source_id: &SourceId,
        error: SourceError,
        package_name: &str,
        user: UserId,
    ) -> Result<(), ReportError> {
        if source_id.is_empty() {
            return Err(ReportError::MissingSourceId);
        }
        if package_name.is_empty() {
            return Err(ReportError::MissingPackage);
        }
        let key = ReportKey::new(source_id.clone(), package_name, user);
        debug!(key = %key, error = %error, "source reported an error");
        self.source_errors.insert(
            key,
            RecordedError {
                error,
                recorded_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Last explicitly reported error for the key, if any.
    pub fn last_source_error(
        &self,
        source_id: &SourceId,
        package_name: &str,
        user: UserId,
    ) -> Option<RecordedError> {
        let key = ReportKey::new(source_id.clone(), package_name, user);
        self.source_errors.get(&key).cloned()
    }

    /// Discard all reports, dismissals, error records, and delivery
    /// bookkeeping for every user. Idempotent.
    pub fn clear(&mut self) {
        debug!(reports = self.entries.len(), "clearing report store");
        self.entries.clear();
        self.dismissed.clear();
        self.source_errors.clear();
        self.delivered.clear();
        self.next_seq = 0;
    }

    /// Number of stored reports across all users.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no reports.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recompute the user's aggregate and compare it with the last
    /// delivered one. On a visible change, remember the new view as
    /// delivered and return it for fan-out.
    fn refresh_delivered(&mut self, user: UserId) -> Option<AggregateView> {
        let view = self.aggregate(user);
        if self.delivered.get(&user) == Some(&view) {
            trace!(user = %user, "aggregate unchanged, no notification needed");
            return None;
        }
        self.delivered.insert(user, view.clone());
        Some(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Issue, Severity, Status};

    const PKG: &str = "com.example.safety";
    const U0: UserId = UserId(0);
    const U1: UserId = UserId(1);

    fn ok_report(source: &str) -> SourceReport {
        SourceReport::builder(source)
            .status(Status::new("All good", "Nothing to do", Severity::Ok))
            .build()
            .unwrap()
    }

    fn warn_report(source: &str, issue_id: &str) -> SourceReport {
        SourceReport::builder(source)
            .status(Status::new("Check settings", "Action advised", Severity::Recommendation))
            .issue(Issue::new(
                issue_id,
                "Weak screen lock",
                "Your PIN is easy to guess",
                Severity::Recommendation,
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_put_and_get_roundtrip() {
        let mut store = ReportStore::new();
        let report = ok_report("s1");
        store.put_report(report.clone(), PKG, U0).unwrap();

        let fetched = store.report(&SourceId::new("s1"), PKG, U0).unwrap();
        assert_eq!(fetched, report);
        assert!(store.stored_at(&SourceId::new("s1"), PKG, U0).is_some());
    }

    #[test]
    fn test_get_unknown_key_is_none() {
        let store = ReportStore::new();
        assert!(store.report(&SourceId::new("nope"), PKG, U0).is_none());
    }

    #[test]
    fn test_put_rejects_empty_package() {
        let mut store = ReportStore::new();
        let err = store.put_report(ok_report("s1"), "", U0).unwrap_err();
        assert_eq!(err, ReportError::MissingPackage);
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_not_merge() {
        let mut store = ReportStore::new();
        store.put_report(ok_report("s1"), PKG, U0).unwrap();
        store.put_report(warn_report("s1", "i1"), PKG, U0).unwrap();

        let fetched = store.report(&SourceId::new("s1"), PKG, U0).unwrap();
        assert_eq!(fetched, warn_report("s1", "i1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_first_put_notifies() {
        let mut store = ReportStore::new();
        let view = store.put_report(ok_report("s1"), PKG, U0).unwrap();
        assert!(view.is_some());
        assert_eq!(view.unwrap().severity(), Severity::Ok);
    }

    #[test]
    fn test_identical_resubmission_is_a_noop() {
        let mut store = ReportStore::new();
        assert!(store.put_report(ok_report("s1"), PKG, U0).unwrap().is_some());
        assert!(store.put_report(ok_report("s1"), PKG, U0).unwrap().is_none());
    }

    #[test]
    fn test_per_key_isolation() {
        let mut store = ReportStore::new();
        store.put_report(ok_report("s1"), PKG, U0).unwrap();
        store.put_report(warn_report("s2", "i1"), PKG, U0).unwrap();

        assert_eq!(store.report(&SourceId::new("s1"), PKG, U0).unwrap(), ok_report("s1"));
        assert_eq!(
            store.report(&SourceId::new("s2"), PKG, U0).unwrap(),
            warn_report("s2", "i1")
        );
    }

    #[test]
    fn test_user_partitioning() {
        let mut store = ReportStore::new();
        store.put_report(warn_report("s1", "i1"), PKG, U0).unwrap();

        assert!(store.report(&SourceId::new("s1"), PKG, U1).is_none());
        assert_eq!(store.aggregate(U1), AggregateView::empty());
    }

    #[test]
    fn test_aggregate_purity() {
        let mut store = ReportStore::new();
        store.put_report(warn_report("s1", "i1"), PKG, U0).unwrap();
        assert_eq!(store.aggregate(U0), store.aggregate(U0));
    }

    #[test]
    fn test_replacement_keeps_insertion_order() {
        let mut store = ReportStore::new();
        store
            .put_report(
                SourceReport::builder("s1")
                    .status(Status::new("First", "first", Severity::Recommendation))
                    .build()
                    .unwrap(),
                PKG,
                U0,
            )
            .unwrap();
        store
            .put_report(
                SourceReport::builder("s2")
                    .status(Status::new("Second", "second", Severity::Recommendation))
                    .build()
                    .unwrap(),
                PKG,
                U0,
            )
            .unwrap();
        // Re-submitting s1 must not demote it behind s2 in tie-breaks.
        store
            .put_report(
                SourceReport::builder("s1")
                    .status(Status::new("First again", "first", Severity::Recommendation))
                    .build()
                    .unwrap(),
                PKG,
                U0,
            )
            .unwrap();

        assert_eq!(store.aggregate(U0).status.title, "First again");
    }

    #[test]
    fn test_dismiss_excludes_from_aggregate_only() {
        let mut store = ReportStore::new();
        store.put_report(warn_report("s1", "i1"), PKG, U0).unwrap();

        let view = store.dismiss_issue(IssueId::new("i1"), U0);
        assert!(view.is_some());
        assert!(!store.aggregate(U0).has_issue(&IssueId::new("i1")));

        // The underlying report still carries the issue.
        let report = store.report(&SourceId::new("s1"), PKG, U0).unwrap();
        assert_eq!(report.issue_count(), 1);
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let mut store = ReportStore::new();
        store.put_report(warn_report("s1", "i1"), PKG, U0).unwrap();
        assert!(store.dismiss_issue(IssueId::new("i1"), U0).is_some());
        assert!(store.dismiss_issue(IssueId::new("i1"), U0).is_none());
    }

    #[test]
    fn test_dismissal_scoped_to_user() {
        let mut store = ReportStore::new();
        store.put_report(warn_report("s1", "i1"), PKG, U0).unwrap();
        store.put_report(warn_report("s1", "i1"), PKG, U1).unwrap();

        store.dismiss_issue(IssueId::new("i1"), U0);
        assert!(!store.aggregate(U0).has_issue(&IssueId::new("i1")));
        assert!(store.aggregate(U1).has_issue(&IssueId::new("i1")));
    }

    #[test]
    fn test_resubmission_after_dismissal_stays_quiet() {
        // The aggregate comparison must look at the combined view, not the
        // raw report: after a dismissal, re-sending the identical report
        // still produces an unchanged (filtered) aggregate.
        let mut store = ReportStore::new();
        store.put_report(warn_report("s1", "i1"), PKG, U0).unwrap();
        store.dismiss_issue(IssueId::new("i1"), U0).unwrap();

        let view = store.put_report(warn_report("s1", "i1"), PKG, U0).unwrap();
        assert!(view.is_none());
    }

    #[test]
    fn test_source_error_recorded_without_touching_report() {
        let mut store = ReportStore::new();
        store.put_report(ok_report("s1"), PKG, U0).unwrap();

        store
            .record_source_error(&SourceId::new("s1"), SourceError::new("scan failed"), PKG, U0)
            .unwrap();

        let recorded = store.last_source_error(&SourceId::new("s1"), PKG, U0).unwrap();
        assert_eq!(recorded.error.message(), "scan failed");
        assert_eq!(store.report(&SourceId::new("s1"), PKG, U0).unwrap(), ok_report("s1"));
    }

    #[test]
    fn test_source_error_rejects_bad_input() {
        let mut store = ReportStore::new();
        assert_eq!(
            store
                .record_source_error(&SourceId::new(""), SourceError::new("x"), PKG, U0)
                .unwrap_err(),
            ReportError::MissingSourceId
        );
        assert_eq!(
            store
                .record_source_error(&SourceId::new("s1"), SourceError::new("x"), "", U0)
                .unwrap_err(),
            ReportError::MissingPackage
        );
    }

    #[test]
    fn test_clear_resets_fully() {
        let mut store = ReportStore::new();
        store.put_report(warn_report("s1", "i1"), PKG, U0).unwrap();
        store.put_report(ok_report("s2"), PKG, U1).unwrap();
        store.dismiss_issue(IssueId::new("i1"), U0);
        store
            .record_source_error(&SourceId::new("s1"), SourceError::new("x"), PKG, U0)
            .unwrap();

        store.clear();
        store.clear(); // idempotent

        assert!(store.is_empty());
        assert_eq!(store.aggregate(U0), AggregateView::empty());
        assert_eq!(store.aggregate(U1), AggregateView::empty());
        assert!(store.report(&SourceId::new("s1"), PKG, U0).is_none());
        assert!(store.last_source_error(&SourceId::new("s1"), PKG, U0).is_none());

        // After a clear, the next put is a fresh first delivery.
        assert!(store.put_report(ok_report("s1"), PKG, U0).unwrap().is_some());
    }
}

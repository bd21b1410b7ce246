//! Aggregate view value types.

use crate::report::{Issue, IssueId, Severity, SourceId};

/// Combined headline for a user's aggregate view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateStatus {
    /// Headline text, taken from the worst-severity contributor.
    pub title: String,
    /// One-line explanation.
    pub summary: String,
    /// Worst severity across all contributing statuses and live issues.
    pub severity: Severity,
}

impl AggregateStatus {
    /// Status of the empty aggregate, before any source has reported.
    pub fn unknown() -> Self {
        Self {
            title: String::from("Safety status unknown"),
            summary: String::from("No sources have reported yet"),
            severity: Severity::Unspecified,
        }
    }
}

/// An issue surfaced in the aggregate, with its provenance.
///
/// Provenance lets later dismissal and action lookups address the issue
/// back to the source that reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateIssue {
    /// The issue as reported.
    pub issue: Issue,
    /// Source that reported it.
    pub source_id: SourceId,
    /// Package the source is scoped to.
    pub package_name: String,
}

/// The computed, per-user combination of all sources' current reports.
///
/// Equality is structural; the store compares whole views to decide
/// whether listeners need to be notified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateView {
    /// Combined headline status.
    pub status: AggregateStatus,
    /// All non-dismissed issues, in source-insertion then report order.
    pub issues: Vec<AggregateIssue>,
}

impl AggregateView {
    /// The well-defined aggregate for a user with zero contributing
    /// reports.
    pub fn empty() -> Self {
        Self {
            status: AggregateStatus::unknown(),
            issues: Vec::new(),
        }
    }

    /// Whether any source has contributed to this view.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty() && self.status == AggregateStatus::unknown()
    }

    /// Worst severity in the view.
    pub fn severity(&self) -> Severity {
        self.status.severity
    }

    /// Whether the view contains an issue with the given id.
    pub fn has_issue(&self, id: &IssueId) -> bool {
        self.issues.iter().any(|i| i.issue.id() == id)
    }
}

impl Default for AggregateView {
    fn default() -> Self {
        Self::empty()
    }
}

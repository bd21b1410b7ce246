//! Source report value type and its builder.

use super::{Issue, ReportError, SourceId, Status};

/// The latest status-and-issues payload submitted by a source for a user.
///
/// Immutable once built. The issue list is copied on construction and on
/// every read so callers can never mutate stored state through an aliased
/// reference. Equality is structural, which the store relies on for its
/// changed/unchanged comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    source_id: SourceId,
    status: Option<Status>,
    issues: Vec<Issue>,
}

impl SourceReport {
    /// Start building a report for the given source.
    pub fn builder(source_id: impl Into<SourceId>) -> SourceReportBuilder {
        SourceReportBuilder::new(source_id)
    }

    /// Id of the source that produced this report.
    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    /// The source's overall status, if it reported one.
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// The report's issues, in submission order.
    ///
    /// Returns a fresh copy on every call.
    pub fn issues(&self) -> Vec<Issue> {
        self.issues.clone()
    }

    /// Number of issues in the report.
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Iterate the issues without copying. Crate-internal: external
    /// callers go through [`SourceReport::issues`].
    pub(crate) fn iter_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter()
    }
}

/// Builder for [`SourceReport`].
///
/// Setters accept data incrementally; validation happens once, at
/// [`SourceReportBuilder::build`]. Cross-field validation (status vs issue
/// severity compatibility) is intentionally not enforced.
#[derive(Debug, Clone)]
pub struct SourceReportBuilder {
    source_id: SourceId,
    status: Option<Status>,
    issues: Vec<Issue>,
}

impl SourceReportBuilder {
    /// Create a builder for the given source.
    pub fn new(source_id: impl Into<SourceId>) -> Self {
        Self {
            source_id: source_id.into(),
            status: None,
            issues: Vec::new(),
        }
    }

    /// Set the source's overall status.
    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Append an issue. Submission order is preserved.
    pub fn issue(mut self, issue: Issue) -> Self {
        self.issues.push(issue);
        self
    }

    /// Drop all issues added so far.
    pub fn clear_issues(mut self) -> Self {
        self.issues.clear();
        self
    }

    /// Finalize the report.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::MissingSourceId`] if the source id is empty.
    pub fn build(self) -> Result<SourceReport, ReportError> {
        if self.source_id.is_empty() {
            return Err(ReportError::MissingSourceId);
        }
        Ok(SourceReport {
            source_id: self.source_id,
            status: self.status,
            issues: self.issues,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;

    fn make_issue(id: &str) -> Issue {
        Issue::new(id, "title", "summary", Severity::Recommendation)
    }

    #[test]
    fn test_build_minimal_report() {
        let report = SourceReport::builder("s1").build().unwrap();
        assert_eq!(report.source_id().as_str(), "s1");
        assert!(report.status().is_none());
        assert!(report.issues().is_empty());
    }

    #[test]
    fn test_build_rejects_empty_source_id() {
        let result = SourceReport::builder("").build();
        assert_eq!(result.unwrap_err(), ReportError::MissingSourceId);
    }

    #[test]
    fn test_issue_order_preserved() {
        let report = SourceReport::builder("s1")
            .issue(make_issue("a"))
            .issue(make_issue("b"))
            .issue(make_issue("c"))
            .build()
            .unwrap();
        let ids: Vec<_> = report
            .issues()
            .iter()
            .map(|i| i.id().as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_clear_issues() {
        let report = SourceReport::builder("s1")
            .issue(make_issue("a"))
            .clear_issues()
            .issue(make_issue("b"))
            .build()
            .unwrap();
        assert_eq!(report.issue_count(), 1);
        assert_eq!(report.issues()[0].id().as_str(), "b");
    }

    #[test]
    fn test_issues_returns_a_copy() {
        let report = SourceReport::builder("s1")
            .issue(make_issue("a"))
            .build()
            .unwrap();
        let mut copy = report.issues();
        copy.clear();
        assert_eq!(report.issue_count(), 1);
    }

    #[test]
    fn test_structural_equality() {
        let build = || {
            SourceReport::builder("s1")
                .status(Status::new("ok", "fine", Severity::Ok))
                .issue(make_issue("a"))
                .build()
                .unwrap()
        };
        assert_eq!(build(), build());

        let other = SourceReport::builder("s1").build().unwrap();
        assert_ne!(build(), other);
    }
}

//! Individual actionable findings within a report.

use super::{IssueId, Severity};

/// A single actionable finding reported by a source.
///
/// Issues carry their own identity so presentation-level operations
/// (dismissal, action execution) can address them after aggregation.
/// Ordering of issues within a report is caller-significant and preserved
/// through every read path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    id: IssueId,
    title: String,
    summary: String,
    severity: Severity,
}

impl Issue {
    /// Create an issue.
    pub fn new(
        id: impl Into<IssueId>,
        title: impl Into<String>,
        summary: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: summary.into(),
            severity,
        }
    }

    /// The issue's identity.
    pub fn id(&self) -> &IssueId {
        &self.id
    }

    /// Headline describing the finding.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// One-line explanation of the finding.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Severity of the finding.
    pub fn severity(&self) -> Severity {
        self.severity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_accessors() {
        let issue = Issue::new(
            "weak_pin",
            "Weak screen lock",
            "Your PIN is easy to guess",
            Severity::Recommendation,
        );
        assert_eq!(issue.id().as_str(), "weak_pin");
        assert_eq!(issue.title(), "Weak screen lock");
        assert_eq!(issue.severity(), Severity::Recommendation);
    }

    #[test]
    fn test_issue_equality_is_structural() {
        let a = Issue::new("i1", "t", "s", Severity::Ok);
        let b = Issue::new("i1", "t", "s", Severity::Ok);
        let c = Issue::new("i1", "t", "s", Severity::Critical);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

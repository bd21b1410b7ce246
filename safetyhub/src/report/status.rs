//! Severity ladder and per-source overall status.

/// Severity of a status or issue.
///
/// Variants are ordered from least to most severe so that
/// worst-severity-wins aggregation can rely on `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The source has not (or cannot) assess its severity.
    Unspecified,
    /// Everything is fine.
    Ok,
    /// The user is advised to act, but is not at immediate risk.
    Recommendation,
    /// The user is at risk and should act now.
    Critical,
}

impl Severity {
    /// Returns a string representation of the severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Unspecified => "unspecified",
            Severity::Ok => "ok",
            Severity::Recommendation => "recommendation",
            Severity::Critical => "critical",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Unspecified
    }
}

/// A source's overall status, shown for the source as a whole.
///
/// A report may carry issues without an overall status; the status is
/// therefore optional on [`super::SourceReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    title: String,
    summary: String,
    severity: Severity,
}

impl Status {
    /// Create a status with a headline, summary, and severity.
    pub fn new(title: impl Into<String>, summary: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            severity,
        }
    }

    /// Headline shown for the source.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// One-line explanation of the status.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Severity of the status.
    pub fn severity(&self) -> Severity {
        self.severity
    }
}

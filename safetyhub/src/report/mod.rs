//! Data model for safety-status reports.
//!
//! A source periodically submits a [`SourceReport`] describing its overall
//! [`Status`] and any actionable [`Issue`]s. Reports are immutable once
//! built and are stored keyed by (source, package, user).

mod issue;
mod source_report;
mod status;

pub use issue::Issue;
pub use source_report::{SourceReport, SourceReportBuilder};
pub use status::{Severity, Status};

use std::fmt;

use thiserror::Error;

/// Identifier of a safety source, scoped to the package that registered it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    /// Create a source id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty (invalid for submission).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Identifier of an individual issue within a report.
///
/// Issue ids are used for later presentation-level operations such as
/// dismissal and action execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssueId(String);

impl IssueId {
    /// Create an issue id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IssueId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for IssueId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// User identifier under which reports, listeners, and aggregates are
/// partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key under which exactly one live report is held at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportKey {
    /// Source that produced the report.
    pub source_id: SourceId,
    /// Package the source is scoped to.
    pub package_name: String,
    /// User the report applies to.
    pub user: UserId,
}

impl ReportKey {
    /// Build a key from its parts.
    pub fn new(source_id: SourceId, package_name: impl Into<String>, user: UserId) -> Self {
        Self {
            source_id,
            package_name: package_name.into(),
            user,
        }
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/u{}", self.source_id, self.package_name, self.user)
    }
}

/// An explicit failure signal from a source that could not produce data.
///
/// Distinct from a refresh timeout: the source actively reported that it
/// failed. Recorded for observability only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    message: String,
}

impl SourceError {
    /// Create a source error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errors raised when constructing or submitting a report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The report's source id was missing or empty.
    #[error("report is missing a source id")]
    MissingSourceId,

    /// The submitting package name was missing or empty.
    #[error("report submission is missing a package name")]
    MissingPackage,
}

//! Service error types.

use std::fmt;

use crate::report::ReportError;

/// Errors surfaced by service operations.
#[derive(Debug)]
pub enum ServiceError {
    /// A report or submission failed validation; no state was mutated.
    InvalidReport(ReportError),
    /// An operation argument was malformed (e.g. an empty id).
    InvalidArgument(String),
    /// The background resubmission task was already started.
    AlreadyStarted,
    /// The data lock was poisoned by a panicking holder.
    StateLock,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidReport(e) => write!(f, "Invalid report: {}", e),
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Self::AlreadyStarted => write!(f, "Service already started"),
            Self::StateLock => write!(f, "Service state lock poisoned"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidReport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReportError> for ServiceError {
    fn from(e: ReportError) -> Self {
        Self::InvalidReport(e)
    }
}

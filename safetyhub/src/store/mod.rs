//! Latest-report-per-key storage and per-user aggregation.

mod report_store;

pub use report_store::{RecordedError, ReportStore};

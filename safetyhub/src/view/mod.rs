//! Per-user aggregate view of all contributing source reports.
//!
//! The aggregate is computed, never stored independently: it is a pure
//! function of the store's current reports for a user plus the user's
//! dismissed-issue set.

mod aggregate;
mod combine;

pub use aggregate::{AggregateIssue, AggregateStatus, AggregateView};
pub use combine::combine;

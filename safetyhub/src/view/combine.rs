//! Deterministic combination of source reports into an aggregate view.

use std::collections::HashSet;

use tracing::trace;

use crate::report::{IssueId, ReportKey, Severity, SourceReport};

use super::{AggregateIssue, AggregateStatus, AggregateView};

/// Combine reports into a user's aggregate view.
///
/// `reports` must be ordered by source insertion order; that order breaks
/// severity ties and fixes the issue order in the resulting view. Issues
/// whose id appears in `dismissed` are excluded entirely. The headline is
/// taken from the worst-severity contributor, whether that is a source
/// status or an individual issue; the first contributor seen at the worst
/// severity wins.
pub fn combine(reports: &[(&ReportKey, &SourceReport)], dismissed: &HashSet<IssueId>) -> AggregateView {
    let mut headline: Option<AggregateStatus> = None;
    let mut issues = Vec::new();

    for (key, report) in reports {
        if let Some(status) = report.status() {
            consider_headline(
                &mut headline,
                status.title(),
                status.summary(),
                status.severity(),
            );
        }

        for issue in report.iter_issues() {
            if dismissed.contains(issue.id()) {
                trace!(issue = %issue.id(), source = %key.source_id, "skipping dismissed issue");
                continue;
            }
            consider_headline(
                &mut headline,
                issue.title(),
                issue.summary(),
                issue.severity(),
            );
            issues.push(AggregateIssue {
                issue: issue.clone(),
                source_id: key.source_id.clone(),
                package_name: key.package_name.clone(),
            });
        }
    }

    AggregateView {
        status: headline.unwrap_or_else(AggregateStatus::unknown),
        issues,
    }
}

/// Replace the headline only on a strictly worse severity, so the first
/// contributor at the worst severity wins ties.
fn consider_headline(
    headline: &mut Option<AggregateStatus>,
    title: &str,
    summary: &str,
    severity: Severity,
) {
    let worse = match headline {
        Some(current) => severity > current.severity,
        None => true,
    };
    if worse {
        *headline = Some(AggregateStatus {
            title: title.to_string(),
            summary: summary.to_string(),
            severity,
        });
    }
}

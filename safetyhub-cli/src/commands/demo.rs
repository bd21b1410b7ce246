//! Scripted demo against a live service.
//!
//! Configures a handful of static demo sources, registers a listener,
//! submits reports, runs a refresh cycle, and prints every aggregate the
//! listener receives.

use std::sync::Arc;
use std::time::Duration;

use safetyhub::listener::ListenerHandle;
use safetyhub::refresh::{RefreshReason, SourceRegistration, StaticConnector};
use safetyhub::report::{Issue, IssueId, Severity, SourceReport, Status, UserId};
use safetyhub::service::{ServiceBuilder, ServiceConfig};
use safetyhub::view::AggregateView;
use tracing::info;

use crate::error::CliError;

/// Options for the demo run.
pub struct DemoOptions {
    /// User scope to run under.
    pub user: UserId,
    /// Number of demo sources to configure.
    pub sources: usize,
    /// Per-source solicitation window.
    pub source_timeout: Duration,
}

/// Build a demo report for the nth source. The last source carries an
/// actionable issue so the demo exercises dismissal.
fn demo_report(index: usize, total: usize) -> Result<SourceReport, CliError> {
    let source_id = format!("demo-source-{}", index);
    let builder = if index + 1 == total {
        SourceReport::builder(source_id)
            .status(Status::new(
                "Check settings",
                "One finding needs attention",
                Severity::Recommendation,
            ))
            .issue(Issue::new(
                "demo-issue",
                "Weak screen lock",
                "Your PIN is easy to guess",
                Severity::Recommendation,
            ))
    } else {
        SourceReport::builder(source_id)
            .status(Status::new("All good", "Nothing to do", Severity::Ok))
    };
    builder.build().map_err(|e| CliError::Service(e.into()))
}

fn print_view(label: &str, view: &AggregateView) {
    println!(
        "[{}] {} ({}) - {} issue(s)",
        label,
        view.status.title,
        view.status.severity.as_str(),
        view.issues.len()
    );
    for issue in &view.issues {
        println!(
            "    - {} [{} from {}]",
            issue.issue.title(),
            issue.issue.id(),
            issue.source_id
        );
    }
}

/// Run the demo.
pub async fn run(options: DemoOptions) -> Result<(), CliError> {
    let total = options.sources.max(1);
    info!(sources = total, user = %options.user, "starting demo");
    let mut builder = ServiceBuilder::new().config(
        ServiceConfig::builder()
            .source_timeout(options.source_timeout)
            .build(),
    );
    for index in 0..total {
        let report = demo_report(index, total)?;
        let source_id = report.source_id().clone();
        builder = builder.source(SourceRegistration::new(
            source_id,
            "com.example.demo",
            Arc::new(StaticConnector::new(report)),
        ));
    }
    let service = builder.build();
    let drain = service.start()?;

    let (handle, mut updates) = ListenerHandle::connect();
    let listener_id = handle.id();
    service.add_listener(handle, options.user)?;
    if let Ok(view) = updates.try_recv() {
        print_view("registered", &view);
    }

    println!("Refreshing {} source(s)...", total);
    service.refresh(RefreshReason::ButtonClicked, options.user).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    while let Ok(view) = updates.try_recv() {
        print_view("update", &view);
    }

    let issue_id = IssueId::new("demo-issue");
    if service.aggregate(options.user).has_issue(&issue_id) {
        println!("Dismissing issue '{}'...", issue_id);
        service.dismiss_issue(issue_id, options.user)?;
        while let Ok(view) = updates.try_recv() {
            print_view("after dismiss", &view);
        }
    }

    let stats = service.stats();
    println!(
        "Done: {} report(s) stored, {} delivery(ies), {} refresh cycle(s), {} timeout(s)",
        stats.reports_submitted, stats.deliveries, stats.refresh_cycles, stats.sources_timed_out
    );

    service.remove_listener(listener_id, options.user)?;
    service.shutdown();
    let _ = drain.await;
    Ok(())
}

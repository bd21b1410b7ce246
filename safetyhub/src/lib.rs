//! SafetyHub - concurrent safety-status aggregation and notification
//!
//! This library aggregates safety-status reports from many independent
//! sources into one consistent per-user view and pushes updates to
//! subscribed observers.
//!
//! # High-Level API
//!
//! The [`service`] module provides the facade most callers want:
//!
//! ```ignore
//! use safetyhub::listener::ListenerHandle;
//! use safetyhub::report::{Severity, SourceReport, Status, UserId};
//! use safetyhub::service::ServiceBuilder;
//!
//! let service = ServiceBuilder::new().build();
//!
//! let (handle, mut updates) = ListenerHandle::connect();
//! service.add_listener(handle, UserId(0))?;
//!
//! let report = SourceReport::builder("lock_screen")
//!     .status(Status::new("All good", "Nothing to do", Severity::Ok))
//!     .build()?;
//! service.submit_report(report, "com.example.settings", UserId(0))?;
//!
//! // The listener now holds the updated aggregate view.
//! let view = updates.try_recv()?;
//! ```

pub mod listener;
pub mod logging;
pub mod refresh;
pub mod report;
pub mod service;
pub mod stats;
pub mod store;
pub mod view;

/// Version of the SafetyHub library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

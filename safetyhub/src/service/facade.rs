//! SafetyHub service facade implementation.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::listener::{ListenerHandle, ListenerId, ListenerRegistry};
use crate::refresh::{RefreshCoordinator, RefreshReason, Resubmission, SourceRegistration};
use crate::report::{IssueId, SourceError, SourceId, SourceReport, UserId};
use crate::stats::{ServiceStats, StatsSnapshot};
use crate::store::{RecordedError, ReportStore};
use crate::view::AggregateView;

use super::config::{FeatureGate, ServiceConfig};
use super::error::ServiceError;

/// State guarded by the data lock: the report store and the listener
/// registry, mutated together, always under one acquisition.
struct ApiState {
    store: ReportStore,
    listeners: ListenerRegistry,
}

/// The synchronization boundary of the safety-status core.
///
/// Two lock domains, never held by the same call path:
///
/// - the **data lock** (`std::sync::Mutex`) serializes report and listener
///   mutation; its critical sections are in-memory and fast, and it is
///   never held across an `.await` or during delivery;
/// - the **refresh lock** (`tokio::sync::Mutex`) serializes rescan cycles
///   and additional-source mutation; it is held across the slow
///   solicitation awaits and therefore blocks only other refresh calls.
///
/// Every write path follows the same shape: mutate under the data lock,
/// release, then deliver the resulting aggregate to listeners with no lock
/// held. A listener may synchronously re-enter this API upon receiving an
/// update; delivering under the lock would deadlock that call.
pub struct SafetyHubService {
    api: Mutex<ApiState>,
    refresh: AsyncMutex<RefreshCoordinator>,
    /// Receiver for solicited reports; taken once by `start`.
    resubmit_rx: Mutex<Option<mpsc::UnboundedReceiver<Resubmission>>>,
    gate: Arc<dyn FeatureGate>,
    config: ServiceConfig,
    stats: Arc<ServiceStats>,
    shutdown: CancellationToken,
}

impl SafetyHubService {
    /// Wire a service from its configuration, enablement gate, and the
    /// configured source set. Prefer [`super::ServiceBuilder`].
    pub fn new(
        config: ServiceConfig,
        gate: Arc<dyn FeatureGate>,
        configured_sources: Vec<SourceRegistration>,
    ) -> Arc<Self> {
        let stats = Arc::new(ServiceStats::new());
        let (resubmit_tx, resubmit_rx) = mpsc::unbounded_channel();
        let coordinator = RefreshCoordinator::new(
            configured_sources,
            resubmit_tx,
            config.source_timeout(),
            Arc::clone(&stats),
        );

        Arc::new(Self {
            api: Mutex::new(ApiState {
                store: ReportStore::new(),
                listeners: ListenerRegistry::new(),
            }),
            refresh: AsyncMutex::new(coordinator),
            resubmit_rx: Mutex::new(Some(resubmit_rx)),
            gate,
            config,
            stats,
            shutdown: CancellationToken::new(),
        })
    }

    /// Start the background task that funnels solicited reports through
    /// the ordinary submission path.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AlreadyStarted`] on a second call.
    pub fn start(self: &Arc<Self>) -> Result<JoinHandle<()>, ServiceError> {
        let mut rx = self
            .resubmit_rx
            .lock()
            .map_err(|_| ServiceError::StateLock)?
            .take()
            .ok_or(ServiceError::AlreadyStarted)?;

        let service = Arc::clone(self);
        let token = self.shutdown.clone();
        info!("safety hub service started");

        Ok(tokio::spawn(async move {
            debug!("resubmission drain task running");
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    next = rx.recv() => match next {
                        Some(resubmission) => service.apply_resubmission(resubmission),
                        None => break,
                    },
                }
            }
            debug!("resubmission drain task stopped");
        }))
    }

    /// Stop the background resubmission task.
    pub fn shutdown(&self) {
        info!("safety hub service shutting down");
        self.shutdown.cancel();
    }

    /// Store or replace a source's report and notify the user's listeners
    /// if the aggregate visibly changed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidReport`] for a missing package name;
    /// no state is mutated in that case.
    pub fn submit_report(
        &self,
        report: SourceReport,
        package_name: &str,
        user: UserId,
    ) -> Result<(), ServiceError> {
        let (view, targets) = {
            let mut api = self.api.lock().map_err(|_| ServiceError::StateLock)?;
            match api.store.put_report(report, package_name, user)? {
                Some(view) => {
                    let targets = api.listeners.snapshot(user);
                    (view, targets)
                }
                None => {
                    self.stats.record_report();
                    self.stats.record_unchanged();
                    return Ok(());
                }
            }
        };
        self.stats.record_report();

        // Data lock released; fan out to the scope's listeners.
        self.deliver_and_prune(&targets, &view);
        Ok(())
    }

    /// Last stored report for the key, or `None`.
    pub fn last_report(
        &self,
        source_id: &SourceId,
        package_name: &str,
        user: UserId,
    ) -> Option<SourceReport> {
        self.api
            .lock()
            .ok()
            .and_then(|api| api.store.report(source_id, package_name, user))
    }

    /// Record an explicit source-failure signal.
    ///
    /// The signal is stored for observability only; the source's last
    /// report and the aggregate are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidReport`] for an empty source id or
    /// package name.
    pub fn report_source_error(
        &self,
        source_id: &SourceId,
        error: SourceError,
        package_name: &str,
        user: UserId,
    ) -> Result<(), ServiceError> {
        warn!(source = %source_id, user = %user, error = %error, "source reported an error");
        let mut api = self.api.lock().map_err(|_| ServiceError::StateLock)?;
        api.store
            .record_source_error(source_id, error, package_name, user)?;
        drop(api);
        self.stats.record_source_error();
        Ok(())
    }

    /// Last explicitly reported error for the key, if any.
    pub fn last_source_error(
        &self,
        source_id: &SourceId,
        package_name: &str,
        user: UserId,
    ) -> Option<RecordedError> {
        self.api
            .lock()
            .ok()
            .and_then(|api| api.store.last_source_error(source_id, package_name, user))
    }

    /// Whether the service is enabled per the injected gate.
    pub fn is_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    /// Run a rescan cycle: solicit every configured and additional source
    /// for the user.
    ///
    /// Serialized by the refresh lock only; a slow cycle never delays data
    /// operations. Solicited reports re-enter through the resubmission
    /// channel and are applied in arrival order like any other submission.
    pub async fn refresh(&self, reason: RefreshReason, user: UserId) {
        let mut coordinator = self.refresh.lock().await;
        coordinator.run_cycle(reason, user).await;
    }

    /// Current aggregate view for the user. Never fails; a user with no
    /// reports gets the empty aggregate.
    pub fn aggregate(&self, user: UserId) -> AggregateView {
        self.api
            .lock()
            .map(|api| api.store.aggregate(user))
            .unwrap_or_else(|_| AggregateView::empty())
    }

    /// Register a listener for a user's aggregate and immediately deliver
    /// the current view to it (outside the lock).
    pub fn add_listener(&self, handle: ListenerHandle, user: UserId) -> Result<(), ServiceError> {
        let view = {
            let mut api = self.api.lock().map_err(|_| ServiceError::StateLock)?;
            api.listeners.add_listener(handle.clone(), user);
            api.store.aggregate(user)
        };

        // Initial snapshot delivery, lock-free like every delivery.
        if ListenerRegistry::deliver(&handle, view) {
            self.stats.record_deliveries(1);
        } else {
            self.prune_dead(&[handle.id()]);
        }
        Ok(())
    }

    /// Deregister a listener. No-op if it was not registered.
    pub fn remove_listener(&self, id: ListenerId, user: UserId) -> Result<(), ServiceError> {
        let mut api = self.api.lock().map_err(|_| ServiceError::StateLock)?;
        api.listeners.remove_listener(id, user);
        Ok(())
    }

    /// Dismiss an issue for a user and notify listeners if the aggregate
    /// visibly changed. Dismissal is presentation state; the underlying
    /// report is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidArgument`] for an empty issue id.
    pub fn dismiss_issue(&self, issue_id: IssueId, user: UserId) -> Result<(), ServiceError> {
        if issue_id.is_empty() {
            return Err(ServiceError::InvalidArgument("issue id is empty".into()));
        }

        let notification = {
            let mut api = self.api.lock().map_err(|_| ServiceError::StateLock)?;
            match api.store.dismiss_issue(issue_id, user) {
                Some(view) => {
                    let targets = api.listeners.snapshot(user);
                    Some((view, targets))
                }
                None => None,
            }
        };

        if let Some((view, targets)) = notification {
            self.deliver_and_prune(&targets, &view);
        }
        Ok(())
    }

    /// Wipe all stored reports and dismissals for every user. Listener
    /// registrations survive; no notification is sent.
    pub fn clear(&self) -> Result<(), ServiceError> {
        let mut api = self.api.lock().map_err(|_| ServiceError::StateLock)?;
        api.store.clear();
        Ok(())
    }

    /// Request execution of an issue's action.
    ///
    /// Accepted and recorded; the execution itself is delegated to an
    /// external collaborator and no state is mutated here.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidArgument`] for empty ids.
    pub fn execute_action(
        &self,
        issue_id: &IssueId,
        action_id: &str,
        user: UserId,
    ) -> Result<(), ServiceError> {
        if issue_id.is_empty() {
            return Err(ServiceError::InvalidArgument("issue id is empty".into()));
        }
        if action_id.is_empty() {
            return Err(ServiceError::InvalidArgument("action id is empty".into()));
        }
        info!(issue = %issue_id, action = action_id, user = %user, "action execution requested");
        self.stats.record_action();
        Ok(())
    }

    /// Register an additional source to solicit on future refresh cycles.
    pub async fn add_additional_source(&self, registration: SourceRegistration) {
        let mut coordinator = self.refresh.lock().await;
        coordinator.add_additional_source(registration);
    }

    /// Drop all dynamically registered sources.
    pub async fn clear_additional_sources(&self) {
        let mut coordinator = self.refresh.lock().await;
        coordinator.clear_additional_sources();
    }

    /// The service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Sample the service counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Apply a solicited report exactly like an external submission.
    fn apply_resubmission(&self, resubmission: Resubmission) {
        let source = resubmission.report.source_id().clone();
        if let Err(e) = self.submit_report(
            resubmission.report,
            &resubmission.package_name,
            resubmission.user,
        ) {
            warn!(source = %source, error = %e, "dropping invalid solicited report");
        }
    }

    /// Fan a view out to the snapshot targets and prune any dead handles.
    /// Must be called with no lock held.
    fn deliver_and_prune(&self, targets: &[ListenerHandle], view: &AggregateView) {
        if targets.is_empty() {
            return;
        }
        let dead = ListenerRegistry::deliver_all(targets, view);
        self.stats.record_deliveries(targets.len() - dead.len());
        self.prune_dead(&dead);
    }

    /// Remove dead handles from every scope. Takes the data lock briefly;
    /// callers must not already hold it.
    fn prune_dead(&self, dead: &[ListenerId]) {
        if dead.is_empty() {
            return;
        }
        if let Ok(mut api) = self.api.lock() {
            api.listeners.prune(dead);
        }
        self.stats.record_pruned(dead.len());
    }
}

//! Per-user listener registry.
//!
//! The registry only holds handles; it is mutated exclusively by the
//! service facade under its data lock. Delivery itself goes through the
//! associated functions [`ListenerRegistry::deliver`] and
//! [`ListenerRegistry::deliver_all`], which take no registry reference so
//! they can (and must) be called with no lock held: a listener may
//! re-enter the service API synchronously upon receiving an update.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::report::UserId;
use crate::view::AggregateView;

use super::{ListenerHandle, ListenerId};

/// Registry of live observers, partitioned by user scope.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    scopes: HashMap<UserId, Vec<ListenerHandle>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle under the user's scope.
    ///
    /// Idempotent by listener id: re-registering an already-registered
    /// handle never leads to duplicate delivery.
    pub fn add_listener(&mut self, handle: ListenerHandle, user: UserId) {
        let scope = self.scopes.entry(user).or_default();
        if scope.iter().any(|h| h.id() == handle.id()) {
            trace!(listener = %handle.id(), user = %user, "listener already registered");
            return;
        }
        debug!(listener = %handle.id(), user = %user, "listener registered");
        scope.push(handle);
    }

    /// Deregister a listener from the user's scope. No-op if absent.
    pub fn remove_listener(&mut self, id: ListenerId, user: UserId) {
        if let Some(scope) = self.scopes.get_mut(&user) {
            let before = scope.len();
            scope.retain(|h| h.id() != id);
            if scope.len() < before {
                debug!(listener = %id, user = %user, "listener removed");
            }
            if scope.is_empty() {
                self.scopes.remove(&user);
            }
        }
    }

    /// Snapshot of the live handles for a user, for delivery outside the
    /// lock.
    pub fn snapshot(&self, user: UserId) -> Vec<ListenerHandle> {
        self.scopes.get(&user).cloned().unwrap_or_default()
    }

    /// Number of listeners registered for a user.
    pub fn listener_count(&self, user: UserId) -> usize {
        self.scopes.get(&user).map(Vec::len).unwrap_or(0)
    }

    /// Remove the given listeners from every scope they appear in.
    ///
    /// Used to lazily prune handles whose channel died during delivery.
    pub fn prune(&mut self, dead: &[ListenerId]) {
        if dead.is_empty() {
            return;
        }
        self.scopes.retain(|user, scope| {
            let before = scope.len();
            scope.retain(|h| !dead.contains(&h.id()));
            if scope.len() < before {
                debug!(user = %user, pruned = before - scope.len(), "pruned dead listeners");
            }
            !scope.is_empty()
        });
    }

    /// Best-effort single-target delivery. Returns `false` when the
    /// handle's channel is dead and the handle should be pruned.
    ///
    /// Must be called with no lock held.
    pub fn deliver(handle: &ListenerHandle, view: AggregateView) -> bool {
        let delivered = handle.try_deliver(view);
        if !delivered {
            trace!(listener = %handle.id(), "delivery failed, channel dead");
        }
        delivered
    }

    /// Fan a view out to every handle in the snapshot.
    ///
    /// One dead handle never prevents delivery to the others. Returns the
    /// ids of dead handles for the caller to prune.
    ///
    /// Must be called with no lock held.
    pub fn deliver_all(handles: &[ListenerHandle], view: &AggregateView) -> Vec<ListenerId> {
        let mut dead = Vec::new();
        for handle in handles {
            if !Self::deliver(handle, view.clone()) {
                dead.push(handle.id());
            }
        }
        dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const U0: UserId = UserId(0);
    const U1: UserId = UserId(1);

    #[test]
    fn test_add_and_snapshot() {
        let mut registry = ListenerRegistry::new();
        let (handle, _rx) = ListenerHandle::connect();
        registry.add_listener(handle.clone(), U0);

        assert_eq!(registry.listener_count(U0), 1);
        assert_eq!(registry.snapshot(U0)[0].id(), handle.id());
        assert!(registry.snapshot(U1).is_empty());
    }

    #[test]
    fn test_duplicate_registration_ignored() {
        let mut registry = ListenerRegistry::new();
        let (handle, _rx) = ListenerHandle::connect();
        registry.add_listener(handle.clone(), U0);
        registry.add_listener(handle, U0);
        assert_eq!(registry.listener_count(U0), 1);
    }

    #[test]
    fn test_same_listener_in_two_scopes() {
        let mut registry = ListenerRegistry::new();
        let (handle, _rx) = ListenerHandle::connect();
        registry.add_listener(handle.clone(), U0);
        registry.add_listener(handle, U1);
        assert_eq!(registry.listener_count(U0), 1);
        assert_eq!(registry.listener_count(U1), 1);
    }

    #[test]
    fn test_remove_listener() {
        let mut registry = ListenerRegistry::new();
        let (handle, _rx) = ListenerHandle::connect();
        registry.add_listener(handle.clone(), U0);
        registry.remove_listener(handle.id(), U0);
        assert_eq!(registry.listener_count(U0), 0);
    }

    #[test]
    fn test_remove_absent_listener_is_noop() {
        let mut registry = ListenerRegistry::new();
        let (handle, _rx) = ListenerHandle::connect();
        registry.remove_listener(handle.id(), U0);
        assert_eq!(registry.listener_count(U0), 0);
    }

    #[test]
    fn test_deliver_all_isolates_dead_handles() {
        let mut registry = ListenerRegistry::new();
        let (dead_handle, dead_rx) = ListenerHandle::connect();
        let (live_handle, mut live_rx) = ListenerHandle::connect();
        registry.add_listener(dead_handle.clone(), U0);
        registry.add_listener(live_handle.clone(), U0);
        drop(dead_rx);

        let snapshot = registry.snapshot(U0);
        let dead = ListenerRegistry::deliver_all(&snapshot, &AggregateView::empty());

        assert_eq!(dead, vec![dead_handle.id()]);
        assert_eq!(live_rx.try_recv().unwrap(), AggregateView::empty());
    }

    #[test]
    fn test_prune_removes_from_every_scope() {
        let mut registry = ListenerRegistry::new();
        let (handle, rx) = ListenerHandle::connect();
        registry.add_listener(handle.clone(), U0);
        registry.add_listener(handle.clone(), U1);
        drop(rx);

        registry.prune(&[handle.id()]);
        assert_eq!(registry.listener_count(U0), 0);
        assert_eq!(registry.listener_count(U1), 0);
    }

    #[test]
    fn test_prune_with_no_dead_is_noop() {
        let mut registry = ListenerRegistry::new();
        let (handle, _rx) = ListenerHandle::connect();
        registry.add_listener(handle, U0);
        registry.prune(&[]);
        assert_eq!(registry.listener_count(U0), 1);
    }
}

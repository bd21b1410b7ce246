//! Builder for wiring a [`SafetyHubService`].

use std::sync::Arc;

use crate::refresh::SourceRegistration;

use super::config::{FeatureGate, ServiceConfig, StaticGate};
use super::facade::SafetyHubService;

/// Builds a [`SafetyHubService`] from its configuration, enablement gate,
/// and configured source set.
///
/// Loading the configured sources themselves (which sources exist, their
/// packages, their connectors) is an external collaborator's job; the
/// builder just accepts the result.
pub struct ServiceBuilder {
    config: ServiceConfig,
    gate: Arc<dyn FeatureGate>,
    sources: Vec<SourceRegistration>,
}

impl ServiceBuilder {
    /// Start a builder with default configuration and an always-enabled
    /// gate.
    pub fn new() -> Self {
        Self {
            config: ServiceConfig::default(),
            gate: Arc::new(StaticGate(true)),
            sources: Vec::new(),
        }
    }

    /// Set the service configuration.
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the enablement gate.
    pub fn feature_gate(mut self, gate: Arc<dyn FeatureGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Add a configured source to solicit on refresh cycles.
    pub fn source(mut self, registration: SourceRegistration) -> Self {
        self.sources.push(registration);
        self
    }

    /// Wire the service.
    pub fn build(self) -> Arc<SafetyHubService> {
        SafetyHubService::new(self.config, self.gate, self.sources)
    }
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

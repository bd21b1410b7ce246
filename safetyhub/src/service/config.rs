//! Service configuration and the enablement gate.

use std::time::Duration;

/// Default solicitation window for a refreshed source.
const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`super::SafetyHubService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Solicitation window applied to sources that do not override it.
    source_timeout: Duration,
}

impl ServiceConfig {
    /// Start building a configuration.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Default per-source solicitation window for refresh cycles.
    pub fn source_timeout(&self) -> Duration {
        self.source_timeout
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug, Clone, Default)]
pub struct ServiceConfigBuilder {
    source_timeout: Option<Duration>,
}

impl ServiceConfigBuilder {
    /// Set the default per-source solicitation window.
    pub fn source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = Some(timeout);
        self
    }

    /// Build the configuration, filling unset fields with defaults.
    pub fn build(self) -> ServiceConfig {
        let defaults = ServiceConfig::default();
        ServiceConfig {
            source_timeout: self.source_timeout.unwrap_or(defaults.source_timeout),
        }
    }
}

/// Whether the service is enabled at all.
///
/// The actual gating inputs (feature flags, device configuration) live
/// with an external collaborator; this seam only exposes the decision.
pub trait FeatureGate: Send + Sync {
    /// Whether the service is currently enabled.
    fn is_enabled(&self) -> bool;
}

/// A gate with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticGate(pub bool);

impl FeatureGate for StaticGate {
    fn is_enabled(&self) -> bool {
        self.0
    }
}

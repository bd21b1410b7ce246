//! Service facade: the synchronization boundary of the whole core.
//!
//! The facade owns the two mutually exclusive lock domains (data lock,
//! refresh lock) and is the only component permitted to mutate the report
//! store and the listener registry. Its single most important invariant:
//! **mutate under lock, then notify lock-free**.

mod builder;
mod config;
mod error;
mod facade;

pub use builder::ServiceBuilder;
pub use config::{FeatureGate, ServiceConfig, ServiceConfigBuilder, StaticGate};
pub use error::ServiceError;
pub use facade::SafetyHubService;

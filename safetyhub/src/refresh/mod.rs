//! Refresh coordination: soliciting sources to resubmit their reports.
//!
//! Refresh cycles run under the service facade's refresh lock, a domain
//! entirely separate from the data lock, so slow multi-source solicitation
//! never stalls ordinary read/write API calls. Solicited reports re-enter
//! the normal submission path through the facade's resubmission channel.

mod connector;
mod coordinator;

pub use connector::{SourceConnector, StaticConnector};
pub use coordinator::{RefreshCoordinator, RefreshReason, Resubmission, SourceRegistration};

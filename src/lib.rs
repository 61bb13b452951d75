//! reachmap library: privilege-escalation edge identification between cloud principals.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod concurrency;
pub mod domain;
pub mod error;

pub use app::dispatcher::{DispatchConfig, EdgeDispatcher, identify_edges};
pub use app::registry::CheckerRegistry;
pub use domain::edge::Edge;
pub use domain::node::Node;
pub use error::{EdgeError, Result};

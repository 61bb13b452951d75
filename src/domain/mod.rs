pub mod edge;
pub mod node;
pub mod ports;
pub mod query;

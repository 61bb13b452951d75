//! Edge-checker adapters
//!
//! Each checker encodes one resource-type-specific heuristic for discovering
//! escalation edges. Only the identity-service checker ships with the crate;
//! other strategies plug in through the registry.

pub mod iam;

pub use iam::IamEdgeChecker;

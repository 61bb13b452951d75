//! Authorizer adapters
//!
//! The real policy evaluator lives outside the engine. These adapters cover a
//! grant-table stand-in and on-disk memoization of any authorizer.

pub mod cached;
pub mod grants;

pub use cached::CachedAuthorizer;
pub use grants::{Effect, Grant, GrantTableAuthorizer};

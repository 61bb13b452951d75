use crate::domain::edge::Edge;
use crate::domain::node::Node;
use crate::domain::query::EdgeQuery;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Condition keys supplied with an authorization request
pub type ConditionContext = BTreeMap<String, String>;

/// Outcome of evaluating one action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationResult {
    pub allowed: bool,
    pub mfa_required: bool,
}

impl AuthorizationResult {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            mfa_required: false,
        }
    }

    pub fn allow_with_mfa() -> Self {
        Self {
            allowed: true,
            mfa_required: true,
        }
    }

    pub fn deny() -> Self {
        Self::default()
    }
}

/// Policy evaluation port (implemented outside the engine).
///
/// Implementations must apply explicit-deny precedence and any SCPs they were
/// configured with. Errors propagate to the caller unchanged.
pub trait Authorizer: Send + Sync {
    fn evaluate(
        &self,
        principal: &Node,
        action: &str,
        resource: &str,
        context: &ConditionContext,
        debug: bool,
    ) -> Result<AuthorizationResult>;
}

impl<A: Authorizer + ?Sized> Authorizer for Arc<A> {
    fn evaluate(
        &self,
        principal: &Node,
        action: &str,
        resource: &str,
        context: &ConditionContext,
        debug: bool,
    ) -> Result<AuthorizationResult> {
        (**self).evaluate(principal, action, resource, context, debug)
    }
}

/// One resource-type-specific strategy for discovering escalation edges.
///
/// Checkers must not mutate the nodes in `query` and leave error handling to
/// the dispatcher.
#[async_trait]
pub trait EdgeChecker: Send + Sync {
    /// Registry name of the checker (e.g. "iam")
    fn name(&self) -> &'static str;

    async fn return_edges(&self, query: Arc<EdgeQuery>) -> Result<Vec<Edge>>;
}

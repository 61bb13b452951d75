//! Mock implementations for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reachmap::domain::edge::Edge;
use reachmap::domain::node::Node;
use reachmap::domain::ports::{AuthorizationResult, Authorizer, ConditionContext, EdgeChecker};
use reachmap::domain::query::EdgeQuery;
use reachmap::{EdgeError, Result};

/// Authorizer answering from a (source, action, destination) table; anything
/// not scripted is denied.
#[derive(Default)]
pub struct ScriptedAuthorizer {
    answers: HashMap<(String, String, String), AuthorizationResult>,
    calls: AtomicUsize,
}

impl ScriptedAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(
        mut self,
        source: &Node,
        action: &str,
        destination: &Node,
        result: AuthorizationResult,
    ) -> Self {
        self.answers.insert(
            (source.arn.clone(), action.to_string(), destination.arn.clone()),
            result,
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Authorizer for ScriptedAuthorizer {
    fn evaluate(
        &self,
        principal: &Node,
        action: &str,
        resource: &str,
        _context: &ConditionContext,
        _debug: bool,
    ) -> Result<AuthorizationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .answers
            .get(&(principal.arn.clone(), action.to_string(), resource.to_string()))
            .copied()
            .unwrap_or_default())
    }
}

/// Checker returning a fixed set of edges after an optional delay.
pub struct StaticChecker {
    pub name: &'static str,
    pub edges: Vec<Edge>,
    pub delay: Duration,
}

impl StaticChecker {
    pub fn new(name: &'static str, edges: Vec<Edge>) -> Self {
        Self {
            name,
            edges,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl EdgeChecker for StaticChecker {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn return_edges(&self, _query: Arc<EdgeQuery>) -> Result<Vec<Edge>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.edges.clone())
    }
}

/// Checker that always fails with the given error.
pub struct FailingChecker {
    pub error: EdgeError,
}

#[async_trait]
impl EdgeChecker for FailingChecker {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn return_edges(&self, _query: Arc<EdgeQuery>) -> Result<Vec<Edge>> {
        Err(self.error.clone())
    }
}

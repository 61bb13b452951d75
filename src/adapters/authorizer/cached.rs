use crate::adapters::storage::{CacheKey, DiskCache};
use crate::domain::node::Node;
use crate::domain::ports::{AuthorizationResult, Authorizer, ConditionContext};
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;

/// Cache operation name for authorization results
pub const OPERATION: &str = "authorize";

#[derive(Serialize)]
struct AuthorizationRequest<'a> {
    principal: &'a Node,
    action: &'a str,
    resource: &'a str,
    context: &'a ConditionContext,
}

/// Memoizes another authorizer's answers on disk, across runs.
pub struct CachedAuthorizer<A> {
    inner: A,
    cache: Arc<DiskCache>,
}

impl<A: Authorizer> CachedAuthorizer<A> {
    pub fn new(inner: A, cache: Arc<DiskCache>) -> Self {
        Self { inner, cache }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn cache(&self) -> &DiskCache {
        &self.cache
    }
}

impl<A: Authorizer> Authorizer for CachedAuthorizer<A> {
    fn evaluate(
        &self,
        principal: &Node,
        action: &str,
        resource: &str,
        context: &ConditionContext,
        debug: bool,
    ) -> Result<AuthorizationResult> {
        let key = CacheKey::derive(&AuthorizationRequest {
            principal,
            action,
            resource,
            context,
        })?;
        self.cache.memoize(OPERATION, &key, || {
            self.inner.evaluate(principal, action, resource, context, debug)
        })
    }
}

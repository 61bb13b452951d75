use crate::app::pool::CpuPool;
use crate::domain::edge::{Edge, reason_with_mfa};
use crate::domain::node::{Node, PrincipalKind};
use crate::domain::ports::{AuthorizationResult, Authorizer, ConditionContext, EdgeChecker};
use crate::domain::query::EdgeQuery;
use crate::error::Result;
use async_trait::async_trait;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

pub const CREATE_ACCESS_KEY: &str = "iam:CreateAccessKey";
pub const DELETE_ACCESS_KEY: &str = "iam:DeleteAccessKey";
pub const CREATE_LOGIN_PROFILE: &str = "iam:CreateLoginProfile";
pub const UPDATE_LOGIN_PROFILE: &str = "iam:UpdateLoginProfile";
pub const UPDATE_ASSUME_ROLE_POLICY: &str = "iam:UpdateAssumeRolePolicy";

pub const ACCESS_KEY_REASON: &str = "can create access keys to authenticate as";
pub const PASSWORD_REASON: &str = "can set the password to authenticate as";
pub const TRUST_POLICY_REASON: &str = "can update the trust document to access";

const SHORT_REASON: &str = "IAM";

/// Platform limit on access keys per user
const MAX_ACCESS_KEYS: u8 = 2;

/// Finds edges a principal gains through the identity service itself:
/// minting access keys, setting passwords, rewriting role trust documents.
pub struct IamEdgeChecker {
    pool: CpuPool,
    authorizer: Arc<dyn Authorizer>,
    debug: bool,
}

impl IamEdgeChecker {
    pub fn new(pool: CpuPool, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            pool,
            authorizer,
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

#[async_trait]
impl EdgeChecker for IamEdgeChecker {
    fn name(&self) -> &'static str {
        "iam"
    }

    async fn return_edges(&self, query: Arc<EdgeQuery>) -> Result<Vec<Edge>> {
        let authorizer = Arc::clone(&self.authorizer);
        let debug = self.debug;
        let nodes = Arc::clone(&query.nodes);

        let edges = self
            .pool
            .run(move || identify_edges(authorizer.as_ref(), &nodes, debug))
            .await??;

        debug!(count = edges.len(), "IAM checker finished");
        Ok(edges)
    }
}

/// Pairwise scan; sources are spread across the current rayon pool.
pub fn identify_edges(authorizer: &dyn Authorizer, nodes: &[Node], debug: bool) -> Result<Vec<Edge>> {
    let per_source = nodes
        .par_iter()
        // Admins already reach everything; O(n) edges each would only bloat the graph.
        .filter(|source| !source.is_admin)
        .map(|source| {
            let mut edges = Vec::new();
            for destination in nodes {
                if source.arn == destination.arn {
                    continue;
                }
                edges.extend(edges_between(authorizer, source, destination, debug)?);
            }
            Ok(edges)
        })
        .collect::<Result<Vec<Vec<Edge>>>>()?;

    Ok(per_source.into_iter().flatten().collect())
}

/// Edges from `source` to one `destination`.
pub fn edges_between(
    authorizer: &dyn Authorizer,
    source: &Node,
    destination: &Node,
    debug: bool,
) -> Result<Vec<Edge>> {
    let mut edges = Vec::new();
    if source.is_admin || source.arn == destination.arn {
        return Ok(edges);
    }

    let check = |action: &str| -> Result<AuthorizationResult> {
        authorizer.evaluate(source, action, &destination.arn, &ConditionContext::new(), debug)
    };

    match destination.kind() {
        PrincipalKind::User => {
            let create = check(CREATE_ACCESS_KEY)?;
            let mut allowed = create.allowed;
            let mut mfa = create.mfa_required;

            // At the limit an existing key has to go before a new one can be issued.
            if destination.access_keys >= MAX_ACCESS_KEYS {
                let delete = check(DELETE_ACCESS_KEY)?;
                allowed &= delete.allowed;
                mfa |= delete.mfa_required;
            }

            if allowed {
                edges.push(Edge::new(
                    source,
                    destination,
                    reason_with_mfa(ACCESS_KEY_REASON, mfa),
                    SHORT_REASON,
                ));
            }

            // A login profile can only be updated if one exists.
            let password_action = if destination.active_password {
                UPDATE_LOGIN_PROFILE
            } else {
                CREATE_LOGIN_PROFILE
            };
            let password = check(password_action)?;
            if password.allowed {
                edges.push(Edge::new(
                    source,
                    destination,
                    reason_with_mfa(PASSWORD_REASON, password.mfa_required),
                    SHORT_REASON,
                ));
            }
        }
        PrincipalKind::Role => {
            let trust = check(UPDATE_ASSUME_ROLE_POLICY)?;
            if trust.allowed {
                edges.push(Edge::new(
                    source,
                    destination,
                    reason_with_mfa(TRUST_POLICY_REASON, trust.mfa_required),
                    SHORT_REASON,
                ));
            }
        }
        PrincipalKind::Other => {}
    }

    Ok(edges)
}

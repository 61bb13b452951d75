use crate::domain::node::Node;
use crate::domain::ports::{AuthorizationResult, Authorizer, ConditionContext};
use crate::error::{EdgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

/// One row of the grant table. `principal`, `action` and `resource` accept
/// `*` or a trailing-`*` prefix pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub principal: String,
    pub action: String,
    pub resource: String,
    #[serde(default)]
    pub effect: Effect,
    #[serde(default)]
    pub mfa_required: bool,
}

impl Grant {
    pub fn allow(
        principal: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            principal: principal.into(),
            action: action.into(),
            resource: resource.into(),
            effect: Effect::Allow,
            mfa_required: false,
        }
    }

    pub fn deny(
        principal: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            effect: Effect::Deny,
            ..Self::allow(principal, action, resource)
        }
    }

    pub fn with_mfa(mut self) -> Self {
        self.mfa_required = true;
        self
    }

    fn matches(&self, principal: &str, action: &str, resource: &str) -> bool {
        pattern_matches(&self.principal, principal)
            && pattern_matches(&self.action, action)
            && pattern_matches(&self.resource, resource)
    }
}

/// Deterministic authorizer over a flat list of grants.
///
/// Explicit deny beats allow. Admin principals are allowed everything. MFA is
/// required only when every matching allow demands it. Not a policy-language
/// evaluator: conditions and SCPs are out of its reach.
#[derive(Debug, Clone, Default)]
pub struct GrantTableAuthorizer {
    grants: Vec<Grant>,
}

impl GrantTableAuthorizer {
    pub fn new(grants: Vec<Grant>) -> Self {
        Self { grants }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| EdgeError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }
}

impl Authorizer for GrantTableAuthorizer {
    fn evaluate(
        &self,
        principal: &Node,
        action: &str,
        resource: &str,
        _context: &ConditionContext,
        debug: bool,
    ) -> Result<AuthorizationResult> {
        if principal.is_admin {
            return Ok(AuthorizationResult::allow());
        }

        let matching: Vec<&Grant> = self
            .grants
            .iter()
            .filter(|g| g.matches(&principal.arn, action, resource))
            .collect();

        let result = if matching.iter().any(|g| g.effect == Effect::Deny) {
            AuthorizationResult::deny()
        } else {
            // No deny matched, so every remaining grant is an allow.
            let allowed = !matching.is_empty();
            AuthorizationResult {
                allowed,
                mfa_required: allowed && matching.iter().all(|g| g.mfa_required),
            }
        };

        if debug {
            debug!(
                principal = %principal.arn,
                action,
                resource,
                allowed = result.allowed,
                mfa = result.mfa_required,
                "Evaluated grant table"
            );
        }
        Ok(result)
    }
}

fn pattern_matches(pattern: &str, value: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => value.starts_with(prefix),
        None => pattern == value,
    }
}

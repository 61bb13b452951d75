use crate::domain::node::{Node, NodeId};
use serde::{Deserialize, Serialize};

/// Prefix applied to a reason when the action must be performed with MFA
pub const MFA_PREFIX: &str = "(MFA required) ";

/// Directed escalation relationship: `source` can obtain the permissions of
/// `destination` by the mechanism described in `reason`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub destination: NodeId,
    pub reason: String,
    /// Short tag of the checker that produced the edge (e.g. "IAM")
    pub short_reason: String,
}

impl Edge {
    pub fn new(
        source: &Node,
        destination: &Node,
        reason: impl Into<String>,
        short_reason: impl Into<String>,
    ) -> Self {
        debug_assert_ne!(source.arn, destination.arn, "self-edges are never produced");
        Self {
            source: source.arn.clone(),
            destination: destination.arn.clone(),
            reason: reason.into(),
            short_reason: short_reason.into(),
        }
    }

    pub fn requires_mfa(&self) -> bool {
        self.reason.starts_with(MFA_PREFIX)
    }

    /// Human-readable sentence: `<source> <reason> <destination>`
    pub fn describe(&self) -> String {
        format!("{} {} {}", self.source, self.reason, self.destination)
    }
}

/// Prepends the MFA marker when any contributing check demanded MFA.
pub fn reason_with_mfa(reason: &str, mfa_required: bool) -> String {
    if mfa_required {
        format!("{MFA_PREFIX}{reason}")
    } else {
        reason.to_string()
    }
}

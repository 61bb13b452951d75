use serde::{Deserialize, Serialize};

/// Principal identifier (ARN-like string)
pub type NodeId = String;

/// Kind of principal, derived from the ARN resource segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    User,
    Role,
    Other,
}

impl PrincipalKind {
    pub fn from_arn(arn: &str) -> Self {
        if arn.contains(":user/") {
            PrincipalKind::User
        } else if arn.contains(":role/") {
            PrincipalKind::Role
        } else {
            PrincipalKind::Other
        }
    }
}

/// A cloud identity.
///
/// Nodes are read-only while edges are identified: checkers receive them
/// behind a shared slice and never mutate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub arn: NodeId,

    /// True when the principal's policies grant unrestricted access
    #[serde(default)]
    pub is_admin: bool,

    /// Number of access keys attached (0..=2), users only
    #[serde(default)]
    pub access_keys: u8,

    /// Whether a console password is set, users only
    #[serde(default)]
    pub active_password: bool,
}

impl Node {
    pub fn new(arn: impl Into<NodeId>) -> Self {
        Self {
            arn: arn.into(),
            is_admin: false,
            access_keys: 0,
            active_password: false,
        }
    }

    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    pub fn with_access_keys(mut self, count: u8) -> Self {
        self.access_keys = count;
        self
    }

    pub fn with_active_password(mut self, active: bool) -> Self {
        self.active_password = active;
        self
    }

    pub fn kind(&self) -> PrincipalKind {
        PrincipalKind::from_arn(&self.arn)
    }
}

use crate::domain::node::Node;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One SCP level: the policy documents attached at that level of the organization
pub type ScpLevel = Vec<Value>;

/// Per-service client overrides (service name → arguments)
pub type ClientConfig = BTreeMap<String, ClientArgs>;

/// Opaque caller credentials handle.
///
/// The engine threads it through to checkers untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub profile: Option<String>,
    pub account_id: Option<String>,
}

impl Session {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            profile: None,
            account_id: Some(account_id.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientArgs {
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

/// Optional inputs of an edge-identification run
#[derive(Debug, Clone, Default)]
pub struct EdgeOptions {
    pub region_allow_list: Option<Vec<String>>,
    pub region_deny_list: Option<Vec<String>>,
    pub scps: Option<Vec<ScpLevel>>,
    pub client_config: Option<ClientConfig>,
}

/// Everything a checker receives for one run, shared read-only between the
/// concurrently running checkers.
#[derive(Debug, Clone)]
pub struct EdgeQuery {
    pub nodes: Arc<[Node]>,
    pub options: EdgeOptions,
    pub session: Session,
}

impl EdgeQuery {
    pub fn new(nodes: impl Into<Arc<[Node]>>, options: EdgeOptions, session: Session) -> Self {
        Self {
            nodes: nodes.into(),
            options,
            session,
        }
    }
}

//! Principal builders for integration tests.
#![allow(dead_code)]

use reachmap::Node;

pub const ACCOUNT: &str = "111111111111";

pub fn user(name: &str) -> Node {
    Node::new(format!("arn:aws:iam::{ACCOUNT}:user/{name}"))
}

pub fn role(name: &str) -> Node {
    Node::new(format!("arn:aws:iam::{ACCOUNT}:role/{name}"))
}

/// Admin, UserA (one key), UserB (two keys, password set).
pub fn escalation_scenario() -> Vec<Node> {
    vec![
        user("Admin").admin(),
        user("UserA").with_access_keys(1),
        user("UserB").with_access_keys(2).with_active_password(true),
    ]
}

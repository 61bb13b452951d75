//! Dispatcher tests: checker selection, aggregation, fail-fast, and the
//! identity-service escalation scenarios.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::fixtures::{escalation_scenario, role, user};
use common::mock::{FailingChecker, ScriptedAuthorizer, StaticChecker};
use reachmap::adapters::checkers::iam::{
    ACCESS_KEY_REASON, CREATE_ACCESS_KEY, DELETE_ACCESS_KEY, PASSWORD_REASON,
    UPDATE_ASSUME_ROLE_POLICY, UPDATE_LOGIN_PROFILE,
};
use reachmap::domain::edge::{Edge, MFA_PREFIX};
use reachmap::domain::ports::{AuthorizationResult, EdgeChecker};
use reachmap::domain::query::{EdgeOptions, Session};
use reachmap::{CheckerRegistry, DispatchConfig, EdgeDispatcher, EdgeError, Node};

fn dispatcher(registry: CheckerRegistry, authorizer: ScriptedAuthorizer) -> EdgeDispatcher {
    EdgeDispatcher::new(
        registry,
        Arc::new(authorizer),
        DispatchConfig {
            cpu_workers: Some(2),
            debug: false,
        },
    )
}

async fn run(dispatcher: &EdgeDispatcher, names: &[&str], nodes: &[Node]) -> reachmap::Result<Vec<Edge>> {
    dispatcher
        .identify_edges(&Session::new("111111111111"), names, nodes, EdgeOptions::default())
        .await
}

#[tokio::test]
async fn test_unrecognized_names_return_empty() {
    let d = dispatcher(CheckerRegistry::builtin(), ScriptedAuthorizer::new());
    let nodes = escalation_scenario();

    assert!(run(&d, &[], &nodes).await.unwrap().is_empty());
    assert!(run(&d, &["ec2", "lambda", "bogus"], &nodes).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_scenario_delete_denied_yields_no_edges() {
    let nodes = escalation_scenario();
    let (a, b) = (&nodes[1], &nodes[2]);
    let auth = ScriptedAuthorizer::new()
        .answer(a, CREATE_ACCESS_KEY, b, AuthorizationResult::allow())
        .answer(a, DELETE_ACCESS_KEY, b, AuthorizationResult::deny())
        .answer(a, UPDATE_LOGIN_PROFILE, b, AuthorizationResult::deny());
    let d = dispatcher(CheckerRegistry::builtin(), auth);

    let edges = run(&d, &["iam"], &nodes).await.unwrap();
    assert!(edges.is_empty(), "unexpected edges: {:?}", edges);
}

#[tokio::test]
async fn test_scenario_delete_granted_yields_one_edge() {
    let nodes = escalation_scenario();
    let (a, b) = (&nodes[1], &nodes[2]);
    let auth = ScriptedAuthorizer::new()
        .answer(a, CREATE_ACCESS_KEY, b, AuthorizationResult::allow())
        .answer(a, DELETE_ACCESS_KEY, b, AuthorizationResult::allow());
    let d = dispatcher(CheckerRegistry::builtin(), auth);

    let edges = run(&d, &["iam"], &nodes).await.unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].source, a.arn);
    assert_eq!(edges[0].destination, b.arn);
    assert_eq!(edges[0].reason, ACCESS_KEY_REASON);
}

#[tokio::test]
async fn test_admin_has_no_outgoing_edges_and_no_self_edges() {
    let admin = user("Admin").admin();
    let alice = user("alice");
    let deploy = role("deploy");
    let nodes = vec![admin.clone(), alice.clone(), deploy.clone()];

    let mut auth = ScriptedAuthorizer::new();
    for src in &nodes {
        for dst in &nodes {
            for action in [CREATE_ACCESS_KEY, UPDATE_ASSUME_ROLE_POLICY] {
                auth = auth.answer(src, action, dst, AuthorizationResult::allow());
            }
        }
    }
    let d = dispatcher(CheckerRegistry::builtin(), auth);

    let edges = run(&d, &["iam"], &nodes).await.unwrap();
    assert!(edges.iter().all(|e| e.source != admin.arn));
    assert!(edges.iter().all(|e| e.source != e.destination));
    // alice → admin (keys), alice → deploy (trust), deploy → alice (keys), deploy → admin (keys)
    assert_eq!(edges.len(), 4);
}

#[tokio::test]
async fn test_mfa_prefix_only_when_a_check_required_it() {
    let alice = user("alice");
    let bob = user("bob").with_active_password(true);
    let nodes = vec![alice.clone(), bob.clone()];
    let auth = ScriptedAuthorizer::new()
        .answer(&alice, CREATE_ACCESS_KEY, &bob, AuthorizationResult::allow())
        .answer(&alice, UPDATE_LOGIN_PROFILE, &bob, AuthorizationResult::allow_with_mfa());
    let d = dispatcher(CheckerRegistry::builtin(), auth);

    let edges = run(&d, &["iam"], &nodes).await.unwrap();
    assert_eq!(edges.len(), 2);
    let keys = edges.iter().find(|e| e.reason.ends_with(ACCESS_KEY_REASON)).unwrap();
    let password = edges.iter().find(|e| e.reason.ends_with(PASSWORD_REASON)).unwrap();
    assert!(!keys.reason.starts_with(MFA_PREFIX));
    assert!(password.reason.starts_with(MFA_PREFIX));
}

#[tokio::test]
async fn test_results_of_all_checkers_are_concatenated() {
    let a = user("a");
    let b = user("b");
    let c = role("c");
    let first = Edge::new(&a, &b, "can poke", "ONE");
    let second = Edge::new(&b, &c, "can prod", "TWO");

    let (e1, e2) = (first.clone(), second.clone());
    let registry = CheckerRegistry::new()
        .register("one", move |_| {
            Arc::new(StaticChecker::new("one", vec![e1.clone()]).delayed(Duration::from_millis(20)))
                as Arc<dyn EdgeChecker>
        })
        .register("two", move |_| {
            Arc::new(StaticChecker::new("two", vec![e2.clone()])) as Arc<dyn EdgeChecker>
        });
    let d = dispatcher(registry, ScriptedAuthorizer::new());

    let mut edges = run(&d, &["one", "two", "three"], &[a, b, c]).await.unwrap();
    edges.sort_by(|x, y| x.short_reason.cmp(&y.short_reason));
    assert_eq!(edges, vec![first, second]);
}

#[tokio::test]
async fn test_first_checker_error_is_returned_unchanged() {
    let err = EdgeError::checker("ec2", "DescribeInstances throttled");
    let raised = err.clone();
    let registry = CheckerRegistry::builtin()
        .register("slow", |_| {
            Arc::new(StaticChecker::new("slow", Vec::new()).delayed(Duration::from_millis(200)))
                as Arc<dyn EdgeChecker>
        })
        .register("failing", move |_| {
            Arc::new(FailingChecker {
                error: raised.clone(),
            }) as Arc<dyn EdgeChecker>
        });
    let d = dispatcher(registry, ScriptedAuthorizer::new());

    let result = run(&d, &["iam", "slow", "failing"], &escalation_scenario()).await;
    assert_eq!(result, Err(err));
}

#[tokio::test]
async fn test_nodes_are_not_mutated() {
    let nodes = escalation_scenario();
    let before = nodes.clone();
    let auth = ScriptedAuthorizer::new().answer(
        &nodes[1],
        CREATE_ACCESS_KEY,
        &nodes[2],
        AuthorizationResult::allow(),
    );
    let d = dispatcher(CheckerRegistry::builtin(), auth);

    run(&d, &["iam"], &nodes).await.unwrap();
    assert_eq!(nodes, before);
}

use crate::app::pool::CpuPool;
use crate::app::registry::{CheckerEnv, CheckerRegistry};
use crate::concurrency::{FailurePolicy, check};
use crate::domain::edge::Edge;
use crate::domain::node::Node;
use crate::domain::ports::Authorizer;
use crate::domain::query::{EdgeOptions, EdgeQuery, Session};
use crate::error::Result;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Dispatcher configuration
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    /// CPU pool size; half the logical cores when unset
    pub cpu_workers: Option<usize>,

    /// Forwarded to every authorizer call
    pub debug: bool,
}

/// Runs the selected checkers concurrently and gathers their edges.
///
/// # Concurrency
///
/// ```text
/// identify_edges ── tokio task per checker ──┐
///                                            ├─ CpuPool (shared, per run)
///                                            └─ Authorizer
/// ```
///
/// The first checker failure is returned as-is. Remaining checker tasks are
/// detached rather than aborted; the pool is torn down once they let go of it.
pub struct EdgeDispatcher {
    registry: CheckerRegistry,
    authorizer: Arc<dyn Authorizer>,
    config: DispatchConfig,
}

impl EdgeDispatcher {
    pub fn new(
        registry: CheckerRegistry,
        authorizer: Arc<dyn Authorizer>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            authorizer,
            config,
        }
    }

    /// Edges between `nodes` found by the checkers named in `checker_names`.
    /// Unknown names are ignored. Result order is unspecified.
    pub async fn identify_edges<S: AsRef<str>>(
        &self,
        session: &Session,
        checker_names: &[S],
        nodes: &[Node],
        options: EdgeOptions,
    ) -> Result<Vec<Edge>> {
        let start = Instant::now();
        info!("Initiating edge checks");

        let selected = self.registry.resolve(checker_names);
        debug!(?selected, "Services being checked for edges");
        if selected.is_empty() {
            return Ok(Vec::new());
        }

        let env = CheckerEnv {
            pool: CpuPool::new(
                self.config
                    .cpu_workers
                    .unwrap_or_else(CpuPool::default_size),
            )?,
            authorizer: Arc::clone(&self.authorizer),
            debug: self.config.debug,
        };
        let query = Arc::new(EdgeQuery::new(nodes.to_vec(), options, session.clone()));

        let tasks: Vec<_> = selected
            .iter()
            .filter_map(|name| self.registry.build(name, &env))
            .map(|checker| {
                let query = Arc::clone(&query);
                tokio::spawn(async move { checker.return_edges(query).await })
            })
            .collect();
        // Checkers hold their own pool handles from here on.
        drop(env);

        let mut results = check(tasks, FailurePolicy::Strict);
        let mut edges = Vec::new();
        while let Some(batch) = results.next().await {
            edges.extend(batch?);
        }

        info!(
            checkers = selected.len(),
            edges = edges.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Edge checks complete"
        );
        Ok(edges)
    }
}

/// One-shot entry point over the built-in registry and default configuration.
pub async fn identify_edges<S: AsRef<str>>(
    session: &Session,
    checker_names: &[S],
    nodes: &[Node],
    authorizer: Arc<dyn Authorizer>,
    options: EdgeOptions,
) -> Result<Vec<Edge>> {
    EdgeDispatcher::new(CheckerRegistry::builtin(), authorizer, DispatchConfig::default())
        .identify_edges(session, checker_names, nodes, options)
        .await
}

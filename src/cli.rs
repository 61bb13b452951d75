use crate::adapters::authorizer::{CachedAuthorizer, GrantTableAuthorizer};
use crate::adapters::storage::{DiskCache, storage_root};
use crate::app::dispatcher::{DispatchConfig, EdgeDispatcher};
use crate::app::registry::CheckerRegistry;
use crate::domain::node::Node;
use crate::domain::ports::Authorizer;
use crate::domain::query::{EdgeOptions, Session};
use anyhow::{Context as _, Result, bail};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Inputs of the `edges` command
#[derive(Debug, Clone)]
pub struct EdgesCommand {
    pub nodes_path: PathBuf,
    pub grants_path: PathBuf,
    pub checkers: Vec<String>,
    pub account: Option<String>,
    pub use_cache: bool,
    pub region_allow_list: Option<Vec<String>>,
    pub region_deny_list: Option<Vec<String>>,
    pub workers: Option<usize>,
    pub json: bool,
    pub debug: bool,
}

/// Load principals from a JSON array of nodes.
pub fn load_nodes(path: &Path) -> Result<Vec<Node>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read nodes file: {}", path.display()))?;
    serde_json::from_str(&json).context("Failed to parse nodes JSON")
}

pub async fn find_and_display_edges(cmd: EdgesCommand) -> Result<()> {
    let nodes = load_nodes(&cmd.nodes_path)?;
    let grants = GrantTableAuthorizer::load(&cmd.grants_path).context("Failed to load grants")?;

    let authorizer: Arc<dyn Authorizer> = if cmd.use_cache {
        let Some(account) = cmd.account.as_deref() else {
            bail!("--cache requires --account");
        };
        let cache = DiskCache::open(account).context("Failed to open cache")?;
        Arc::new(CachedAuthorizer::new(grants, Arc::new(cache)))
    } else {
        Arc::new(grants)
    };

    let dispatcher = EdgeDispatcher::new(
        CheckerRegistry::builtin(),
        authorizer,
        DispatchConfig {
            cpu_workers: cmd.workers,
            debug: cmd.debug,
        },
    );
    let session = Session {
        profile: None,
        account_id: cmd.account.clone(),
    };
    let options = EdgeOptions {
        region_allow_list: cmd.region_allow_list.clone(),
        region_deny_list: cmd.region_deny_list.clone(),
        ..EdgeOptions::default()
    };

    let mut edges = dispatcher
        .identify_edges(&session, &cmd.checkers, &nodes, options)
        .await
        .context("Edge identification failed")?;
    edges.sort_by(|a, b| {
        (&a.source, &a.destination, &a.reason).cmp(&(&b.source, &b.destination, &b.reason))
    });

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&edges)?);
        return Ok(());
    }

    println!("Principals: {}", nodes.len());
    println!("Edges: {}", edges.len());
    println!("{}", "=".repeat(80));
    for edge in &edges {
        println!("[{}] {}", edge.short_reason, edge.describe());
    }
    Ok(())
}

pub fn display_checkers(registry: &CheckerRegistry) {
    println!("Available edge checkers:");
    for name in registry.names() {
        println!("  {}", name);
    }
}

pub fn clear_cache(account: &str, operation: Option<&str>) -> Result<()> {
    let cache = DiskCache::open(account).context("Failed to open cache")?;
    match operation {
        Some(op) => {
            cache
                .clear(op)
                .with_context(|| format!("Failed to clear cache for operation: {}", op))?;
            println!("Cleared '{}' cache for {}", op, account);
        }
        None => {
            cache.clear_all().context("Failed to clear cache")?;
            println!("Cleared all cached results for {}", account);
        }
    }
    Ok(())
}

pub fn display_storage_root() -> Result<()> {
    let root = storage_root().context("Failed to resolve storage root")?;
    println!("{}", root.display());
    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use reachmap::CheckerRegistry;
use reachmap::cli::{self, EdgesCommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reachmap", version, about = "Find privilege-escalation edges between cloud principals")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify edges between the given principals
    Edges {
        /// JSON array of principals
        #[arg(long)]
        nodes: PathBuf,

        /// JSON grant table used to answer authorization checks
        #[arg(long)]
        grants: PathBuf,

        /// Checkers to run (comma separated); unknown names are ignored
        #[arg(long, value_delimiter = ',', default_value = "iam")]
        checkers: Vec<String>,

        /// Account or organization id; scopes the cache
        #[arg(long)]
        account: Option<String>,

        /// Memoize authorization results on disk
        #[arg(long, requires = "account")]
        cache: bool,

        #[arg(long, value_delimiter = ',')]
        region_allow: Option<Vec<String>>,

        #[arg(long, value_delimiter = ',')]
        region_deny: Option<Vec<String>>,

        /// CPU worker threads (defaults to half the logical cores)
        #[arg(long)]
        workers: Option<usize>,

        /// Print edges as JSON
        #[arg(long)]
        json: bool,
    },
    /// List available edge checkers
    Checkers,
    /// Delete cached results for an account
    CacheClear {
        #[arg(long)]
        account: String,

        /// Only clear this operation's cache file
        #[arg(long)]
        operation: Option<String>,
    },
    /// Print the storage root directory
    StorageRoot,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::Edges {
            nodes,
            grants,
            checkers,
            account,
            cache,
            region_allow,
            region_deny,
            workers,
            json,
        } => {
            cli::find_and_display_edges(EdgesCommand {
                nodes_path: nodes,
                grants_path: grants,
                checkers,
                account,
                use_cache: cache,
                region_allow_list: region_allow,
                region_deny_list: region_deny,
                workers,
                json,
                debug: args.verbose,
            })
            .await
        }
        Commands::Checkers => {
            cli::display_checkers(&CheckerRegistry::builtin());
            Ok(())
        }
        Commands::CacheClear { account, operation } => {
            cli::clear_cache(&account, operation.as_deref())
        }
        Commands::StorageRoot => cli::display_storage_root(),
    }
}

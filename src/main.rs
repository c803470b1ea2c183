//! # Report Harness CLI (`rh`)
//!
//! ## Usage
//!
//! ```bash
//! rh --config ./config/rh.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rh serve` | Start the HTTP server |
//! | `rh search "<query>"` | Rank document lines for a query |
//! | `rh inspect` | Summarize the index built from the document |
//! | `rh chat "<prompt>"` | Answer a question grounded in the document |
//! | `rh report "<info>"` | Generate a report and save it as the document |
//!
//! Logging goes to stderr and honours `RUST_LOG`; `--verbose` raises the
//! default level to `debug`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use report_harness::{chat, config, inspect, report, search, server};

/// Report Harness CLI: retrieval-grounded chat and report generation over a
/// Korean markdown document.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/rh.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "rh",
    about = "Report Harness — retrieval-grounded chat and reports over a Korean document",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/rh.toml")]
    config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Indexes the document, then binds to `[server].bind`. A document that
    /// cannot be indexed does not stop the server; search-backed routes
    /// answer 503 until a report indexes cleanly.
    Serve,

    /// Rank document lines for a query.
    Search {
        /// The search query string.
        query: String,

        /// Number of lines to return. Defaults to `[retrieval].top_k`.
        #[arg(long)]
        top_k: Option<usize>,

        /// Show the normalized query, its features, and each hit's
        /// normalized line.
        #[arg(long)]
        explain: bool,
    },

    /// Summarize the index built from the document.
    Inspect,

    /// Answer a question grounded in the document.
    Chat {
        /// The question.
        prompt: String,

        /// Prior conversation to include in the prompt.
        #[arg(long, default_value = "")]
        prev_chat: String,
    },

    /// Generate a report and save it as the document.
    Report {
        /// Free-form description of the investor.
        info: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "report_harness=debug,report_harness_core=debug"
    } else {
        "report_harness=info,report_harness_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Search {
            query,
            top_k,
            explain,
        } => {
            search::run_search(&cfg, &query, top_k, explain).await?;
        }
        Commands::Inspect => {
            inspect::run_inspect(&cfg).await?;
        }
        Commands::Chat { prompt, prev_chat } => {
            chat::run_chat(&cfg, &prompt, &prev_chat).await?;
        }
        Commands::Report { info } => {
            report::run_report(&cfg, &info).await?;
        }
    }

    Ok(())
}

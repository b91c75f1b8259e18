//! # AskDesk CLI
//!
//! Usage:
//!   askdesk serve                         # Start the HTTP gateway
//!   askdesk ask "Do you build websites?"  # Resolve one query, print JSON
//!   askdesk suggest "branding" --top-k 5  # Related questions
//!   askdesk check                         # Knowledge base + encoder status
//!   askdesk init                          # Write a default config file

use anyhow::{Context, Result};
use askdesk_core::config::{AskDeskConfig, expand_path};
use askdesk_engine::Assistant;
use askdesk_memory::SqliteStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "askdesk", version, about = "💬 AskDesk: business FAQ assistant")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: $ASKDESK_CONFIG or ~/.askdesk/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Override gateway port
        #[arg(short, long)]
        port: Option<u16>,
        /// Override bind address
        #[arg(long)]
        host: Option<String>,
    },
    /// Resolve a single query and print the result
    Ask {
        /// The question to resolve
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Print related questions
    Suggest {
        /// Query to find related questions for (omit for the starter list)
        query: Option<String>,
        /// Number of suggestions
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Load the knowledge base and report what is available
    Check,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        "askdesk=debug,tower_http=debug"
    } else {
        "askdesk=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(AskDeskConfig::resolve_path)
}

fn load_config(cli: &Cli) -> Result<AskDeskConfig> {
    match &cli.config {
        Some(path) if path.exists() => {
            tracing::debug!("📄 Loading config from {}", path.display());
            AskDeskConfig::load_from(path).with_context(|| format!("loading {}", path.display()))
        }
        Some(path) => anyhow::bail!("config file not found: {}", path.display()),
        None => Ok(AskDeskConfig::load()?),
    }
}

fn open_store(config: &AskDeskConfig) -> Result<Arc<SqliteStore>> {
    let path = expand_path(&config.storage.db_path);
    let store = SqliteStore::open(&path).with_context(|| format!("opening {}", path.display()))?;
    tracing::info!("💾 Storage ready: {}", path.display());
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    match &cli.command {
        Commands::Init { force } => {
            let path = config_path(&cli);
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            AskDeskConfig::default().save_to(&path)?;
            println!("✅ Wrote default config to {}", path.display());
            Ok(())
        }
        Commands::Serve { port, host } => {
            let mut config = load_config(&cli)?;
            if let Some(port) = port {
                config.gateway.port = *port;
            }
            if let Some(host) = host {
                config.gateway.host = host.clone();
            }
            let store = open_store(&config)?;
            let assistant = Assistant::from_config(&config, store.clone()).await?;
            askdesk_gateway::start(&config.gateway, Arc::new(assistant), store).await
        }
        Commands::Ask { query } => {
            let config = load_config(&cli)?;
            let store = open_store(&config)?;
            let assistant = Assistant::from_config(&config, store).await?;
            let result = assistant.resolve(&query.join(" ")).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Commands::Suggest { query, top_k } => {
            let config = load_config(&cli)?;
            let store = open_store(&config)?;
            let assistant = Assistant::from_config(&config, store).await?;
            let top_k = top_k.unwrap_or(assistant.top_k());
            for suggestion in assistant.suggest(query.as_deref(), top_k).await {
                println!("• {suggestion}");
            }
            Ok(())
        }
        Commands::Check => {
            let config = load_config(&cli)?;
            let store = open_store(&config)?;
            let assistant = Assistant::from_config(&config, store.clone()).await?;
            let stats = assistant.stats();
            println!("💬 {}", config.identity.name);
            println!("   FAQ entries:    {}", stats.entries);
            println!(
                "   Semantic match: {}",
                stats.encoder.as_deref().unwrap_or("unavailable")
            );
            println!(
                "   Snippet source: {}",
                stats.snippet_source.as_deref().unwrap_or("disabled")
            );
            println!("   LLM provider:   {}", stats.provider.as_deref().unwrap_or("none"));
            println!("   Missed queries: {}", store.missed_count());
            Ok(())
        }
    }
}

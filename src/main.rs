use toolshelf::assistant::AssistantSettings;
use toolshelf::catalog::{self, CatalogStore, ALL_CATEGORIES};
use toolshelf::cli;
use toolshelf::config;
use toolshelf::gateway::{self, GatewayOptions};

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "toolshelf", version, about = "Searchable AI tool catalog")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the catalog sheet URL (published CSV export)
    #[arg(long, global = true)]
    sheet_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP gateway
    Serve,
    /// List tools matching a query and category
    List {
        /// Case-insensitive substring matched against name and description
        #[arg(short, long, default_value = "")]
        query: String,
        /// Category to restrict to
        #[arg(short = 'k', long, default_value = ALL_CATEGORIES)]
        category: String,
    },
    /// Show one tool in detail
    Show {
        /// Tool identifier
        id: String,
    },
    /// List categories with tool counts
    Categories,
    /// Print the assistant's grounding instruction
    Context,
    /// Ask the assistant one question
    Ask {
        /// Message to send
        message: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    {
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

        // Logs go to stderr so `list`/`show` output stays pipeable.
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }

    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(|| toolshelf::toolshelf_home().join("config.yaml"));

    info!(path = %config_path.display(), "loading configuration");
    let mut cfg = config::Config::load(&config_path).await?;
    if let Some(url) = cli.sheet_url {
        cfg.catalog.sheet_url = Some(url);
    }

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(90))
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")?;

    let assistant = AssistantSettings::from_config(&cfg.assistant).await?;

    let seed_path = cfg.catalog.resolved_seed_path().filter(|p| {
        let exists = p.exists();
        if !exists {
            warn!(path = %p.display(), "seed file not found, ignoring");
        }
        exists
    });
    let initial = catalog::store::load_initial(&cfg.catalog, &http, seed_path.as_deref()).await?;
    info!(
        tools = initial.len(),
        categories = initial.index().distinct(),
        source = %initial.source(),
        "catalog ready"
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::List { query, category } => cli::list_tools(&initial, &query, &category),
        Command::Show { id } => cli::show_tool(&initial, &id, &cfg.catalog.default_payment_link),
        Command::Categories => {
            cli::list_categories(&initial, &cfg.catalog.category_definitions);
            Ok(())
        }
        Command::Context => {
            cli::print_context(&initial, &assistant);
            Ok(())
        }
        Command::Ask { message } => cli::ask(&initial, assistant, &message).await,
        Command::Serve => serve(cfg, config_path, initial, assistant, http).await,
    }
}

async fn serve(
    cfg: config::Config,
    config_path: PathBuf,
    initial: catalog::Catalog,
    assistant: AssistantSettings,
    http: reqwest::Client,
) -> anyhow::Result<()> {
    let addr = cfg.gateway.socket_addr()?;
    let tools = initial.len();
    let source = initial.source().to_string();
    let assistant_status = if assistant.is_configured() {
        format!("{} ({:?})", assistant.model, assistant.provider)
    } else {
        "no API key".to_string()
    };

    let options = GatewayOptions {
        config: cfg,
        config_path,
        catalog: Arc::new(CatalogStore::new(initial)),
        assistant,
        http,
    };
    let gw = gateway::start_gateway(addr, options)
        .await
        .with_context(|| format!("failed to bind gateway on {addr}"))?;

    println!();
    println!("  toolshelf v{}", env!("CARGO_PKG_VERSION"));
    println!("  Gateway:   http://{}/api", gw.addr);
    println!("  Catalog:   {tools} tools ({source})");
    println!("  Assistant: {assistant_status}");
    println!();

    tokio::signal::ctrl_c().await?;
    info!("received Ctrl-C, shutting down…");
    gw.handle.abort();
    Ok(())
}

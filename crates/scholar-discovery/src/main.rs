//! Scholar Discovery MCP Server - Entry Point
//!
//! Provides both stdio and HTTP transports.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use scholar_discovery::{
    ConceptOntology, InMemoryProfileStore, ProxyClient, config::Config, server::McpServer,
    tools::ToolContext,
};

#[derive(Parser, Debug)]
#[command(name = "scholar-discovery")]
#[command(about = "Personalised paper recommendation and semantic search over MCP")]
#[command(version)]
struct Cli {
    /// Base URL of the backend proxy serving search and analysis
    #[arg(long, env = "DISCOVERY_PROXY_URL")]
    proxy_url: Option<String>,

    /// Concept ontology JSON file (embedded ontology when omitted)
    #[arg(long, env = "DISCOVERY_ONTOLOGY_PATH")]
    ontology: Option<PathBuf>,

    /// Enable the vector-similarity retrieval signal
    #[arg(long, env = "DISCOVERY_ENABLE_VECTOR_SEARCH")]
    enable_vector_search: bool,

    /// Transport mode: stdio or http
    #[arg(long, default_value = "stdio")]
    transport: Transport,

    /// HTTP server port (only used with --transport http)
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Transport {
    /// Standard input/output
    #[default]
    Stdio,
    /// JSON-RPC over HTTP POST
    Http,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // Logs go to stderr; stdout carries the stdio transport.
    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?cli.transport,
        "Starting Scholar Discovery MCP server"
    );

    let mut config = Config::from_env()?;
    if let Some(proxy_url) = cli.proxy_url {
        config.proxy_url = proxy_url;
    }
    if cli.ontology.is_some() {
        config.ontology_path = cli.ontology;
    }
    config.enable_vector_search |= cli.enable_vector_search;

    let ontology = Arc::new(ConceptOntology::load(config.ontology_path.as_deref())?);
    tracing::info!(
        proxy_url = %config.proxy_url,
        domains = ontology.domains().count(),
        vector_search = config.enable_vector_search,
        "Configuration loaded"
    );

    let client = ProxyClient::new(&config)?;
    let profiles = Arc::new(InMemoryProfileStore::new());
    let ctx = ToolContext::from_client(&config, ontology, &client, profiles);
    let server = McpServer::new(ctx);

    match cli.transport {
        Transport::Stdio => server.run_stdio().await?,
        Transport::Http => server.run_http(cli.port).await?,
    }

    Ok(())
}

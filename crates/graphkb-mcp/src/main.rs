use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use graphkb_config::{KbConfig, TransportMode};
use graphkb_core::KnowledgeRetriever;
use graphkb_mcp::{logging, KnowledgeServer};
use rmcp::{transport::stdio, ServiceExt};
use tracing::info;

/// MCP server answering entity questions from a SPARQL knowledge graph
#[derive(Debug, Parser)]
#[command(name = "graphkb-mcp", version, about)]
struct Args {
    /// Config file (default: <config dir>/graphkb/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SPARQL endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Default graph IRI sent with every query (empty string disables it)
    #[arg(long)]
    default_graph: Option<String>,

    /// Per-query timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Serve streamable HTTP instead of stdio
    #[arg(short, long)]
    stream: bool,

    /// Bind address for HTTP mode
    #[arg(short, long)]
    bind: Option<String>,

    /// Port for HTTP mode
    #[arg(short, long)]
    port: Option<u16>,

    /// Write logs to this file instead of stderr
    #[arg(short, long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut KbConfig) {
        if let Some(url) = &self.endpoint {
            config.endpoint.url = url.clone();
        }
        if let Some(graph) = &self.default_graph {
            config.endpoint.default_graph = Some(graph.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config.endpoint.timeout_secs = secs;
        }
        if self.stream {
            config.server.transport = TransportMode::Http;
        }
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_file.as_deref()).context("Failed to open log file")?;

    let mut config = KbConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    let retriever = KnowledgeRetriever::from_config(&config.endpoint)?;
    let server = KnowledgeServer::new(retriever, config.endpoint.url.clone());
    info!(
        "graphkb-mcp {} using endpoint {} (timeout {}s)",
        env!("CARGO_PKG_VERSION"),
        config.endpoint.url,
        config.endpoint.timeout_secs
    );

    match config.server.transport {
        TransportMode::Stdio => run_stdio(server).await,
        TransportMode::Http => run_http(server, &config.server.address()).await,
    }
}

async fn run_stdio(server: KnowledgeServer) -> Result<()> {
    info!("Serving MCP over stdio");
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

async fn run_http(server: KnowledgeServer, address: &str) -> Result<()> {
    use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
    use rmcp::transport::StreamableHttpService;

    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = axum::Router::new()
        .nest_service("/mcp", service)
        .route("/health", axum::routing::get(|| async { "OK" }));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Serving MCP over HTTP at http://{address}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

// Caduceus - health assistant chat routing service
// Main entry point

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use caduceus::config::{load_config, Config};
use caduceus::pipeline::{ConversationalMatcher, EmergencyDetector, MessageRouter};
use caduceus::server::{AssistantServer, ServerConfig};
use caduceus::upstream::OpenAiClient;

#[derive(Parser, Debug)]
#[command(name = "caduceus")]
#[command(about = "Health assistant chat routing service", version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Bind address (default: taken from config)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Route a single message and print the reply
    Query {
        /// Message text
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    match args.command {
        Some(Command::Serve { bind }) => run_serve(bind).await,
        Some(Command::Query { message }) => run_query(&message).await,
        None => run_serve(None).await,
    }
}

/// Initialize tracing
///
/// Default: INFO level, override with RUST_LOG
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Build the routing pipeline from configuration
fn build_router(config: &Config) -> Result<MessageRouter> {
    let detector = match &config.emergency_keywords_path {
        Some(path) => EmergencyDetector::load_from_file(path)?,
        None => EmergencyDetector::new(),
    };
    let upstream = Arc::new(OpenAiClient::new(config)?);

    Ok(MessageRouter::new(
        ConversationalMatcher::new(),
        detector,
        upstream,
    ))
}

/// Run the HTTP server
async fn run_serve(bind: Option<String>) -> Result<()> {
    let config = load_config()?;
    let router = build_router(&config)?;

    let server_config = ServerConfig {
        bind_address: bind.unwrap_or_else(|| config.bind_address.clone()),
    };

    let server = AssistantServer::new(router, server_config);
    server.serve().await
}

/// Route a single message and print the reply
async fn run_query(message: &str) -> Result<()> {
    let config = load_config()?;
    let router = build_router(&config)?;

    let result = router.route(message, &[]).await?;

    // Reply on stdout so the command pipes cleanly; the tag goes to stderr.
    println!("{}", result.reply);
    eprintln!("[source: {}]", result.source.as_str());

    Ok(())
}

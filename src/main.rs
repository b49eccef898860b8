use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tutor::{app::App, Config, Server};

const LOG_FILE: &str = "/tmp/tutor.log";

/// Tutor - a terminal chat client for the AI tutoring service
#[derive(Parser, Debug)]
#[command(name = "tutor")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Answer service origin (overrides service.base_url)
    #[arg(short, long, env = "TUTOR_ENDPOINT")]
    endpoint: Option<String>,

    /// Go straight to the chat screen
    #[arg(long)]
    skip_login: bool,

    /// Run the answer server instead of the chat client
    #[arg(long)]
    serve: bool,

    /// Port for --serve (overrides server.port)
    #[arg(short, long, requires = "serve")]
    port: Option<u16>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The TUI owns the terminal, so the client logs to a file
fn init_client_logging() -> Result<()> {
    let log_file = std::fs::File::create(LOG_FILE)
        .with_context(|| format!("Failed to create log file {}", LOG_FILE))?;
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(log_file).with_ansi(false))
        .init();
    Ok(())
}

fn init_server_logging() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(config: &Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid server address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    let server = Server::bind(addr).await?;
    server.run().await
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env files (local first, then home directory)
    // Errors are ignored - files are optional
    let _ = dotenvy::from_filename(".env");
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".env"));
    }

    let args = Args::parse();

    let mut config = Config::load()?;

    // Apply CLI overrides
    if let Some(endpoint) = args.endpoint {
        config.service.base_url = endpoint;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.skip_login {
        config.ui.show_login = false;
    }
    config.validate()?;

    if args.serve {
        init_server_logging();
        return serve(&config).await;
    }

    init_client_logging()?;
    tracing::info!(endpoint = %config.service.base_url, "starting chat client");

    let mut app = App::new(config)?;
    app.run().await
}

//! mailroom-dashboard: read-only monitoring dashboard for the mailroom pipeline
//!
//! Serves the dashboard API by default. `snapshot`, `export` and `show`
//! run once and print to stdout.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use mailroom_client::{MailroomClient, RecordGateway};
use mailroom_dashboard::cli::{execute_command, Commands};
use mailroom_dashboard::dashboard::{create_router, DashboardState};
use mailroom_dashboard::{Config, QueryParams, SyncEngine};

#[derive(Parser)]
#[command(name = "mailroom-dashboard")]
#[command(about = "Read-only monitoring dashboard for processed support email")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "mailroom-dashboard.toml")]
    config: String,

    /// Backend base URL (overrides config file)
    #[arg(long, env = "MAILROOM_BACKEND_URL")]
    backend_url: Option<String>,

    /// HTTP port (overrides config file)
    #[arg(long, env = "MAILROOM_HTTP_PORT")]
    port: Option<u16>,

    /// Poll interval in milliseconds (overrides config file)
    #[arg(long, env = "MAILROOM_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// One-shot command; serves the API when absent
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mailroom_dashboard=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;

    // Apply CLI overrides
    if let Some(backend_url) = cli.backend_url {
        config.backend.base_url = backend_url;
    }
    if let Some(port) = cli.port {
        config.api.http_port = port;
    }
    if let Some(poll_interval_ms) = cli.poll_interval_ms {
        config.sync.poll_interval_ms = poll_interval_ms;
    }
    config.validate()?;

    let client = MailroomClient::new(config.client_config())?;
    let gateway: Arc<dyn RecordGateway> = Arc::new(client.clone());
    let initial = QueryParams::default().with_page(config.sync.page_limit, 0)?;
    let engine = SyncEngine::new(gateway, initial, config.poll_interval());

    // Handle one-shot subcommand if present
    if let Some(command) = cli.command {
        let output =
            execute_command(&engine, command, config.sync.page_limit, &config.view_options()).await;
        match output {
            Ok(output) => {
                println!("{}", output);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    info!("Starting mailroom-dashboard");
    info!("Backend: {}", client.base_url());

    match client.health().await {
        Ok(true) => info!("Backend is healthy"),
        Ok(false) => warn!("Backend reported unhealthy status"),
        Err(e) => warn!(error = %e, "Backend health check failed, polling anyway"),
    }

    engine.start_polling();

    let state = Arc::new(DashboardState::new(engine.clone(), config.view_options()));
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.http_port));
    info!("Dashboard listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    engine.shutdown().await;
    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

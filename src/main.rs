// src/main.rs
use clap::Parser;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

use odyssey_link::bridge::{Bridge, BridgeRequest};
use odyssey_link::config;
use odyssey_link::remote::HttpStatusClient;
use odyssey_link::web;

#[derive(Parser)]
#[command(name = "odyssey-link", about = "Status bridge for the Odyssey print engine")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "odyssey.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting odyssey-link");
    tracing::info!("Loading configuration from: {}", cli.config);

    let config = config::load_config(&cli.config).map_err(|e| {
        tracing::error!("Failed to load config from '{}': {}", cli.config, e);
        Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
    })?;

    tracing::info!("Odyssey server: {}", config.odyssey.url);
    tracing::info!(
        "Polling: {}s active / {}s idle",
        config.polling.active_interval_secs,
        config.polling.idle_interval_secs
    );

    let server = Arc::new(HttpStatusClient::new(config.odyssey.url.clone()));
    let bridge = Bridge::new(server, &config);

    // Channel between web handlers and the bridge task; the bridge is the
    // sole owner of tracker state and handles one request at a time.
    let (bridge_tx, bridge_rx) = mpsc::channel::<BridgeRequest>(16);
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let bridge_handle = tokio::spawn(bridge.run(bridge_rx, shutdown_tx.subscribe()));

    let app = web::api::create_router(bridge_tx);
    let listener = tokio::net::TcpListener::bind(&config.web.bind).await?;
    tracing::info!("Web API listening on http://{}", listener.local_addr()?);

    let server_shutdown = shutdown_tx.subscribe();
    tokio::spawn(async move {
        let mut shutdown = server_shutdown;
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await;
        if let Err(e) = result {
            tracing::error!("Web server error: {}", e);
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    let _ = shutdown_tx.send(());

    // The bridge sends the best-effort shutdown notification on its way out.
    let _ = bridge_handle.await;
    Ok(())
}

//! fcond - FordConnect bridge daemon
//!
//! Polls the FordConnect Query API for one vehicle and serves the resulting
//! entity states, plus the OAuth authorize and callback routes, over HTTP.
//!
//! Usage:
//!   fcond [OPTIONS] [config.toml]

mod config;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use fcon_auth::{
    AuthorizationServer, CallbackState, FileTokenProvider, StateMap, StaticToken, StoredToken,
    TokenProvider, AUTHORIZE_PATH, CALLBACK_PATH,
};
use fcon_client::FordClient;
use fcon_integration::{
    create_entry, create_router, AppState, ConfigEntry, CoordinatorEvent, FailureKind,
    Integration, RestoreStore, SetupError,
};
use tokio::sync::{broadcast, watch};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

use crate::config::Config;

const DEFAULT_LOG_FILTER: &str = "fcond=info,fcon_integration=info,fcon_client=info,fcon_auth=info";

#[derive(Parser, Debug)]
#[command(name = "fcond")]
#[command(author, version, about = "FordConnect vehicle bridge daemon")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(env = "FCOND_CONFIG")]
    config: Option<PathBuf>,

    /// Override the HTTP port
    #[arg(short, long, env = "FCOND_PORT")]
    port: Option<u16>,

    /// Override the access token from the config file
    #[arg(long, env = "FCOND_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new(DEFAULT_LOG_FILTER)
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    tracing::info!("Starting fcond (FordConnect bridge)");

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading config from: {}", path.display());
            Config::load_from(path)?
        }
        None => {
            tracing::info!("No config file provided, using defaults");
            Config::default()
        }
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(token) = &cli.access_token {
        config.token.access_token = Some(token.clone());
    }

    let tokens = token_provider(&config)?;
    let client = FordClient::with_config(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
        Duration::from_secs(config.api.connect_timeout_secs),
    )
    .context("Failed to create vendor API client")?;
    let retry = Duration::from_secs(config.polling.setup_retry_secs);

    let setup = async {
        let entry = match &config.account.vin {
            Some(vin) => ConfigEntry::new(config.account.entry_id.clone(), vin.clone()),
            None => {
                retry_until_ready("vehicle discovery", retry, || {
                    create_entry(&config.account.entry_id, &client, tokens.as_ref())
                })
                .await
            }
        };

        let restore = config.storage.restore_path.clone().map(RestoreStore::new);
        retry_until_ready("entry setup", retry, || {
            Integration::setup(
                entry.clone(),
                config.polling.coordinator(),
                tokens.clone(),
                Arc::new(client.clone()),
                restore.clone(),
            )
        })
        .await
    };

    let integration = tokio::select! {
        integration = setup => Arc::new(integration),
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted during setup");
            return Ok(());
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(log_availability(integration.coordinator().subscribe()));

    let poll_handle = tokio::spawn({
        let integration = integration.clone();
        let mut shutdown_rx = shutdown_rx.clone();
        async move {
            integration
                .run(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
        }
    });

    let oauth = AuthorizationServer {
        authorize_url: config.oauth.authorize_url.clone(),
        token_url: config.oauth.token_url.clone(),
    };
    tracing::info!(
        authorize_url = %oauth.authorize_url,
        token_url = %oauth.token_url,
        "OAuth routes at {} and {}",
        AUTHORIZE_PATH,
        CALLBACK_PATH
    );

    let states = Arc::new(StateMap::new());
    let completion_url = Url::parse(&config.oauth.completion_url)
        .with_context(|| format!("Invalid completion URL: {}", config.oauth.completion_url))?;
    let app = create_router(
        AppState::new(integration.clone()),
        CallbackState::new(states.clone(), completion_url).with_authorization_server(oauth),
    );

    let addr = config.server.addr();
    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let mut server_shutdown = shutdown_rx;
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = server_shutdown.changed().await;
    });

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down...");
        }
        let _ = shutdown_tx.send(true);
    });

    server.await.context("HTTP server failed")?;

    let _ = tokio::time::timeout(Duration::from_secs(2), poll_handle).await;
    states.clear();

    Ok(())
}

fn token_provider(config: &Config) -> Result<Arc<dyn TokenProvider>> {
    if let Some(path) = &config.token.token_file {
        tracing::info!("Reading access token from {}", path.display());
        return Ok(Arc::new(FileTokenProvider::new(path)));
    }
    let token = config
        .token
        .access_token
        .clone()
        .context("No access token configured: set [token] access_token or token_file")?;
    Ok(Arc::new(StaticToken::new(StoredToken::new(token))))
}

/// Tracks whether the vehicle data is currently usable
#[derive(Debug, Default)]
struct Availability {
    available: Option<bool>,
}

impl Availability {
    /// New availability if `event` changed it
    fn observe(&mut self, event: &CoordinatorEvent) -> Option<bool> {
        let available = matches!(event, CoordinatorEvent::Updated(_));
        if self.available == Some(available) {
            return None;
        }
        self.available = Some(available);
        Some(available)
    }
}

/// Log transitions between available and unavailable, once each
async fn log_availability(mut events: broadcast::Receiver<CoordinatorEvent>) {
    let mut availability = Availability::default();
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Availability watcher lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        match (availability.observe(&event), &event) {
            (Some(true), _) => tracing::info!("Vehicle data available"),
            (Some(false), CoordinatorEvent::Failed(failure)) => match failure.kind {
                FailureKind::Auth => {
                    tracing::error!("Vehicle data unavailable: {}", failure.message)
                }
                _ => tracing::warn!(kind = ?failure.kind, "Vehicle data unavailable"),
            },
            _ => {}
        }
    }
}

async fn retry_until_ready<T, F, Fut>(what: &str, delay: Duration, mut attempt: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, SetupError>>,
{
    loop {
        match attempt().await {
            Ok(value) => return value,
            Err(e) => {
                tracing::warn!(retry_in_secs = delay.as_secs(), "{} failed: {}", what, e);
                tokio::time::sleep(delay).await;
            }
        }
    }
}

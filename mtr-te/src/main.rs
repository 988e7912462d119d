//! Taste Explorer (mtr-te) - Main entry point
//!
//! Serves the pairwise band comparison API: start a genre session, judge
//! pairs of bands, and read back suggestions and recommendations.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mtr_common::config::{self as common_config, TomlConfig};
use mtr_common::db::init::init_database;
use mtr_common::db::{SqliteCatalogStore, SqliteSessionStore};
use mtr_te::catalog::CatalogSeeder;
use mtr_te::config::ExplorerConfig;
use mtr_te::engine::TasteExplorer;
use mtr_te::{build_router, AppState};

/// Command-line arguments for mtr-te
#[derive(Parser, Debug)]
#[command(name = "mtr-te")]
#[command(about = "Taste Explorer: pairwise metal band comparison service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "MTR_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "MTR_TE_PORT")]
    port: Option<u16>,

    /// JSON seed file of bands keyed by genre (overrides the config file)
    #[arg(long, env = "MTR_SEED_FILE")]
    seed_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing exists so its log level can apply
    let config_path = args.config.clone().or_else(common_config::default_config_path);
    let toml_config = match &config_path {
        Some(path) => common_config::load_toml_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TomlConfig::default(),
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{},tower_http=debug", toml_config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting MTR Taste Explorer v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) if path.exists() => info!("Configuration: {}", path.display()),
        Some(path) => warn!("Config file {} not found, using defaults", path.display()),
        None => info!("No config file found, using defaults"),
    }

    let root_folder = common_config::resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    info!("Root folder: {}", root_folder.display());

    let db_path = common_config::database_path(&root_folder);
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("Database ready: {}", db_path.display());

    let seeder = match args.seed_file.as_ref().or(toml_config.catalog.seed_file.as_ref()) {
        Some(path) => CatalogSeeder::load(path).context("Failed to load seed file")?,
        None => {
            info!("No seed file configured, using the bundled band list");
            CatalogSeeder::builtin().context("Failed to parse bundled seed data")?
        }
    };

    let explorer_config =
        ExplorerConfig::from_settings(&toml_config.explorer).context("Invalid [explorer] settings")?;
    info!(
        "Explorer: {} phases, retry budget {}, skip policy {:?}",
        explorer_config.phases.len(),
        explorer_config.retry_budget,
        explorer_config.skip_policy
    );

    let explorer = Arc::new(TasteExplorer::new(
        Arc::new(SqliteCatalogStore::new(pool.clone())),
        Arc::new(SqliteSessionStore::new(pool.clone())),
        seeder,
        explorer_config,
    ));

    if toml_config.catalog.seed_on_startup {
        explorer
            .populate_configured_genres()
            .await
            .context("Failed to populate catalog")?;
    }

    let app = build_router(AppState::new(explorer));

    let port = args.port.unwrap_or(toml_config.server.port);
    let addr: SocketAddr = format!("{}:{}", toml_config.server.host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", toml_config.server.host, port))?;

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

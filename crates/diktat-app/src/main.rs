//! Diktat application binary - composition root.
//!
//! Ties the Diktat crates together into a single executable:
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Open the SQLite user database
//! 3. Point the content repository at the dictations directory
//! 4. Start the axum REST API server

mod cli;

use std::sync::Arc;

use clap::Parser;

use diktat_api::state::AppState;
use diktat_content::FsContentRepository;
use diktat_core::config::DiktatConfig;
use diktat_storage::{Database, SqliteUserStore};

use cli::{expand_home, CliArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing starts so its log level can apply.
    let config_file = args.resolve_config_path();
    let loaded = if config_file.exists() {
        Some(DiktatConfig::load(&config_file))
    } else {
        None
    };
    let mut config = match &loaded {
        Some(Ok(config)) => config.clone(),
        _ => DiktatConfig::default(),
    };
    args.apply(&mut config);

    // Tracing: RUST_LOG wins over --log-level / DIKTAT_LOG_LEVEL / config.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::try_new(&config.general.log_level)
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .init();

    tracing::info!("Starting Diktat v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Some(Ok(_)) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(Err(e)) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
        None => tracing::info!(path = %config_file.display(), "No config file, using defaults"),
    }

    // Storage.
    let data_dir = expand_home(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    let db_path = data_dir.join("users.db");
    let db = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");
    let users = Arc::new(SqliteUserStore::new(db, config.auth.hash_iterations));

    // Content.
    let dictations_dir = expand_home(&config.content.dictations_dir);
    if !dictations_dir.exists() {
        std::fs::create_dir_all(&dictations_dir)?;
        tracing::info!(path = %dictations_dir.display(), "Created empty dictations directory");
    }
    let content = Arc::new(FsContentRepository::new(
        dictations_dir,
        config.content.extension.clone(),
    ));

    // === API server ===
    let state = AppState::new(config.clone(), users, content);
    if let Err(e) = diktat_api::start_server(&config, state).await {
        tracing::error!(
            port = config.general.port,
            error = %e,
            "Server stopped. Is another instance running?"
        );
        return Err(e.into());
    }

    Ok(())
}

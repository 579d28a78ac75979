//! Contactbook - contacts REST backend with token-based authentication

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{AuthConfig, Config, LoggingConfig};
use contactbook_api::{AppState, create_router};
use contactbook_auth::JwtManager;
use contactbook_db::{Database, NewUser, UserRole};

/// Contactbook - contacts REST backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "CONTACTBOOK_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "CONTACTBOOK_PORT")]
    port: Option<u16>,

    /// Token signing key
    #[arg(long, env = "CONTACTBOOK_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = secret;
    }

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting Contactbook v{}", env!("CARGO_PKG_VERSION"));

    if config.uses_default_secret() {
        warn!("Signing tokens with the built-in key; set auth.jwt_secret or CONTACTBOOK_JWT_SECRET");
    }

    // Initialize metrics
    let metrics_handle = if config.metrics.enabled {
        Some(Arc::new(PrometheusBuilder::new().install_recorder()?))
    } else {
        None
    };

    // Initialize database
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let db = Database::new(&config.database.url()).await?;

    seed_admin(&db, &config.auth).await?;

    // Key is fixed for the lifetime of the process
    let jwt = Arc::new(JwtManager::new(&config.auth.jwt_secret));

    // Create router
    let state = AppState::new(db.clone(), jwt);
    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

/// Create the admin account if the user table is empty
async fn seed_admin(db: &Database, auth: &AuthConfig) -> Result<()> {
    if db.has_users().await? {
        return Ok(());
    }

    let Some(password) = auth.admin_password.clone() else {
        warn!("No users exist and no admin password is configured; register a user via POST /users");
        return Ok(());
    };

    info!("Creating admin user {}", auth.admin_username);
    let password_hash =
        tokio::task::spawn_blocking(move || contactbook_auth::hash_password(&password)).await??;

    db.insert_user(NewUser {
        username: auth.admin_username.clone(),
        email: auth.admin_email.clone(),
        password_hash,
        role: UserRole::Admin,
    })
    .await?;

    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format.as_str() {
        "json" => registry.with(fmt::layer().json()).init(),
        _ => registry.with(fmt::layer()).init(),
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

//! Keygate - password login and bearer token service

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, ConfigSource, LoggingConfig};
use keygate_api::{AppState, create_router};
use keygate_auth::{AuthGate, AuthService, PasswordHasher, TokenCodec};
use keygate_db::{CredentialStore, Database};

/// Keygate - password login and bearer token service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "KEYGATE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "KEYGATE_PORT")]
    port: Option<u16>,

    /// Credential store URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Token signing secret
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Token signature algorithm (HS256, HS384, HS512)
    #[arg(long, env = "ALGORITHM")]
    algorithm: Option<String>,

    /// Access token lifetime in minutes
    #[arg(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES")]
    access_token_expire_minutes: Option<i64>,

    /// Comma separated list of allowed CORS origins
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Option<Vec<String>>,
}

impl Args {
    /// Layer command line and environment values over the file config
    fn apply(self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.server.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if let Some(secret) = self.secret_key {
            config.auth.secret_key = Some(secret);
        }
        if let Some(algorithm) = self.algorithm {
            config.auth.algorithm = algorithm;
        }
        if let Some(minutes) = self.access_token_expire_minutes {
            config.auth.access_token_expire_minutes = minutes;
        }
        if let Some(origins) = self.cors_origins {
            config.cors.origins = origins;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.clone();
    let (mut config, source) = Config::load(&config_path)?;
    args.apply(&mut config);
    config.validate()?;

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting Keygate v{}", env!("CARGO_PKG_VERSION"));
    match source {
        ConfigSource::File => info!("Loaded configuration from {}", config_path),
        ConfigSource::Defaults => {
            info!("Config file not found at {}, using defaults", config_path)
        }
    }

    let auth_config = config.auth_config()?;
    if !auth_config.has_secret() {
        warn!("SECRET_KEY is not configured; logins will fail until it is set");
    }

    // Create the database directory for file-backed SQLite
    if let Some(parent) = sqlite_file_path(&config.database.url).and_then(|p| {
        p.parent()
            .filter(|d| !d.as_os_str().is_empty())
            .map(|d| d.to_path_buf())
    }) {
        tokio::fs::create_dir_all(&parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    // Initialize database
    let db = Database::new(&config.database.url).await?;
    let store: Arc<dyn CredentialStore> = Arc::new(db);

    // Initialize credential lifecycle components
    let hasher = Arc::new(PasswordHasher::new(auth_config.hash_cost)?);
    let codec = Arc::new(TokenCodec::new(&auth_config));
    let auth = Arc::new(AuthService::new(store.clone(), hasher, codec.clone()));
    let gate = Arc::new(AuthGate::new(codec, store));

    // Initialize metrics
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install metrics recorder")?;

    // Create router
    let app = create_router(AppState::new(auth, gate), Some(Arc::new(metrics_handle)))
        .layer(build_cors(&config.cors.origins)?)
        .layer(TraceLayer::new_for_http());

    // Determine bind address
    let addr: SocketAddr =
        format!("{}:{}", config.server.bind_address, config.server.port).parse()?;

    info!("Listening on {}", addr);
    info!(
        "Access tokens expire after {} minutes",
        config.auth.access_token_expire_minutes
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Build the CORS layer from the configured origins
fn build_cors(origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|o| {
            o.trim()
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", o))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// File path behind a SQLite URL, if it names a file
fn sqlite_file_path(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();

    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install CTRL+C handler: {}", e);
    }
    info!("Shutdown signal received");
}

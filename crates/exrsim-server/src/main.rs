//! exrsim-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite record store, and serves the EXRSIM JSON API under
//! `/api`. Configuration keys can also be supplied as `EXRSIM_`-prefixed
//! environment variables (e.g. `EXRSIM_PORT=8080`).

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::{Router, http::HeaderValue};
use clap::Parser;
use exrsim_core::service::RecordService;
use exrsim_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "EXRSIM exercise-planning server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Runtime server configuration, deserialised from `config.toml` and the
/// `EXRSIM_*` environment.
#[derive(Deserialize, Clone)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:       String,
  #[serde(default = "default_port")]
  port:       u16,
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
  /// Origin allowed by CORS; `*` (the default) allows any origin — the
  /// planner UI is a browser app served separately.
  #[serde(default = "default_cors_origin")]
  cors_allow_origin: String,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("exrsim.db") }
fn default_cors_origin() -> String { "*".to_owned() }

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("EXRSIM"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path, then open the store. The handle lives for
  // the process lifetime and is dropped (closing the database) after the
  // server finishes shutting down.
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let service = Arc::new(RecordService::new(store));

  let cors = cors_layer(&server_cfg.cors_allow_origin)?;
  let app = Router::new()
    .nest("/api", exrsim_api::api_router(service))
    .layer(cors)
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

fn cors_layer(allow_origin: &str) -> anyhow::Result<CorsLayer> {
  let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
  Ok(match allow_origin {
    "*" => layer.allow_origin(Any),
    origin => layer.allow_origin(
      origin
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid CORS origin {origin:?}"))?,
    ),
  })
}

async fn shutdown_signal() {
  if tokio::signal::ctrl_c().await.is_ok() {
    tracing::info!("shutdown signal received");
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

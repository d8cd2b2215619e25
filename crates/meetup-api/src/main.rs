//! meetup API server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) overlaid by
//! `MEETUP_*` environment variables, opens the SQLite store and serves the
//! REST API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use meetup_api::{AppState, Credentials, Environment, ServerConfig, error::expose_internal_errors};
use meetup_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "meetup REST API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .set_default("host", "0.0.0.0")?
    .set_default("port", 3000)?
    .set_default("database_path", "meetup.db")?
    .set_default("token_ttl_secs", 86_400)?
    .set_default("environment", "production")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("MEETUP").try_parsing(true))
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  expose_internal_errors(server_cfg.environment == Environment::Development);

  let database_path = expand_tilde(&server_cfg.database_path);
  let store = SqliteStore::open(&database_path)
    .await
    .with_context(|| format!("failed to open store at {database_path:?}"))?;

  let app = meetup_api::router(AppState {
    users:       Arc::new(store.users()),
    meets:       Arc::new(store.meets()),
    events:      Arc::new(store.events()),
    credentials: Arc::new(Credentials::new(&server_cfg.jwt_secret, server_cfg.token_ttl())),
  });
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(environment = ?server_cfg.environment, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
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

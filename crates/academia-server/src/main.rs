//! Academia server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `ACADEMIA_*` environment variables, opens the SQLite store and serves the
//! login and provisioning API over HTTP.
//!
//! # Seeding the first administrator
//!
//! ```text
//! server --create-admin 7.654.321-6 --email admin@example.com --name "Admin"
//! ```
//!
//! The password is read from stdin.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use academia_core::{
  account::{NewAccount, Profile},
  store::AccountDirectory,
};
use academia_rut::Rut;
use academia_server::{AppState, ServerConfig};
use academia_store_sqlite::SqliteStore;
use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[derive(Parser)]
#[command(author, version, about = "Academia login server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Provision an administrator with this RUT and exit.
  #[arg(long, value_name = "RUT", requires_all = ["email", "name"])]
  create_admin: Option<String>,

  /// Email of the administrator created with `--create-admin`.
  #[arg(long)]
  email: Option<String>,

  /// Full name of the administrator created with `--create-admin`.
  #[arg(long)]
  name: Option<String>,
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
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("ACADEMIA"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?
    .with_session_ttl(server_cfg.session_ttl())
    .with_rut_policy(server_cfg.rut_policy());

  if let Some(rut) = cli.create_admin {
    return create_admin(&store, &rut, cli.email, cli.name).await;
  }

  let purger = store.clone();
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(PURGE_INTERVAL);
    loop {
      ticker.tick().await;
      match purger.purge_expired_sessions().await {
        Ok(0) => {}
        Ok(n) => tracing::info!(purged = n, "expired sessions removed"),
        Err(e) => tracing::warn!(error = %e, "session purge failed"),
      }
    }
  });

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let app = academia_server::router(AppState::new(store, server_cfg));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn create_admin(
  store: &SqliteStore,
  rut: &str,
  email: Option<String>,
  name: Option<String>,
) -> anyhow::Result<()> {
  let rut = Rut::parse(rut).with_context(|| format!("invalid RUT {rut:?}"))?;
  let password = read_password()?;
  anyhow::ensure!(!password.is_empty(), "password must not be empty");

  let account = store
    .create_account(NewAccount {
      rut,
      email: email.context("--email is required")?,
      full_name: name.context("--name is required")?,
      password,
      profile: Profile::Admin,
    })
    .await
    .context("failed to create administrator")?;

  println!("created admin {} ({})", account.rut, account.account_id);
  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
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

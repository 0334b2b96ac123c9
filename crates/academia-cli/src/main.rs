//! `academia`: terminal login client for the Academia server.
//!
//! # Usage
//!
//! ```text
//! academia --url http://localhost:8080
//! academia --config ~/.config/academia/config.toml
//! academia --logout
//! ```

mod app;
mod client;
mod session;
mod ui;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::ApiClient;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "academia", about = "Terminal login client for Academia")]
struct Args {
  /// Path to a TOML config file (url, session_file).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the academia server (default: http://localhost:8080).
  #[arg(long, env = "ACADEMIA_URL")]
  url: Option<String>,

  /// Where the signed-in session is kept between runs.
  #[arg(long, value_name = "FILE")]
  session_file: Option<PathBuf>,

  /// Revoke the stored session and exit.
  #[arg(long)]
  logout: bool,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:          Option<String>,
  #[serde(default)]
  session_file: Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let url = args
    .url
    .or(file_cfg.url)
    .unwrap_or_else(|| DEFAULT_URL.to_string());
  let session_file = args
    .session_file
    .or(file_cfg.session_file)
    .unwrap_or_else(session::default_path);

  let client = ApiClient::new(url)?;
  let mut app = App::new(client, session_file);

  if args.logout {
    app.session = session::load(&app.session_file)?;
    if app.session.is_none() {
      println!("Sin sesión.");
      return Ok(());
    }
    app.logout().await?;
    println!("{}", app.status_msg);
    return Ok(());
  }

  app.restore_session().await?;

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}

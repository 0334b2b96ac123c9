//! The persisted login slot: a small TOML file holding the routing role
//! resolved at login and the bearer token that goes with it.

use std::path::{Path, PathBuf};

use academia_core::session::RoutingRole;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
  pub routing_role: RoutingRole,
  pub access_token: String,
  pub email:        String,
}

/// `$HOME/.config/academia/session.toml`, or a file in the working directory
/// when `HOME` is unset.
pub fn default_path() -> PathBuf {
  match std::env::var_os("HOME") {
    Some(home) => PathBuf::from(home).join(".config/academia/session.toml"),
    None => PathBuf::from("academia-session.toml"),
  }
}

/// Read the slot. A missing file is `Ok(None)`.
pub fn load(path: &Path) -> Result<Option<StoredSession>> {
  let raw = match std::fs::read_to_string(path) {
    Ok(raw) => raw,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
    Err(e) => {
      return Err(e).with_context(|| format!("reading session file {}", path.display()));
    }
  };
  let session = toml::from_str(&raw)
    .with_context(|| format!("parsing session file {}", path.display()))?;
  Ok(Some(session))
}

pub fn save(path: &Path, session: &StoredSession) -> Result<()> {
  if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("creating {}", dir.display()))?;
  }
  let raw = toml::to_string(session).context("serialising session")?;
  std::fs::write(path, raw)
    .with_context(|| format!("writing session file {}", path.display()))
}

/// Remove the slot; a missing file is not an error.
pub fn clear(path: &Path) -> Result<()> {
  match std::fs::remove_file(path) {
    Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
      Err(e).with_context(|| format!("removing session file {}", path.display()))
    }
    _ => Ok(()),
  }
}

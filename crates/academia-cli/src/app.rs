//! Application state machine and event dispatcher.

use std::{path::PathBuf, sync::Arc};

use academia_core::login::validate_login_rut;
use academia_rut::{RutInput, RutPolicy};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
  client::ApiClient,
  session::{self, StoredSession},
};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// RUT + password form.
  Login,
  /// Signed in; shows the resolved role and its landing page.
  Dashboard,
}

/// Which login field receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Rut,
  Password,
}

impl Focus {
  fn toggle(self) -> Self {
    match self {
      Focus::Rut => Focus::Password,
      Focus::Password => Focus::Rut,
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub screen: Screen,
  pub focus:  Focus,

  /// RUT field, reformatted on every keystroke.
  pub rut: RutInput,

  pub password: String,

  /// The signed-in session, mirrored in `session_file`.
  pub session: Option<StoredSession>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub client:       Arc<ApiClient>,
  pub session_file: PathBuf,
  pub rut_policy:   RutPolicy,
}

impl App {
  pub fn new(client: ApiClient, session_file: PathBuf) -> Self {
    Self {
      screen: Screen::Login,
      focus: Focus::Rut,
      rut: RutInput::new(),
      password: String::new(),
      session: None,
      status_msg: String::new(),
      client: Arc::new(client),
      session_file,
      rut_policy: RutPolicy::default(),
    }
  }

  // ── Session slot ──────────────────────────────────────────────────────────

  /// Resume from the session file if its token is still live on the server.
  pub async fn restore_session(&mut self) -> anyhow::Result<()> {
    let Some(stored) = session::load(&self.session_file)? else {
      return Ok(());
    };
    match self.client.session(&stored.access_token).await {
      Ok(Some(ctx)) => {
        self.session = Some(StoredSession {
          routing_role: ctx.routing_role,
          ..stored
        });
        self.screen = Screen::Dashboard;
      }
      Ok(None) => {
        session::clear(&self.session_file)?;
        self.status_msg = "La sesión expiró, inicie sesión nuevamente.".into();
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
    Ok(())
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match self.screen {
      Screen::Login => self.handle_login_key(key).await,
      Screen::Dashboard => self.handle_dashboard_key(key).await,
    }
  }

  async fn handle_login_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Esc => return Ok(false),
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.focus = self.focus.toggle();
      }
      KeyCode::Enter => match self.focus {
        Focus::Rut => self.focus = Focus::Password,
        Focus::Password => self.submit().await?,
      },
      KeyCode::Backspace => match self.focus {
        Focus::Rut => {
          self.rut.backspace();
        }
        Focus::Password => {
          self.password.pop();
        }
      },
      KeyCode::Char(c) => match self.focus {
        Focus::Rut => {
          self.rut.push(c);
        }
        Focus::Password => self.password.push(c),
      },
      _ => {}
    }
    Ok(true)
  }

  async fn handle_dashboard_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
      KeyCode::Char('l') => self.logout().await?,
      _ => {}
    }
    Ok(true)
  }

  // ── Login / logout ────────────────────────────────────────────────────────

  /// Validate locally, then log in. A RUT that fails the checksum never
  /// reaches the server.
  async fn submit(&mut self) -> anyhow::Result<()> {
    if self.rut.is_empty() || self.password.is_empty() {
      self.status_msg = "Ingrese su RUT y contraseña.".into();
      return Ok(());
    }
    if let Err(e) = validate_login_rut(self.rut.as_str(), self.rut_policy) {
      self.status_msg = e.to_string();
      self.focus = Focus::Rut;
      return Ok(());
    }

    self.status_msg = "Iniciando sesión…".into();
    let outcome = match self.client.login(self.rut.as_str(), &self.password).await {
      Ok(outcome) => outcome,
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        return Ok(());
      }
    };

    match (outcome.data, outcome.error) {
      (Some(data), _) => {
        let stored = StoredSession {
          routing_role: outcome.routing_role.unwrap_or_default(),
          access_token: data.access_token,
          email:        data.email,
        };
        session::save(&self.session_file, &stored)?;
        self.status_msg = format!("Sesión iniciada como {}", stored.email);
        self.session = Some(stored);
        self.password.clear();
        self.screen = Screen::Dashboard;
      }
      (None, Some(err)) => self.status_msg = err.message,
      (None, None) => self.status_msg = "Error: respuesta de inicio de sesión vacía".into(),
    }
    Ok(())
  }

  /// Revoke the session, clear the slot and return to the login form.
  pub async fn logout(&mut self) -> anyhow::Result<()> {
    if let Some(stored) = self.session.take() {
      if let Err(e) = self.client.logout(&stored.access_token).await {
        self.status_msg = format!("Error: {e}");
      } else {
        self.status_msg = "Sesión cerrada.".into();
      }
    }
    session::clear(&self.session_file)?;
    self.rut.clear();
    self.password.clear();
    self.focus = Focus::Rut;
    self.screen = Screen::Login;
    Ok(())
  }
}

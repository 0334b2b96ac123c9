//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings, RUTs
//! their compact form.

use academia_core::{
  Partition,
  account::{Account, Profile},
  session::SessionContext,
};
use academia_rut::Rut;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Partition tables ─────────────────────────────────────────────────────────

/// The role-specific column of a partition table, if it has one.
pub fn detail_column(p: Partition) -> Option<&'static str> {
  match p {
    Partition::Admin => None,
    Partition::Student => Some("sport"),
    Partition::Professor => Some("discipline"),
    Partition::Kinesiologist | Partition::Nutritionist => Some("license_number"),
  }
}

/// `SELECT` over a partition table with the columns [`RawAccount`] expects,
/// followed by `tail` (a `WHERE` / `ORDER BY` clause).
pub fn select_accounts_sql(p: Partition, tail: &str) -> String {
  format!(
    "SELECT account_id, rut, email, full_name, {}, created_at FROM {} {tail}",
    detail_column(p).unwrap_or("NULL"),
    p.table_name(),
  )
}

/// `INSERT` into a partition table; parameters follow
/// [`account_insert_params`].
pub fn insert_account_sql(p: Partition) -> String {
  match detail_column(p) {
    Some(col) => format!(
      "INSERT INTO {} (account_id, rut, email, full_name, created_at, {col})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      p.table_name(),
    ),
    None => format!(
      "INSERT INTO {} (account_id, rut, email, full_name, created_at)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      p.table_name(),
    ),
  }
}

pub fn account_insert_params(account: &Account) -> Vec<Option<String>> {
  let mut params = vec![
    Some(encode_uuid(account.account_id)),
    Some(account.rut.compact().to_string()),
    Some(account.email.clone()),
    Some(account.full_name.clone()),
    Some(encode_dt(account.created_at)),
  ];
  if detail_column(account.partition()).is_some() {
    params.push(account.profile.detail().map(str::to_string));
  }
  params
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a partition table row.
pub struct RawAccount {
  pub account_id: String,
  pub rut:        String,
  pub email:      String,
  pub full_name:  String,
  pub detail:     Option<String>,
  pub created_at: String,
}

impl RawAccount {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id: row.get(0)?,
      rut:        row.get(1)?,
      email:      row.get(2)?,
      full_name:  row.get(3)?,
      detail:     row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_account(self, partition: Partition) -> Result<Account> {
    Ok(Account {
      account_id: decode_uuid(&self.account_id)?,
      rut:        Rut::parse(&self.rut)?,
      email:      self.email,
      full_name:  self.full_name,
      created_at: decode_dt(&self.created_at)?,
      profile:    Profile::from_parts(partition, self.detail),
    })
  }
}

/// Raw strings read directly from a `sessions` row.
pub struct RawSession {
  pub user_id:    String,
  pub email:      String,
  pub partition:  Option<String>,
  pub expires_at: String,
}

impl RawSession {
  /// `None` when the login flow never bound a partition to the session, or
  /// bound one this build does not know.
  pub fn into_context(self) -> Result<Option<SessionContext>> {
    let Some(name) = self.partition else {
      return Ok(None);
    };
    let partition = match Partition::from_name(&name) {
      Ok(p) => p,
      Err(e) => {
        tracing::warn!(error = %e, "session bound to unknown partition");
        return Ok(None);
      }
    };
    Ok(Some(SessionContext {
      user_id: decode_uuid(&self.user_id)?,
      email: self.email,
      partition,
      routing_role: partition.into(),
      expires_at: decode_dt(&self.expires_at)?,
    }))
  }
}

//! [`SqliteStore`]: the SQLite implementation of the Academia capabilities.

use std::path::Path;

use academia_core::{
  Partition,
  account::{Account, NewAccount},
  session::{AuthSession, SessionContext},
  store::{
    AccountDirectory, Backend, IdentityProvider, PartitionLookup, PartitionSource,
    SessionStore, SignInError,
  },
};
use academia_rut::{Rut, RutPolicy};
use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  password_hash::SaltString,
};
use chrono::{Duration, Utc};
use rand_core::OsRng;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawAccount, RawSession, account_insert_params, decode_dt, decode_uuid, encode_dt,
    encode_uuid, insert_account_sql, select_accounts_sql,
  },
  schema::SCHEMA,
  token::{digest_token, generate_token},
};

/// Message the identity provider returns for any rejected sign-in, whether
/// the email is unknown or the password is wrong.
pub const INVALID_CREDENTIALS: &str = "Invalid login credentials";

const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Academia store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:        tokio_rusqlite::Connection,
  session_ttl: Duration,
  rut_policy:  RutPolicy,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self {
      conn,
      session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
      rut_policy: RutPolicy::default(),
    })
  }

  /// Lifetime of sessions issued by [`IdentityProvider::sign_in`].
  pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
    self.session_ttl = ttl;
    self
  }

  /// Policy applied to RUTs of newly provisioned accounts.
  pub fn with_rut_policy(mut self, policy: RutPolicy) -> Self {
    self.rut_policy = policy;
    self
  }

  /// Delete sessions whose expiry has passed. Returns how many were removed.
  pub async fn purge_expired_sessions(&self) -> Result<usize> {
    let rows: Vec<(String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT token_digest, expires_at FROM sessions")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let now = Utc::now();
    let mut expired = Vec::new();
    for (digest, expires_at) in rows {
      if decode_dt(&expires_at)? <= now {
        expired.push(digest);
      }
    }
    if expired.is_empty() {
      return Ok(0);
    }

    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut removed = 0;
        for digest in &expired {
          removed += tx.execute(
            "DELETE FROM sessions WHERE token_digest = ?1",
            rusqlite::params![digest],
          )?;
        }
        tx.commit()?;
        Ok(removed)
      })
      .await?;
    tracing::debug!(removed, "purged expired sessions");
    Ok(removed)
  }

  async fn insert_session(&self, session: &AuthSession) -> Result<()> {
    let digest     = digest_token(&session.access_token);
    let user_id    = encode_uuid(session.user_id);
    let email      = session.email.clone();
    let issued_at  = encode_dt(Utc::now());
    let expires_at = encode_dt(session.expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_digest, user_id, email, partition, issued_at, expires_at)
           VALUES (?1, ?2, ?3, NULL, ?4, ?5)",
          rusqlite::params![digest, user_id, email, issued_at, expires_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

fn verify_password(phc: &str, password: &str) -> Result<bool> {
  let parsed = PasswordHash::new(phc).map_err(|e| Error::PasswordHash(e.to_string()))?;
  Ok(
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok(),
  )
}

// ─── Partition lookups ───────────────────────────────────────────────────────

/// Lookup handle scoped to one partition table.
#[derive(Clone)]
pub struct SqlitePartition {
  conn:      tokio_rusqlite::Connection,
  partition: Partition,
}

impl PartitionLookup for SqlitePartition {
  type Error = Error;

  async fn find_account_email_by_rut(&self, rut: &str) -> Result<Option<String>> {
    let sql = format!("SELECT email FROM {} WHERE rut = ?1", self.partition.table_name());
    let rut = rut.to_string();

    let email = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![rut], |row| row.get(0))
            .optional()?,
        )
      })
      .await?;
    Ok(email)
  }
}

impl PartitionSource for SqliteStore {
  type Lookup = SqlitePartition;

  fn lookup(&self, partition: Partition) -> SqlitePartition {
    SqlitePartition { conn: self.conn.clone(), partition }
  }
}

// ─── Identity provider ───────────────────────────────────────────────────────

impl Backend for SqliteStore {
  type Error = Error;
}

impl IdentityProvider for SqliteStore {
  async fn sign_in(
    &self,
    email: &str,
    password: &str,
  ) -> Result<AuthSession, SignInError<Error>> {
    let email = normalize_email(email);
    let key = email.clone();

    let credential: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, password_hash FROM credentials WHERE email = ?1",
              rusqlite::params![key],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await
      .map_err(|e| SignInError::Backend(e.into()))?;

    let Some((user_id, phc)) = credential else {
      return Err(SignInError::Rejected(INVALID_CREDENTIALS.to_string()));
    };
    if !verify_password(&phc, password).map_err(SignInError::Backend)? {
      return Err(SignInError::Rejected(INVALID_CREDENTIALS.to_string()));
    }

    let session = AuthSession {
      user_id: decode_uuid(&user_id).map_err(SignInError::Backend)?,
      email,
      access_token: generate_token(),
      expires_at: Utc::now() + self.session_ttl,
    };
    self
      .insert_session(&session)
      .await
      .map_err(SignInError::Backend)?;
    Ok(session)
  }
}

// ─── Sessions ────────────────────────────────────────────────────────────────

impl SessionStore for SqliteStore {
  async fn record_context(
    &self,
    session: &AuthSession,
    partition: Partition,
  ) -> Result<SessionContext> {
    let digest = digest_token(&session.access_token);
    let name   = partition.name().to_string();

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE sessions SET partition = ?1 WHERE token_digest = ?2",
          rusqlite::params![name, digest],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::SessionNotFound);
    }
    Ok(SessionContext::new(session, partition))
  }

  async fn resolve_session(&self, token: &str) -> Result<Option<SessionContext>> {
    let digest = digest_token(token);

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, partition, expires_at
               FROM sessions WHERE token_digest = ?1",
              rusqlite::params![digest],
              |row| {
                Ok(RawSession {
                  user_id:    row.get(0)?,
                  email:      row.get(1)?,
                  partition:  row.get(2)?,
                  expires_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    let now = Utc::now();
    Ok(
      raw
        .map(RawSession::into_context)
        .transpose()?
        .flatten()
        .filter(|ctx| !ctx.is_expired_at(now)),
    )
  }

  async fn revoke_session(&self, token: &str) -> Result<bool> {
    let digest = digest_token(token);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE token_digest = ?1",
          rusqlite::params![digest],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }
}

// ─── Account directory ───────────────────────────────────────────────────────

enum Insert {
  Created,
  DuplicateRut,
  DuplicateEmail,
}

impl AccountDirectory for SqliteStore {
  async fn create_account(&self, input: NewAccount) -> Result<Account> {
    let rut = Rut::parse_with(input.rut.compact(), self.rut_policy)?;
    let password_hash = hash_password(&input.password)?;

    let account = Account {
      account_id: Uuid::new_v4(),
      rut,
      email:      normalize_email(&input.email),
      full_name:  input.full_name.trim().to_string(),
      created_at: Utc::now(),
      profile:    input.profile,
    };

    let rut_str    = account.rut.compact().to_string();
    let email      = account.email.clone();
    let user_id    = encode_uuid(account.account_id);
    let created_at = encode_dt(account.created_at);
    let insert_sql = insert_account_sql(account.partition());
    let params     = account_insert_params(&account);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        for p in Partition::SEARCH_ORDER {
          let taken = tx
            .query_row(
              &format!("SELECT 1 FROM {} WHERE rut = ?1", p.table_name()),
              rusqlite::params![rut_str],
              |_| Ok(()),
            )
            .optional()?
            .is_some();
          if taken {
            return Ok(Insert::DuplicateRut);
          }
        }

        let email_taken = tx
          .query_row(
            "SELECT 1 FROM credentials WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if email_taken {
          return Ok(Insert::DuplicateEmail);
        }

        tx.execute(
          "INSERT INTO credentials (user_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_id, email, password_hash, created_at],
        )?;
        tx.execute(&insert_sql, rusqlite::params_from_iter(params))?;
        tx.commit()?;
        Ok(Insert::Created)
      })
      .await?;

    match outcome {
      Insert::Created => {
        tracing::info!(
          account_id = %account.account_id,
          partition = %account.partition(),
          "account provisioned"
        );
        Ok(account)
      }
      Insert::DuplicateRut => Err(academia_core::Error::DuplicateRut(account.rut.to_string()).into()),
      Insert::DuplicateEmail => Err(academia_core::Error::DuplicateEmail(account.email).into()),
    }
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
    let id_str = encode_uuid(id);

    let found: Option<(Partition, RawAccount)> = self
      .conn
      .call(move |conn| {
        for p in Partition::SEARCH_ORDER {
          let raw = conn
            .query_row(
              &select_accounts_sql(p, "WHERE account_id = ?1"),
              rusqlite::params![id_str],
              RawAccount::from_row,
            )
            .optional()?;
          if let Some(raw) = raw {
            return Ok(Some((p, raw)));
          }
        }
        Ok(None)
      })
      .await?;

    found.map(|(p, raw)| raw.into_account(p)).transpose()
  }

  async fn list_accounts(&self, partition: Option<Partition>) -> Result<Vec<Account>> {
    let partitions: Vec<Partition> = match partition {
      Some(p) => vec![p],
      None => Partition::SEARCH_ORDER.to_vec(),
    };

    let raws: Vec<(Partition, RawAccount)> = self
      .conn
      .call(move |conn| {
        let mut out = Vec::new();
        for p in partitions {
          let mut stmt = conn.prepare(&select_accounts_sql(p, "ORDER BY created_at, rut"))?;
          let rows = stmt
            .query_map([], RawAccount::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          out.extend(rows.into_iter().map(|raw| (p, raw)));
        }
        Ok(out)
      })
      .await?;

    raws
      .into_iter()
      .map(|(p, raw)| raw.into_account(p))
      .collect()
  }

  async fn delete_account(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    // Partition rows and sessions cascade from the credential.
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM credentials WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if removed > 0 {
      tracing::info!(account_id = %id, "account deleted");
    }
    Ok(removed > 0)
  }
}

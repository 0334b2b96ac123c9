//! Integration tests for `SqliteStore` against an in-memory database.

use academia_core::{
  Partition,
  account::{NewAccount, Profile},
  login::{Authenticator, LoginError},
  session::RoutingRole,
  store::{AccountDirectory, IdentityProvider, PartitionLookup, PartitionSource, SessionStore, SignInError},
};
use academia_rut::{Rut, RutPolicy};
use chrono::Duration;
use uuid::Uuid;

use crate::{Error, SqliteStore, store::INVALID_CREDENTIALS};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_account(rut: &str, email: &str, profile: Profile) -> NewAccount {
  NewAccount {
    rut:       Rut::parse(rut).unwrap(),
    email:     email.to_string(),
    full_name: "Test Person".to_string(),
    password:  "correct horse".to_string(),
    profile,
  }
}

fn professor() -> NewAccount {
  new_account(
    "12.345.678-5",
    "p@x.com",
    Profile::Professor { discipline: Some("athletics".into()) },
  )
}

// ─── Provisioning ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_account() {
  let s = store().await;

  let created = s.create_account(professor()).await.unwrap();
  assert_eq!(created.partition(), Partition::Professor);
  assert_eq!(created.rut.compact(), "123456785");

  let fetched = s.get_account(created.account_id).await.unwrap().unwrap();
  assert_eq!(fetched.account_id, created.account_id);
  assert_eq!(fetched.email, "p@x.com");
  assert_eq!(fetched.profile, Profile::Professor { discipline: Some("athletics".into()) });
}

#[tokio::test]
async fn get_account_missing_returns_none() {
  let s = store().await;
  assert!(s.get_account(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn email_is_normalised() {
  let s = store().await;
  let account = s
    .create_account(new_account("7.654.321-6", "  Coach@Academia.CL ", Profile::Admin))
    .await
    .unwrap();
  assert_eq!(account.email, "coach@academia.cl");
}

#[tokio::test]
async fn duplicate_rut_across_partitions_is_rejected() {
  let s = store().await;
  s.create_account(professor()).await.unwrap();

  let clash = new_account("123456785", "other@x.com", Profile::Student { sport: None });
  let err = s.create_account(clash).await.unwrap_err();
  assert!(matches!(err, Error::Core(academia_core::Error::DuplicateRut(_))), "{err}");
  assert!(s.list_accounts(Some(Partition::Student)).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  s.create_account(professor()).await.unwrap();

  let clash = new_account("7.654.321-6", "P@X.com", Profile::Admin);
  let err = s.create_account(clash).await.unwrap_err();
  assert!(matches!(err, Error::Core(academia_core::Error::DuplicateEmail(_))), "{err}");
}

#[tokio::test]
async fn strict_policy_refuses_bypass_rut() {
  let s = store().await.with_rut_policy(RutPolicy::strict());
  let err = s
    .create_account(new_account("11", "master@x.com", Profile::Admin))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(academia_core::Error::InvalidRut(_))), "{err}");

  let lenient = store().await;
  assert!(lenient.create_account(new_account("11", "master@x.com", Profile::Admin)).await.is_ok());
}

#[tokio::test]
async fn list_accounts_filters_by_partition() {
  let s = store().await;
  s.create_account(professor()).await.unwrap();
  s.create_account(new_account("7.654.321-6", "s@x.com", Profile::Student { sport: Some("judo".into()) }))
    .await
    .unwrap();
  s.create_account(new_account("1.000.013-0", "n@x.com", Profile::Nutritionist { license_number: None }))
    .await
    .unwrap();

  assert_eq!(s.list_accounts(None).await.unwrap().len(), 3);
  let students = s.list_accounts(Some(Partition::Student)).await.unwrap();
  assert_eq!(students.len(), 1);
  assert_eq!(students[0].profile, Profile::Student { sport: Some("judo".into()) });
}

#[tokio::test]
async fn delete_account_cascades_to_credentials_and_sessions() {
  let s = store().await;
  let account = s.create_account(professor()).await.unwrap();
  let session = s.sign_in("p@x.com", "correct horse").await.unwrap();
  s.record_context(&session, Partition::Professor).await.unwrap();

  assert!(s.delete_account(account.account_id).await.unwrap());
  assert!(!s.delete_account(account.account_id).await.unwrap());
  assert!(s.get_account(account.account_id).await.unwrap().is_none());
  assert!(s.resolve_session(&session.access_token).await.unwrap().is_none());
  assert!(matches!(
    s.sign_in("p@x.com", "correct horse").await,
    Err(SignInError::Rejected(_))
  ));
}

// ─── Partition lookups ───────────────────────────────────────────────────────

#[tokio::test]
async fn lookup_only_matches_owning_partition() {
  let s = store().await;
  s.create_account(professor()).await.unwrap();

  let hit = s.lookup(Partition::Professor).find_account_email_by_rut("123456785").await.unwrap();
  assert_eq!(hit.as_deref(), Some("p@x.com"));

  for p in [Partition::Admin, Partition::Student, Partition::Kinesiologist, Partition::Nutritionist] {
    assert!(s.lookup(p).find_account_email_by_rut("123456785").await.unwrap().is_none());
  }
}

// ─── Identity provider ───────────────────────────────────────────────────────

#[tokio::test]
async fn sign_in_issues_unbound_session() {
  let s = store().await;
  s.create_account(professor()).await.unwrap();

  let session = s.sign_in(" P@X.COM ", "correct horse").await.unwrap();
  assert_eq!(session.email, "p@x.com");
  assert!(!session.access_token.is_empty());
  // Not usable until the login flow binds a partition.
  assert!(s.resolve_session(&session.access_token).await.unwrap().is_none());
}

#[tokio::test]
async fn sign_in_rejects_wrong_password_and_unknown_email() {
  let s = store().await;
  s.create_account(professor()).await.unwrap();

  for (email, password) in [("p@x.com", "wrong"), ("nobody@x.com", "correct horse")] {
    match s.sign_in(email, password).await {
      Err(SignInError::Rejected(msg)) => assert_eq!(msg, INVALID_CREDENTIALS),
      other => panic!("expected rejection, got {other:?}"),
    }
  }
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn recorded_context_resolves_until_revoked() {
  let s = store().await;
  let account = s.create_account(professor()).await.unwrap();
  let session = s.sign_in("p@x.com", "correct horse").await.unwrap();

  let ctx = s.record_context(&session, Partition::Professor).await.unwrap();
  assert_eq!(ctx.routing_role, RoutingRole::Professor);

  let resolved = s.resolve_session(&session.access_token).await.unwrap().unwrap();
  assert_eq!(resolved.user_id, account.account_id);
  assert_eq!(resolved.partition, Partition::Professor);

  assert!(s.revoke_session(&session.access_token).await.unwrap());
  assert!(!s.revoke_session(&session.access_token).await.unwrap());
  assert!(s.resolve_session(&session.access_token).await.unwrap().is_none());
}

#[tokio::test]
async fn record_context_for_unknown_token_fails() {
  let s = store().await;
  s.create_account(professor()).await.unwrap();
  let mut session = s.sign_in("p@x.com", "correct horse").await.unwrap();
  session.access_token = "forged".into();

  assert!(matches!(
    s.record_context(&session, Partition::Professor).await,
    Err(Error::SessionNotFound)
  ));
}

#[tokio::test]
async fn expired_sessions_do_not_resolve_and_are_purged() {
  let s = store().await.with_session_ttl(Duration::seconds(-1));
  s.create_account(professor()).await.unwrap();
  let session = s.sign_in("p@x.com", "correct horse").await.unwrap();
  s.record_context(&session, Partition::Professor).await.unwrap();

  assert!(s.resolve_session(&session.access_token).await.unwrap().is_none());
  assert_eq!(s.purge_expired_sessions().await.unwrap(), 1);
  assert_eq!(s.purge_expired_sessions().await.unwrap(), 0);
}

// ─── End to end through the authenticator ────────────────────────────────────

#[tokio::test]
async fn authenticator_over_sqlite() {
  let s = store().await;
  s.create_account(professor()).await.unwrap();
  let auth = Authenticator::for_all_partitions(&s, s.clone());

  let signed_in = auth.login("12.345.678-5", "correct horse").await.unwrap();
  assert_eq!(signed_in.partition, Partition::Professor);

  assert_eq!(
    auth.login("12.345.678-5", "nope").await.unwrap_err(),
    LoginError::InvalidCredentials(INVALID_CREDENTIALS.into())
  );
  assert!(matches!(
    auth.login("7.654.321-6", "correct horse").await,
    Err(LoginError::NotRegistered { .. })
  ));
}

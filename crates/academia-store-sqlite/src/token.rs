//! Session bearer tokens.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest as _, Sha256};

/// 32 random bytes, URL-safe base64.
pub fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex SHA-256 of a token; the only form that reaches the database.
pub fn digest_token(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

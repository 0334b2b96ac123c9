//! [`Rut`]: a validated national identification number.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  checksum::{LEGACY_BYPASS_RUT, RutPolicy, compute_check_digit, normalize, split},
  error::{Result, RutError},
  format::format_for_display,
};

/// A RUT that passed validation.
///
/// Stored and compared in compact form (`123456785`); [`Display`](fmt::Display)
/// renders the grouped form (`12.345.678-5`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rut {
  compact: String,
}

impl Rut {
  /// Parse under the default policy.
  pub fn parse(raw: &str) -> Result<Self> { Self::parse_with(raw, RutPolicy::default()) }

  pub fn parse_with(raw: &str, policy: RutPolicy) -> Result<Self> {
    let compact = normalize(raw);
    if compact.is_empty() {
      return Err(RutError::Empty);
    }
    if policy.allow_legacy_bypass && compact == LEGACY_BYPASS_RUT {
      return Ok(Self { compact });
    }

    let (body, found) =
      split(&compact).ok_or_else(|| RutError::TooShort(raw.to_string()))?;
    let expected = compute_check_digit(body)
      .ok_or_else(|| RutError::InvalidBody(body.to_string()))?;
    if !expected.eq_ignore_ascii_case(&found) {
      return Err(RutError::CheckDigitMismatch { expected, found });
    }
    Ok(Self { compact })
  }

  /// Separator-free comparison form.
  pub fn compact(&self) -> &str { &self.compact }

  pub fn body(&self) -> &str { &self.compact[..self.compact.len() - 1] }

  pub fn check_char(&self) -> char {
    self.compact.chars().last().unwrap_or('0')
  }
}

impl fmt::Display for Rut {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&format_for_display(&self.compact))
  }
}

impl std::str::FromStr for Rut {
  type Err = RutError;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for Rut {
  type Error = RutError;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<Rut> for String {
  fn from(rut: Rut) -> Self { rut.compact }
}

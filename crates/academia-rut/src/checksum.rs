//! Normalisation, modulo-11 checksum and validity rules.

/// Cleaned value accepted by [`is_valid`] regardless of its checksum.
///
/// Kept for the seeded master account; see [`RutPolicy::strict`] to turn it
/// off.
pub const LEGACY_BYPASS_RUT: &str = "11";

/// Strip everything except ASCII digits and `K`/`k`, uppercasing the `K`.
///
/// Returns an empty string when nothing usable remains.
pub fn normalize(raw: &str) -> String {
  raw
    .chars()
    .filter(|c| c.is_ascii_digit() || matches!(c, 'k' | 'K'))
    .map(|c| c.to_ascii_uppercase())
    .collect()
}

/// Compute the check character for a RUT body.
///
/// Digits are weighted from least to most significant with a multiplier that
/// cycles through `2..=7`. Returns `None` for an empty body or one containing
/// anything other than ASCII digits.
pub fn compute_check_digit(body: &str) -> Option<char> {
  if body.is_empty() {
    return None;
  }

  // Reduced on every step so arbitrarily long bodies cannot overflow.
  let mut sum = 0u32;
  let mut multiplier = 2u32;
  for c in body.chars().rev() {
    sum = (sum + c.to_digit(10)? * multiplier) % 11;
    multiplier = if multiplier == 7 { 2 } else { multiplier + 1 };
  }

  match 11 - sum {
    11 => Some('0'),
    10 => Some('K'),
    d => char::from_digit(d, 10),
  }
}

/// Split a cleaned value into `(body, check character)`.
///
/// `None` when fewer than two characters are present.
pub(crate) fn split(cleaned: &str) -> Option<(&str, char)> {
  if cleaned.len() < 2 {
    return None;
  }
  let (body, check) = cleaned.split_at(cleaned.len() - 1);
  check.chars().next().map(|c| (body, c))
}

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Validation policy. The default honours [`LEGACY_BYPASS_RUT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RutPolicy {
  pub allow_legacy_bypass: bool,
}

impl Default for RutPolicy {
  fn default() -> Self { Self { allow_legacy_bypass: true } }
}

impl RutPolicy {
  /// Checksum only; the bypass value is rejected like any other bad RUT.
  pub const fn strict() -> Self { Self { allow_legacy_bypass: false } }

  pub fn is_valid(&self, raw: &str) -> bool {
    let cleaned = normalize(raw);
    if self.allow_legacy_bypass && cleaned == LEGACY_BYPASS_RUT {
      return true;
    }
    let Some((body, supplied)) = split(&cleaned) else {
      return false;
    };
    compute_check_digit(body)
      .is_some_and(|expected| expected.eq_ignore_ascii_case(&supplied))
  }
}

/// Validate a free-form RUT under the default policy.
///
/// Never fails; malformed input simply yields `false`.
pub fn is_valid(raw: &str) -> bool { RutPolicy::default().is_valid(raw) }

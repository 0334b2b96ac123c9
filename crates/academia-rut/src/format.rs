//! Display formatting and the live-input field.

use crate::checksum::{normalize, split};

/// Format a RUT for display: `12.345.678-5`.
///
/// A single cleaned character is returned unchanged (the user is still
/// typing). Never fails; odd input just produces a partially formatted string.
pub fn format_for_display(raw: &str) -> String {
  let cleaned = normalize(raw);
  let Some((body, check)) = split(&cleaned) else {
    return cleaned;
  };

  let mut out = String::with_capacity(body.len() + body.len() / 3 + 2);
  for (i, c) in body.chars().enumerate() {
    if i > 0 && (body.len() - i) % 3 == 0 {
      out.push('.');
    }
    out.push(c);
  }
  out.push('-');
  out.push(check);
  out
}

/// A text field that reformats its content on every edit.
///
/// Content is only rewritten when the formatted text differs from what was
/// typed, so an edit triggered by the field's own change notification settles
/// after one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RutInput {
  content: String,
}

impl RutInput {
  pub fn new() -> Self { Self::default() }

  pub fn as_str(&self) -> &str { &self.content }

  pub fn is_empty(&self) -> bool { self.content.is_empty() }

  /// Replace the content with `typed`, reformatting it. Returns `true` when
  /// the stored content differs from `typed`.
  pub fn update(&mut self, typed: &str) -> bool {
    let formatted = format_for_display(typed);
    let rewritten = formatted != typed;
    self.content = formatted;
    rewritten
  }

  /// Append one keystroke.
  pub fn push(&mut self, c: char) -> bool {
    let mut typed = self.content.clone();
    typed.push(c);
    self.update(&typed)
  }

  /// Delete the last typed character.
  pub fn backspace(&mut self) -> bool {
    let mut typed = self.content.clone();
    typed.pop();
    // A trailing separator would otherwise swallow the keystroke.
    while typed.ends_with(['.', '-']) {
      typed.pop();
    }
    self.update(&typed)
  }

  pub fn clear(&mut self) { self.content.clear(); }
}

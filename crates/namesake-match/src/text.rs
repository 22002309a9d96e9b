//! Case-insensitive character helpers shared by the comparers.
//!
//! Folding is per character via `char::to_lowercase`, and lengths are counted
//! in characters.

pub(crate) fn chars_eq_ignore_case(a: char, b: char) -> bool {
  a == b || a.to_lowercase().eq(b.to_lowercase())
}

pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
  prefix_eq_ignore_case(a, b, usize::MAX)
}

/// Compare the first `len` characters of `a` and `b`. A string shorter than
/// `len` is compared in full, so it only matches an equally short one.
pub(crate) fn prefix_eq_ignore_case(a: &str, b: &str, len: usize) -> bool {
  let mut a = a.chars().take(len);
  let mut b = b.chars().take(len);
  loop {
    match (a.next(), b.next()) {
      (None, None) => return true,
      (Some(x), Some(y)) if chars_eq_ignore_case(x, y) => {}
      _ => return false,
    }
  }
}

/// Split typed text into name tokens: commas and double quotes act as spaces,
/// empty tokens are dropped.
pub(crate) fn name_tokens(text: &str) -> Vec<&str> {
  text
    .split([' ', ',', '"'])
    .filter(|t| !t.is_empty())
    .collect()
}

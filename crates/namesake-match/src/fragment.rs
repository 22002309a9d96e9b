//! Matching of single name fragments ("John", "Sm").

use crate::{synonyms::are_synonyms, text::prefix_eq_ignore_case};

/// Compare name fragment `a` against `b`, case-insensitively.
///
/// Strict: `a` must start with `b`. Loose: the first `min(len(a), len(b))`
/// characters must agree, so either one may be a prefix of the other.
pub fn fragment_match(a: &str, b: &str, strict: bool) -> bool {
  if a.is_empty() || b.is_empty() {
    return false;
  }
  let mut len = b.chars().count();
  if !strict {
    len = len.min(a.chars().count());
  }
  prefix_eq_ignore_case(a, b, len)
}

/// [`fragment_match`], falling back to the nickname table.
pub fn fragment_match_with_synonyms(a: &str, b: &str, strict: bool) -> bool {
  fragment_match(a, b, strict) || are_synonyms(a, b)
}

//! Nickname equivalences between given names.

use crate::text::eq_ignore_case;

/// Pairs of names treated as the same person, compared case-insensitively in
/// both directions.
pub static NAME_SYNONYMS: &[(&str, &str)] = &[
  ("jon", "john"),
  ("joseph", "joe"),
  ("robert", "bob"),
  ("gene", "jean"),
  ("jesse", "jessie"),
  ("ian", "iain"),
  ("richard", "dick"),
  ("william", "bill"),
  ("william", "will"),
  ("anthony", "tony"),
  ("michael", "mike"),
  ("eric", "erik"),
  ("elizabeth", "liz"),
  ("jeff", "geoff"),
  ("jeff", "geoffrey"),
  ("tom", "thomas"),
  ("dave", "david"),
  ("jim", "james"),
  ("abigal", "abby"),
  ("amanda", "amy"),
  ("amanda", "manda"),
  ("jennifer", "jenny"),
  ("christopher", "chris"),
  ("rebecca", "becca"),
  ("rebecca", "becky"),
  ("anderson", "andersen"),
  ("johnson", "johnsen"),
];

/// True if `a` and `b` form a pair in [`NAME_SYNONYMS`], in either order.
pub fn are_synonyms(a: &str, b: &str) -> bool {
  if a.is_empty() || b.is_empty() {
    return false;
  }
  NAME_SYNONYMS.iter().any(|(x, y)| {
    (eq_ignore_case(x, a) && eq_ignore_case(y, b))
      || (eq_ignore_case(x, b) && eq_ignore_case(y, a))
  })
}

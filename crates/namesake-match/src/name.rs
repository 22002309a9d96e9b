//! Name comparison: typed text against a structured name, and structured
//! name against structured name.

use namesake_core::Contact;

use crate::{
  fragment::fragment_match_with_synonyms,
  match_type::{MatchPart, MatchType},
  text::{eq_ignore_case, name_tokens},
};

/// Outcome of [`compare_name_to_string_full`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameStringMatch {
  pub match_type:         MatchType,
  /// Every name part that matched at least one token.
  pub matched_parts:      MatchPart,
  /// The part matched by the first token.
  pub first_matched_part: MatchPart,
  /// Characters across all matched tokens; the completion ranking score.
  pub matched_char_count: usize,
}

impl NameStringMatch {
  fn not_applicable() -> Self {
    Self {
      match_type:         MatchType::NotApplicable,
      matched_parts:      MatchPart::NOT_APPLICABLE,
      first_matched_part: MatchPart::NOT_APPLICABLE,
      matched_char_count: 0,
    }
  }
}

/// The fragments of one name part, with a mask of those already claimed by a
/// token.
struct PartFragments<'a> {
  part:      MatchPart,
  fragments: Vec<&'a str>,
  consumed:  Vec<bool>,
}

impl<'a> PartFragments<'a> {
  fn new(part: MatchPart, fragments: Vec<&'a str>) -> Self {
    let consumed = vec![false; fragments.len()];
    Self { part, fragments, consumed }
  }

  /// Claim the first unconsumed fragment matching `token`.
  fn claim(&mut self, token: &str, strict: bool) -> bool {
    let found = self
      .fragments
      .iter()
      .zip(&self.consumed)
      .position(|(f, used)| !used && fragment_match_with_synonyms(f, token, strict));
    match found {
      Some(i) => {
        self.consumed[i] = true;
        true
      }
      None => false,
    }
  }
}

/// Score free text (e.g. what the user typed) against `contact`'s name.
///
/// Tokens are matched in order against the given, then additional, then
/// family fragments; each fragment can be claimed once. Scanning stops at the
/// first token that matches nothing. With `allow_partial` the fragment test is
/// loose, otherwise a fragment must start with the token.
pub fn compare_name_to_string_full(
  contact: &Contact,
  text: &str,
  allow_partial: bool,
) -> NameStringMatch {
  let Some(name) = contact.name.as_ref().filter(|n| !n.is_empty()) else {
    return NameStringMatch::not_applicable();
  };
  let strict = !allow_partial;

  let mut parts = [
    PartFragments::new(MatchPart::GIVEN_NAME, name.given_fragments()),
    PartFragments::new(MatchPart::ADDITIONAL_NAME, name.additional_fragments()),
    PartFragments::new(MatchPart::FAMILY_NAME, name.family_fragments()),
  ];
  let fragment_count: usize = parts.iter().map(|p| p.fragments.len()).sum();

  let mut this_part = MatchPart::NOT_APPLICABLE;
  let mut match_count = 0;
  let mut matched_char_count = 0;
  let mut matched_parts = MatchPart::NONE;
  let mut first_matched_part = MatchPart::NONE;

  for token in name_tokens(text) {
    this_part = parts
      .iter_mut()
      .find_map(|p| p.claim(token, strict).then_some(p.part))
      .unwrap_or(MatchPart::NONE);

    if this_part.is_none() {
      break;
    }
    match_count += 1;
    matched_char_count += token.chars().count();
    matched_parts |= this_part;
    if first_matched_part.is_none() {
      first_matched_part = this_part;
    }
  }

  let mut match_type = MatchType::None;
  if match_count > 0 {
    match_type = MatchType::Vague;
    if !this_part.is_none() {
      if fragment_count == match_count {
        match_type = MatchType::Exact;
      } else if fragment_count == match_count + 1 {
        match_type = MatchType::Partial;
      }
    }
  }

  NameStringMatch {
    match_type,
    matched_parts,
    first_matched_part,
    matched_char_count,
  }
}

/// [`compare_name_to_string_full`] with prefix matching, verdict only.
pub fn compare_name_to_string(contact: &Contact, text: &str) -> MatchType {
  compare_name_to_string_full(contact, text, false).match_type
}

fn non_empty(part: &Option<String>) -> Option<&str> {
  part.as_deref().filter(|s| !s.is_empty())
}

/// Compare the structured names of two contacts part by part.
///
/// Given and additional names match loosely (nicknames included); family
/// names must be equal up to case. A family-name agreement lifts the verdict
/// one step.
pub fn compare_name(contact1: &Contact, contact2: &Contact) -> MatchType {
  let (Some(a), Some(b)) = (&contact1.name, &contact2.name) else {
    return MatchType::NotApplicable;
  };

  let mut possible = 0;
  let mut matches = 0;
  let mut family_match = false;

  for (x, y) in [(&a.given, &b.given), (&a.additional, &b.additional)] {
    if let (Some(x), Some(y)) = (non_empty(x), non_empty(y)) {
      possible += 1;
      if fragment_match_with_synonyms(x, y, false) {
        matches += 1;
      }
    }
  }

  if let (Some(x), Some(y)) = (non_empty(&a.family), non_empty(&b.family)) {
    possible += 1;
    if eq_ignore_case(x, y) {
      matches += 1;
      family_match = true;
    }
  }

  match (possible, family_match) {
    (0, _) => MatchType::NotApplicable,
    (1, true) => MatchType::Vague,
    (1, false) => MatchType::None,
    (p, true) if p == matches => MatchType::Exact,
    (p, false) if p == matches => MatchType::Partial,
    (p, true) if p == matches + 1 => MatchType::Vague,
    _ => MatchType::None,
  }
}

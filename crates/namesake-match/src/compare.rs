//! Whole-contact comparison: every per-attribute verdict folded into one.

use namesake_core::Contact;

use crate::{
  email::compare_email,
  match_type::{MatchType, combine},
  name::compare_name,
  text::eq_ignore_case,
};

/// Nicknames are not compared.
pub fn compare_nickname(_contact1: &Contact, _contact2: &Contact) -> MatchType {
  MatchType::NotApplicable
}

/// Postal addresses are not compared.
pub fn compare_address(_contact1: &Contact, _contact2: &Contact) -> MatchType {
  MatchType::NotApplicable
}

/// Telephone numbers are not compared.
pub fn compare_telephone(_contact1: &Contact, _contact2: &Contact) -> MatchType {
  MatchType::NotApplicable
}

/// Identical file-as strings are `Exact`; equal up to case, `Partial`.
pub fn compare_file_as(contact1: &Contact, contact2: &Contact) -> MatchType {
  let (Some(a), Some(b)) = (contact1.file_as.as_deref(), contact2.file_as.as_deref())
  else {
    return MatchType::NotApplicable;
  };
  if a == b {
    MatchType::Exact
  } else if eq_ignore_case(a, b) {
    MatchType::Partial
  } else {
    MatchType::None
  }
}

/// Overall verdict for two contacts, starting from `None` and keeping the
/// best per-attribute result.
///
/// A list in `contact1` is compared by file-as only. E-mail is also skipped
/// when `contact2` is a list, since a list's addresses belong to its members.
pub fn compare(contact1: &Contact, contact2: &Contact) -> MatchType {
  let mut result = MatchType::None;
  if !contact1.is_list {
    result = combine(result, compare_name(contact1, contact2));
    result = combine(result, compare_nickname(contact1, contact2));
    if !contact2.is_list {
      result = combine(result, compare_email(contact1, contact2));
    }
    result = combine(result, compare_address(contact1, contact2));
    result = combine(result, compare_telephone(contact1, contact2));
  }
  combine(result, compare_file_as(contact1, contact2))
}

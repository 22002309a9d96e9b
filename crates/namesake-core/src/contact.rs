//! Contact: the read-only record the matching engine scores.
//!
//! Only the structured name and the e-mail list carry meaning for comparison.
//! Addresses, phones and the nickname are carried through opaquely so that
//! stores can round-trip them.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Identity ────────────────────────────────────────────────────────────────

/// A store-assigned identifier, unique within one store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ContactId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<String> for ContactId {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for ContactId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

// ─── Name ────────────────────────────────────────────────────────────────────

/// A structured name (maps to vCard `N`).
///
/// Each part may hold several whitespace-separated fragments, e.g. a given
/// name of `"Mary Ann"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactName {
  pub given:      Option<String>,
  pub additional: Option<String>,
  pub family:     Option<String>,
}

impl ContactName {
  pub fn new(given: Option<&str>, additional: Option<&str>, family: Option<&str>) -> Self {
    Self {
      given:      given.map(str::to_owned),
      additional: additional.map(str::to_owned),
      family:     family.map(str::to_owned),
    }
  }

  /// Whitespace-separated fragments of the given name.
  pub fn given_fragments(&self) -> Vec<&str> { fragments(self.given.as_deref()) }

  pub fn additional_fragments(&self) -> Vec<&str> {
    fragments(self.additional.as_deref())
  }

  pub fn family_fragments(&self) -> Vec<&str> { fragments(self.family.as_deref()) }

  /// True when no part carries any non-whitespace text.
  pub fn is_empty(&self) -> bool {
    [&self.given, &self.additional, &self.family]
      .iter()
      .all(|p| p.as_deref().is_none_or(|s| s.trim().is_empty()))
  }

  /// The parts joined with single spaces, in given/additional/family order.
  pub fn full(&self) -> String {
    [&self.given, &self.additional, &self.family]
      .iter()
      .filter_map(|p| p.as_deref())
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join(" ")
  }
}

fn fragments(part: Option<&str>) -> Vec<&str> {
  part.map(|s| s.split_whitespace().collect()).unwrap_or_default()
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A contact as delivered by a [`ContactStore`](crate::store::ContactStore).
///
/// `id` is `None` until the contact has been inserted into a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:        Option<ContactId>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:      Option<ContactName>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub nickname:  Option<String>,
  /// Sort/display name (vCard `X-EVOLUTION-FILE-AS`).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file_as:   Option<String>,
  /// In insertion order; the first address is the primary one.
  #[serde(default)]
  pub emails:    Vec<String>,
  #[serde(default)]
  pub addresses: Vec<String>,
  #[serde(default)]
  pub phones:    Vec<String>,
  /// The contact is a distribution list rather than a person.
  #[serde(default)]
  pub is_list:   bool,
}

impl Contact {
  /// A contact with only given and family names set.
  pub fn named(given: &str, family: &str) -> Self {
    Self {
      name: Some(ContactName::new(Some(given), None, Some(family))),
      ..Default::default()
    }
  }

  pub fn with_id(mut self, id: impl Into<ContactId>) -> Self {
    self.id = Some(id.into());
    self
  }

  pub fn with_name(mut self, name: ContactName) -> Self {
    self.name = Some(name);
    self
  }

  pub fn with_email(mut self, address: &str) -> Self {
    self.emails.push(address.to_owned());
    self
  }

  /// The display name: the joined structured name, falling back to `file_as`.
  pub fn full_name(&self) -> String {
    let full = self.name.as_ref().map(ContactName::full).unwrap_or_default();
    if full.is_empty() {
      self.file_as.clone().unwrap_or_default()
    } else {
      full
    }
  }

  pub fn primary_email(&self) -> Option<&str> { self.emails.first().map(String::as_str) }
}

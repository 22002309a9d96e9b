//! Match verdicts and the rule for combining them.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// How confident a comparison is that two records describe the same person.
///
/// Variants are ordered by increasing confidence. `NotApplicable` means the
/// comparison had nothing to work with and is distinct from `None`, which
/// means the data disagreed.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
  NotApplicable = 0,
  None          = 1,
  Vague         = 2,
  Partial       = 3,
  Exact         = 4,
}

impl MatchType {
  /// See [`combine`].
  pub fn combine(self, next: MatchType) -> MatchType { combine(self, next) }

  /// True for `Vague` and above.
  pub fn is_match(self) -> bool { self >= Self::Vague }
}

/// Optimistically fold `next` into `prev`: the more confident verdict wins,
/// and `NotApplicable` never lowers or replaces anything.
pub fn combine(prev: MatchType, next: MatchType) -> MatchType {
  if next == MatchType::NotApplicable {
    prev
  } else {
    prev.max(next)
  }
}

// ─── MatchPart ───────────────────────────────────────────────────────────────

/// Which parts of a structured name took part in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MatchPart(u8);

impl MatchPart {
  /// No part matched.
  pub const NONE: Self = Self(0);
  pub const GIVEN_NAME: Self = Self(1);
  pub const ADDITIONAL_NAME: Self = Self(1 << 1);
  pub const FAMILY_NAME: Self = Self(1 << 2);
  /// No comparison took place.
  pub const NOT_APPLICABLE: Self = Self(1 << 7);

  pub fn bits(self) -> u8 { self.0 }

  pub fn contains(self, other: Self) -> bool {
    other.0 != 0 && self.0 & other.0 == other.0
  }

  pub fn is_none(self) -> bool { self == Self::NONE }
}

impl BitOr for MatchPart {
  type Output = Self;

  fn bitor(self, rhs: Self) -> Self { Self(self.0 | rhs.0) }
}

impl BitOrAssign for MatchPart {
  fn bitor_assign(&mut self, rhs: Self) { self.0 |= rhs.0; }
}

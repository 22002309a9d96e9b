//! Tunables for the search-driven parts of the engine.

use serde::Deserialize;

/// Matching configuration, usually read from the `[matching]` table of the
/// CLI config file. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
  /// Upper bound on OR'd clauses in a duplicate-search query.
  pub max_query_parts:        usize,
  /// Contacts per batch requested from a completion view.
  pub completion_batch_size:  usize,
  /// Completion texts shorter than this (in characters) never hit the store.
  pub minimum_query_length:   usize,
  /// Duplicate checks allowed in flight at once; further ones queue.
  pub max_concurrent_lookups: usize,
}

impl Default for MatchConfig {
  fn default() -> Self {
    Self {
      max_query_parts:        10,
      completion_batch_size:  32,
      minimum_query_length:   1,
      max_concurrent_lookups: 20,
    }
  }
}

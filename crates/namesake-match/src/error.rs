//! Error type for `namesake-match`.
//!
//! The comparers never fail; only the store-facing operations do.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("cancelled")]
  Cancelled,

  /// The duplicate gate was closed while the request waited for a slot.
  #[error("lookup queue closed")]
  QueueClosed,
}

impl MatchError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = MatchError> = std::result::Result<T, E>;

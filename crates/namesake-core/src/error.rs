//! Error types for `namesake-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("query parse error at offset {offset}: {message}")]
  QueryParse { offset: usize, message: String },

  #[error("unknown query field: {0:?}")]
  UnknownField(String),

  #[error("unknown query operator: {0:?}")]
  UnknownOperator(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error type for `namesake-store-sqlite`.

use namesake_core::ContactId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("contact not found: {0}")]
  ContactNotFound(ContactId),

  /// `modify_contact` was given a contact that was never stored.
  #[error("contact has no id")]
  MissingId,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error type for `casefile-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Lifecycle violations (stale, invalid edge, missing lead) surface here.
  #[error("core error: {0}")]
  Core(#[from] casefile_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column holds a value no domain type accepts.
  #[error("corrupt column {column}: {value}")]
  Corrupt { column: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

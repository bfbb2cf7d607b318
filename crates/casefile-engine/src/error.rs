//! Error types for `casefile-engine`.
//!
//! Scoring never fails on dirty data; these errors only arise while loading
//! static configuration input.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid jurisdiction registry: {0}")]
  InvalidRegistry(String),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

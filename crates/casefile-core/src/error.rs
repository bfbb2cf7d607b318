//! Error types for `casefile-core`.

use thiserror::Error;

use crate::lead::{LeadId, LeadStatus};

#[derive(Debug, Error)]
pub enum Error {
  #[error("lead not found: {0}")]
  LeadNotFound(LeadId),

  #[error("invalid transition for lead: {from} -> {to}")]
  InvalidTransition { from: LeadStatus, to: LeadStatus },

  #[error("lead {id} is {actual}, expected {expected}")]
  StaleTransition {
    id:       LeadId,
    expected: LeadStatus,
    actual:   LeadStatus,
  },

  #[error("invalid policy: {0}")]
  InvalidPolicy(String),

  #[error("unknown lead status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown artifact type: {0:?}")]
  UnknownArtifactType(String),

  #[error("unknown source class: {0:?}")]
  UnknownSourceClass(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! The lead state machine.
//!
//! ```text
//! NEW ─┬─> PASS ──┐
//!      ├─> MAYBE ─┴─> HUNTING ─┬─> ARTIFACT_FOUND ─> APPROVED ─> PACKAGED ─> RENDERED
//!      └─> KILL                └─> NO_ARTIFACT
//! ```
//!
//! Transitions are expressed as [`TransitionDirective`]s and applied by the
//! store as one atomic compare-and-set. Every applied transition is appended
//! to a log that is never rewritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  lead::{LeadId, LeadStatus},
};

// ─── Edges ───────────────────────────────────────────────────────────────────

/// Every legal `(from, to)` edge.
pub const EDGES: &[(LeadStatus, LeadStatus)] = &[
  (LeadStatus::New, LeadStatus::Pass),
  (LeadStatus::New, LeadStatus::Maybe),
  (LeadStatus::New, LeadStatus::Kill),
  (LeadStatus::Pass, LeadStatus::Hunting),
  (LeadStatus::Maybe, LeadStatus::Hunting),
  (LeadStatus::Hunting, LeadStatus::ArtifactFound),
  (LeadStatus::Hunting, LeadStatus::NoArtifact),
  (LeadStatus::ArtifactFound, LeadStatus::Approved),
  (LeadStatus::Approved, LeadStatus::Packaged),
  (LeadStatus::Packaged, LeadStatus::Rendered),
];

pub fn is_allowed(from: LeadStatus, to: LeadStatus) -> bool {
  EDGES.contains(&(from, to))
}

/// Reject any transition not listed in [`EDGES`].
pub fn check_transition(from: LeadStatus, to: LeadStatus) -> Result<()> {
  if is_allowed(from, to) {
    Ok(())
  } else {
    Err(Error::InvalidTransition { from, to })
  }
}

/// The statuses reachable from `from` in one step.
pub fn next_states(from: LeadStatus) -> Vec<LeadStatus> {
  EDGES
    .iter()
    .filter(|(f, _)| *f == from)
    .map(|(_, t)| *t)
    .collect()
}

// ─── Directives ──────────────────────────────────────────────────────────────

/// An instruction to move one lead to a new status, emitted by a pipeline
/// stage and consumed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDirective {
  pub candidate_id: LeadId,
  pub new_status:   LeadStatus,
  /// The score that justified the move, when the stage computes one.
  pub score:        Option<u8>,
  pub rationale:    String,
  #[serde(default)]
  pub risk_flags:   Vec<String>,
}

impl TransitionDirective {
  pub fn new(
    candidate_id: LeadId,
    new_status: LeadStatus,
    rationale: impl Into<String>,
  ) -> Self {
    Self {
      candidate_id,
      new_status,
      score: None,
      rationale: rationale.into(),
      risk_flags: Vec::new(),
    }
  }

  pub fn with_score(mut self, score: u8) -> Self {
    self.score = Some(score);
    self
  }

  pub fn with_risk_flags(mut self, flags: Vec<String>) -> Self {
    self.risk_flags = flags;
    self
  }
}

// ─── Log records ─────────────────────────────────────────────────────────────

/// One applied transition, as recorded in the append-only log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
  pub transition_id: Uuid,
  pub lead_id:       LeadId,
  pub from_status:   LeadStatus,
  pub to_status:     LeadStatus,
  pub score:         Option<u8>,
  pub rationale:     String,
  pub recorded_at:   DateTime<Utc>,
}

/// Records that a lead has been forwarded to the artifact hunt. A lead can be
/// promoted at most once (enforced by a UNIQUE constraint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
  pub promotion_id: Uuid,
  pub lead_id:      LeadId,
  /// The triage verdict the lead was forwarded from.
  pub from_status:  LeadStatus,
  pub score:        u8,
  pub recorded_at:  DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn triage_edges_leave_new_only() {
    assert!(is_allowed(LeadStatus::New, LeadStatus::Kill));
    assert!(is_allowed(LeadStatus::New, LeadStatus::Maybe));
    assert!(!is_allowed(LeadStatus::New, LeadStatus::Hunting));
    assert!(!is_allowed(LeadStatus::Pass, LeadStatus::Kill));
  }

  #[test]
  fn terminal_states_have_no_outgoing_edges() {
    for status in LeadStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
      assert!(next_states(status).is_empty(), "{status} has an exit");
    }
  }

  #[test]
  fn every_non_terminal_state_has_an_exit() {
    for status in LeadStatus::ALL.into_iter().filter(|s| !s.is_terminal()) {
      assert!(!next_states(status).is_empty(), "{status} is a dead end");
    }
  }

  #[test]
  fn packaging_cannot_skip_approval() {
    let err =
      check_transition(LeadStatus::ArtifactFound, LeadStatus::Packaged).unwrap_err();
    assert!(matches!(
      err,
      Error::InvalidTransition {
        from: LeadStatus::ArtifactFound,
        to:   LeadStatus::Packaged,
      }
    ));
  }

  #[test]
  fn hunting_resolves_two_ways() {
    assert_eq!(next_states(LeadStatus::Hunting), vec![
      LeadStatus::ArtifactFound,
      LeadStatus::NoArtifact
    ]);
  }
}

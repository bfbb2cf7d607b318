//! The `LeadStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `casefile-store-sqlite`).
//! The CLI depends on this abstraction, not on any concrete backend.

use std::{collections::BTreeMap, future::Future};

use crate::{
  artifact::ClassifiedArtifact,
  case::ScoreRun,
  lead::{Lead, LeadId, LeadStatus, NewLead},
  lifecycle::{Promotion, Transition, TransitionDirective},
};

// ─── Query / outcome types ───────────────────────────────────────────────────

/// Parameters for [`LeadStore::list_leads`].
#[derive(Debug, Clone, Default)]
pub struct LeadQuery {
  /// Restrict to leads currently in any of these statuses.
  pub statuses:       Vec<LeadStatus>,
  pub min_hook_score: Option<u8>,
  pub limit:          Option<usize>,
}

impl LeadQuery {
  pub fn with_status(status: LeadStatus) -> Self {
    Self { statuses: vec![status], ..Self::default() }
  }
}

/// Result of [`LeadStore::insert_lead`]: re-discovery of a known URL returns
/// the existing record untouched.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
  Inserted(Lead),
  Existing(Lead),
}

impl InsertOutcome {
  pub fn lead(&self) -> &Lead {
    match self {
      Self::Inserted(l) | Self::Existing(l) => l,
    }
  }

  pub fn is_inserted(&self) -> bool { matches!(self, Self::Inserted(_)) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a lead store backend.
///
/// Leads are never deleted. Status changes go through
/// [`LeadStore::apply_transition`], which must read the current status,
/// validate the edge and write the new status in a single transaction.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait LeadStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Leads ─────────────────────────────────────────────────────────────

  /// Insert a lead keyed by its canonical URL with status `NEW`. Idempotent.
  fn insert_lead(
    &self,
    input: NewLead,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  fn get_lead<'a>(
    &'a self,
    id: &'a LeadId,
  ) -> impl Future<Output = Result<Option<Lead>, Self::Error>> + Send + 'a;

  /// Leads matching `query`, highest hook score first, ties by id.
  fn list_leads<'a>(
    &'a self,
    query: &'a LeadQuery,
  ) -> impl Future<Output = Result<Vec<Lead>, Self::Error>> + Send + 'a;

  /// Number of leads in each status. Statuses with no leads are omitted.
  fn status_counts(
    &self,
  ) -> impl Future<Output = Result<BTreeMap<LeadStatus, u64>, Self::Error>> + Send + '_;

  // ── Transitions ───────────────────────────────────────────────────────

  /// Atomically move a lead from `expected` to `directive.new_status`.
  ///
  /// Fails with a stale-transition error if the stored status is no longer
  /// `expected`, and with an invalid-transition error if the edge is not in
  /// the state machine. On success the transition is appended to the log and
  /// the updated lead returned.
  fn apply_transition(
    &self,
    directive: TransitionDirective,
    expected: LeadStatus,
  ) -> impl Future<Output = Result<Lead, Self::Error>> + Send + '_;

  /// The transition log for a lead, oldest first.
  fn transitions_for<'a>(
    &'a self,
    id: &'a LeadId,
  ) -> impl Future<Output = Result<Vec<Transition>, Self::Error>> + Send + 'a;

  // ── Forwarding ────────────────────────────────────────────────────────

  /// Record the promotion back-reference and move the lead to `HUNTING` in
  /// one transaction. Returns `None`, changing nothing, if the lead was
  /// already promoted.
  fn promote<'a>(
    &'a self,
    id: &'a LeadId,
    score: u8,
  ) -> impl Future<Output = Result<Option<Promotion>, Self::Error>> + Send + 'a;

  /// Ids of every lead that has been promoted.
  fn promoted_ids(
    &self,
  ) -> impl Future<Output = Result<Vec<LeadId>, Self::Error>> + Send + '_;

  // ── Artifacts ─────────────────────────────────────────────────────────

  /// Persist an artifact. Returns `false` if an artifact for the same
  /// `(lead_id, url)` already exists; the stored record is left unchanged.
  fn insert_artifact(
    &self,
    artifact: ClassifiedArtifact,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Artifacts for a lead, ordered by artifact id.
  fn artifacts_for<'a>(
    &'a self,
    id: &'a LeadId,
  ) -> impl Future<Output = Result<Vec<ClassifiedArtifact>, Self::Error>> + Send + 'a;

  // ── Score history ─────────────────────────────────────────────────────

  /// Append a scoring run. Runs are never updated.
  fn record_score_run(
    &self,
    run: ScoreRun,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Scoring runs for a lead, oldest first.
  fn score_runs_for<'a>(
    &'a self,
    id: &'a LeadId,
  ) -> impl Future<Output = Result<Vec<ScoreRun>, Self::Error>> + Send + 'a;
}

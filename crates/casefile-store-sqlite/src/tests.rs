//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::BTreeMap;

use casefile_core::{
  artifact::{ArtifactType, Classification, ClassifiedArtifact, SearchResult, SourceClass},
  case::{BundleScore, CaseMetadata, ScoreRun, Tier},
  lead::{Candidate, IncidentType, LeadId, LeadStatus, NewLead},
  lifecycle::TransitionDirective,
  store::{LeadQuery, LeadStore},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_lead(url: &str, hook_score: u8) -> NewLead {
  NewLead {
    candidate: Candidate {
      url: url.into(),
      title: format!("Bodycam at {url}"),
      description: "Police release bodycam footage".into(),
      risk_flags: vec!["graphic".into()],
      ..Candidate::default()
    },
    hook_score,
    evidence_prescore: 45,
    incident_type: IncidentType::Shooting,
  }
}

async fn inserted(s: &SqliteStore, url: &str, hook_score: u8) -> LeadId {
  s.insert_lead(new_lead(url, hook_score))
    .await
    .unwrap()
    .lead()
    .lead_id
    .clone()
}

fn triage(id: &LeadId, status: LeadStatus, score: u8) -> TransitionDirective {
  TransitionDirective::new(id.clone(), status, format!("score {score}")).with_score(score)
}

fn artifact(lead_id: &LeadId, url: &str, confidence: f64) -> ClassifiedArtifact {
  let result = SearchResult {
    url:            url.into(),
    title:          "Critical incident briefing".into(),
    snippet:        "Officer-involved shooting".into(),
    query_category: Some("official".into()),
  };
  ClassifiedArtifact::new(lead_id, &result, Classification {
    source_class:  SourceClass::Primary,
    artifact_type: ArtifactType::Bodycam,
    confidence,
    publisher:     "phoenix.gov".into(),
  })
}

// ─── Leads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_lead() {
  let s = store().await;
  let outcome = s.insert_lead(new_lead("https://example.com/a", 72)).await.unwrap();
  assert!(outcome.is_inserted());

  let fetched = s.get_lead(&outcome.lead().lead_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, LeadStatus::New);
  assert_eq!(fetched.hook_score, 72);
  assert_eq!(fetched.evidence_prescore, 45);
  assert_eq!(fetched.incident_type, IncidentType::Shooting);
  assert_eq!(fetched.risk_flags, vec!["graphic".to_string()]);
  assert_eq!(fetched.triage_score, None);
}

#[tokio::test]
async fn rediscovery_returns_existing_record() {
  let s = store().await;
  let first = s.insert_lead(new_lead("https://example.com/a", 72)).await.unwrap();
  let again = s
    .insert_lead(new_lead("https://www.example.com/a/?utm_source=rss", 10))
    .await
    .unwrap();

  assert!(!again.is_inserted());
  assert_eq!(again.lead().lead_id, first.lead().lead_id);
  assert_eq!(again.lead().hook_score, 72);
  assert_eq!(s.status_counts().await.unwrap()[&LeadStatus::New], 1);
}

#[tokio::test]
async fn get_lead_missing_returns_none() {
  let s = store().await;
  let result = s.get_lead(&LeadId::from_stored("nope")).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn list_orders_by_hook_then_id_and_filters() {
  let s = store().await;
  inserted(&s, "https://example.com/low", 20).await;
  inserted(&s, "https://example.com/high", 90).await;
  let mid = inserted(&s, "https://example.com/mid", 50).await;
  s.apply_transition(triage(&mid, LeadStatus::Maybe, 60), LeadStatus::New)
    .await
    .unwrap();

  let all = s.list_leads(&LeadQuery::default()).await.unwrap();
  let hooks: Vec<u8> = all.iter().map(|l| l.hook_score).collect();
  assert_eq!(hooks, vec![90, 50, 20]);

  let new_only = s.list_leads(&LeadQuery::with_status(LeadStatus::New)).await.unwrap();
  assert_eq!(new_only.len(), 2);

  let query = LeadQuery {
    min_hook_score: Some(30),
    limit: Some(1),
    ..LeadQuery::default()
  };
  let top = s.list_leads(&query).await.unwrap();
  assert_eq!(top.len(), 1);
  assert_eq!(top[0].hook_score, 90);
}

#[tokio::test]
async fn status_counts_omit_empty_statuses() {
  let s = store().await;
  let a = inserted(&s, "https://example.com/a", 50).await;
  inserted(&s, "https://example.com/b", 50).await;
  s.apply_transition(triage(&a, LeadStatus::Kill, 10), LeadStatus::New)
    .await
    .unwrap();

  let counts = s.status_counts().await.unwrap();
  assert_eq!(
    counts,
    BTreeMap::from([(LeadStatus::New, 1), (LeadStatus::Kill, 1)])
  );
}

// ─── Transitions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn triage_transition_records_score_and_log() {
  let s = store().await;
  let id = inserted(&s, "https://example.com/a", 50).await;

  let lead = s
    .apply_transition(triage(&id, LeadStatus::Pass, 81), LeadStatus::New)
    .await
    .unwrap();
  assert_eq!(lead.status, LeadStatus::Pass);
  assert_eq!(lead.triage_score, Some(81));
  assert_eq!(lead.rationale.as_deref(), Some("score 81"));

  let log = s.transitions_for(&id).await.unwrap();
  assert_eq!(log.len(), 1);
  assert_eq!(log[0].from_status, LeadStatus::New);
  assert_eq!(log[0].to_status, LeadStatus::Pass);
  assert_eq!(log[0].score, Some(81));
}

#[tokio::test]
async fn stale_expected_status_is_rejected() {
  let s = store().await;
  let id = inserted(&s, "https://example.com/a", 50).await;
  s.apply_transition(triage(&id, LeadStatus::Pass, 80), LeadStatus::New)
    .await
    .unwrap();

  let err = s
    .apply_transition(triage(&id, LeadStatus::Kill, 10), LeadStatus::New)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(casefile_core::Error::StaleTransition {
      expected: LeadStatus::New,
      actual: LeadStatus::Pass,
      ..
    })
  ));
  assert_eq!(s.transitions_for(&id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn illegal_edge_is_rejected_without_writing() {
  let s = store().await;
  let id = inserted(&s, "https://example.com/a", 50).await;

  let directive = TransitionDirective::new(id.clone(), LeadStatus::Approved, "skip ahead");
  let err = s.apply_transition(directive, LeadStatus::New).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(casefile_core::Error::InvalidTransition { .. })
  ));

  let lead = s.get_lead(&id).await.unwrap().unwrap();
  assert_eq!(lead.status, LeadStatus::New);
  assert!(s.transitions_for(&id).await.unwrap().is_empty());
}

#[tokio::test]
async fn transition_on_unknown_lead_fails() {
  let s = store().await;
  let id = LeadId::from_stored("missing");
  let err = s
    .apply_transition(triage(&id, LeadStatus::Pass, 80), LeadStatus::New)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(casefile_core::Error::LeadNotFound(_))));
}

#[tokio::test]
async fn directive_risk_flags_replace_stored_flags() {
  let s = store().await;
  let id = inserted(&s, "https://example.com/a", 50).await;
  let directive = triage(&id, LeadStatus::Maybe, 65).with_risk_flags(vec!["minor".into()]);
  let lead = s.apply_transition(directive, LeadStatus::New).await.unwrap();
  assert_eq!(lead.risk_flags, vec!["minor".to_string()]);
}

// ─── Forwarding ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn promote_moves_to_hunting_once() {
  let s = store().await;
  let id = inserted(&s, "https://example.com/a", 50).await;
  s.apply_transition(triage(&id, LeadStatus::Maybe, 66), LeadStatus::New)
    .await
    .unwrap();

  let promotion = s.promote(&id, 66).await.unwrap().unwrap();
  assert_eq!(promotion.from_status, LeadStatus::Maybe);
  assert_eq!(promotion.score, 66);
  assert!(s.promote(&id, 66).await.unwrap().is_none());

  let lead = s.get_lead(&id).await.unwrap().unwrap();
  assert_eq!(lead.status, LeadStatus::Hunting);
  assert_eq!(lead.triage_score, Some(66));
  assert_eq!(s.promoted_ids().await.unwrap(), vec![id.clone()]);

  let log = s.transitions_for(&id).await.unwrap();
  let path: Vec<(LeadStatus, LeadStatus)> =
    log.iter().map(|t| (t.from_status, t.to_status)).collect();
  assert_eq!(path, vec![
    (LeadStatus::New, LeadStatus::Maybe),
    (LeadStatus::Maybe, LeadStatus::Hunting),
  ]);
}

#[tokio::test]
async fn untriaged_lead_cannot_be_promoted() {
  let s = store().await;
  let id = inserted(&s, "https://example.com/a", 50).await;
  let err = s.promote(&id, 90).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(casefile_core::Error::InvalidTransition {
      from: LeadStatus::New,
      to: LeadStatus::Hunting,
    })
  ));
  assert!(s.promoted_ids().await.unwrap().is_empty());
}

// ─── Artifacts ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn artifact_is_unique_per_lead_and_url() {
  let s = store().await;
  let id = inserted(&s, "https://example.com/a", 50).await;

  assert!(s.insert_artifact(artifact(&id, "https://phoenix.gov/bwc", 0.9)).await.unwrap());
  assert!(!s.insert_artifact(artifact(&id, "https://phoenix.gov/bwc", 0.2)).await.unwrap());
  assert!(s.insert_artifact(artifact(&id, "https://phoenix.gov/cctv", 0.8)).await.unwrap());

  let stored = s.artifacts_for(&id).await.unwrap();
  assert_eq!(stored.len(), 2);
  let bwc = stored.iter().find(|a| a.url == "https://phoenix.gov/bwc").unwrap();
  assert_eq!(bwc.confidence, 0.9);
  assert_eq!(bwc.source_class, SourceClass::Primary);
  assert!(stored.windows(2).all(|w| w[0].artifact_id <= w[1].artifact_id));
}

#[tokio::test]
async fn artifact_for_unknown_lead_fails() {
  let s = store().await;
  let id = LeadId::from_stored("missing");
  let err = s
    .insert_artifact(artifact(&id, "https://phoenix.gov/bwc", 0.9))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(casefile_core::Error::LeadNotFound(_))));
}

// ─── Score history ───────────────────────────────────────────────────────────

#[tokio::test]
async fn score_runs_are_appended() {
  let s = store().await;
  let id = inserted(&s, "https://example.com/a", 50).await;
  let case = CaseMetadata {
    defendant:     "John Smith".into(),
    jurisdiction:  "Phoenix, AZ".into(),
    incident_year: Some(2023),
    region_id:     Some("PHX".into()),
  };

  for bundle_score in [12.5, 48.0] {
    let run = ScoreRun {
      run_id: Uuid::new_v4(),
      lead_id: id.clone(),
      case_id: case.case_id(),
      case: case.clone(),
      score: BundleScore {
        artifact_scores: BTreeMap::new(),
        bundle_score,
        tier: Tier::Reject,
        recommendation: "Reject".into(),
        dominant_factor: None,
        lanes: BTreeMap::new(),
        lane_summary: BTreeMap::new(),
        missing_lanes: Vec::new(),
      },
      scored_at: Utc::now(),
    };
    s.record_score_run(run).await.unwrap();
  }

  let runs = s.score_runs_for(&id).await.unwrap();
  let scores: Vec<f64> = runs.iter().map(|r| r.score.bundle_score).collect();
  assert_eq!(scores, vec![12.5, 48.0]);
  assert_eq!(runs[0].case_id, "smith_phoenix_2023");
  assert_eq!(runs[0].case, case);
}

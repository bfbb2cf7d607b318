use std::path::Path;

use casefile_core::{
  lead::{Candidate, NewLead},
  store::{InsertOutcome, LeadStore as _},
};
use casefile_engine::{
  hook::heuristic_score,
  incident::{classify_incident, extract_location, is_incident_related},
  jurisdiction::Region,
  prescore::evidence_prescore,
};
use serde::Serialize;
use tracing::{debug, info};

use super::{Ctx, print_json, read_jsonl};

#[derive(Debug, Default, Serialize)]
struct IngestSummary {
  inserted:  usize,
  existing:  usize,
  filtered:  usize,
  malformed: usize,
}

/// Relevance gate, incident typing and admission scores for one candidate.
/// `None` when the candidate is not incident-related.
fn prepare(mut candidate: Candidate, region: Option<&Region>) -> Option<NewLead> {
  let text = format!("{} {}", candidate.title, candidate.description);
  if !is_incident_related(&text) {
    return None;
  }
  if candidate.location.as_deref().is_none_or(|l| l.trim().is_empty()) {
    candidate.location = extract_location(&text);
  }
  Some(NewLead {
    hook_score: heuristic_score(&candidate.title, &candidate.description),
    evidence_prescore: evidence_prescore(&text, region).score,
    incident_type: classify_incident(&text),
    candidate,
  })
}

pub async fn run(ctx: &Ctx, file: &Path, region_id: Option<&str>) -> anyhow::Result<()> {
  let region = ctx.region(region_id);
  let (candidates, malformed) = read_jsonl::<Candidate>(file)?;
  let mut summary = IngestSummary { malformed, ..IngestSummary::default() };

  for candidate in candidates {
    let url = candidate.url.clone();
    let Some(new) = prepare(candidate, region) else {
      summary.filtered += 1;
      debug!(%url, "not incident-related");
      continue;
    };
    match ctx.store.insert_lead(new).await? {
      InsertOutcome::Inserted(lead) => {
        summary.inserted += 1;
        debug!(id = %lead.lead_id, hook = lead.hook_score, "inserted lead");
      }
      InsertOutcome::Existing(_) => summary.existing += 1,
    }
  }

  info!(
    inserted = summary.inserted,
    existing = summary.existing,
    filtered = summary.filtered,
    malformed = summary.malformed,
    "ingest complete"
  );
  print_json(&summary)
}

#[cfg(test)]
mod tests {
  use casefile_core::lead::IncidentType;

  use super::*;

  #[test]
  fn unrelated_candidates_are_filtered() {
    let c = Candidate {
      url: "https://example.com/recipe".into(),
      title: "Ten easy weeknight pasta dishes".into(),
      ..Candidate::default()
    };
    assert!(prepare(c, None).is_none());
  }

  #[test]
  fn related_candidates_are_typed_and_scored() {
    let c = Candidate {
      url: "https://example.com/news/1".into(),
      title: "Bodycam shows police pursuit in Mesa".into(),
      description: "Officers chased a stolen car before the crash".into(),
      ..Candidate::default()
    };
    let new = prepare(c, None).unwrap();
    assert_eq!(new.incident_type, IncidentType::Pursuit);
    assert!(new.hook_score > 0);
    assert!(new.evidence_prescore >= 15);
    assert!(new.candidate.location.is_some());
  }
}

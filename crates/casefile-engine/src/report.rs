//! Missed-opportunity analysis over NO_ARTIFACT leads.

use std::collections::BTreeMap;

use casefile_core::{
  artifact::{ClassifiedArtifact, SourceClass},
  lead::{Lead, LeadId, LeadStatus},
};
use serde::Serialize;

const BREAKDOWN_LIMIT: usize = 20;
const TITLE_CHARS: usize = 100;
const SECONDARY_URLS: usize = 3;
const AGENCY_SUGGESTION_MIN: usize = 2;
const LOCATION_SUGGESTION_MIN: usize = 3;
const UNKNOWN_LOCATION: &str = "unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSummary {
  pub total_leads:     u64,
  pub artifact_found:  u64,
  pub no_artifact:     u64,
  pub new_unhunted:    u64,
  /// Percentage of resolved hunts that found an artifact, one decimal.
  pub conversion_rate: f64,
  pub by_status:       BTreeMap<LeadStatus, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissedLead {
  pub lead_id:             LeadId,
  pub title:               String,
  pub hook_score:          u8,
  pub incident_type:       String,
  pub location:            String,
  pub agencies:            Vec<String>,
  pub total_artifacts:     usize,
  pub primary_artifacts:   usize,
  pub secondary_artifacts: usize,
  pub url:                 String,
}

/// A lead with secondary footage but no primary source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecondaryVideo {
  pub lead_id:        LeadId,
  pub title:          String,
  pub hook_score:     u8,
  pub location:       String,
  pub secondary_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally {
  pub key:   String,
  pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
  Agency,
  Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrySuggestion {
  pub kind:         SuggestionKind,
  pub value:        String,
  pub missed_count: usize,
  pub suggestion:   String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MissedReport {
  pub summary:                ReportSummary,
  pub top_missed:             Vec<MissedLead>,
  pub by_incident_type:       Vec<Tally>,
  pub by_location:            Vec<Tally>,
  pub by_agency:              Vec<Tally>,
  pub secondary_video_exists: Vec<SecondaryVideo>,
  pub registry_suggestions:   Vec<RegistrySuggestion>,
}

/// Count descending, then key ascending, capped.
fn tallies(counter: BTreeMap<String, usize>) -> Vec<Tally> {
  let mut out: Vec<Tally> = counter
    .into_iter()
    .map(|(key, count)| Tally { key, count })
    .collect();
  out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
  out.truncate(BREAKDOWN_LIMIT);
  out
}

pub fn summarize(counts: &BTreeMap<LeadStatus, u64>) -> ReportSummary {
  let get = |s| counts.get(&s).copied().unwrap_or(0);
  let artifact_found = get(LeadStatus::ArtifactFound);
  let no_artifact = get(LeadStatus::NoArtifact);
  let resolved = (artifact_found + no_artifact).max(1);
  let rate = artifact_found as f64 / resolved as f64 * 100.0;
  ReportSummary {
    total_leads: counts.values().sum(),
    artifact_found,
    no_artifact,
    new_unhunted: get(LeadStatus::New),
    conversion_rate: (rate * 10.0).round() / 10.0,
    by_status: counts.clone(),
  }
}

/// Build the report from status counts, the NO_ARTIFACT leads and their
/// artifacts. Only the `top` highest-hook leads are analysed.
pub fn missed_opportunities(
  counts: &BTreeMap<LeadStatus, u64>,
  missed: &[Lead],
  artifacts: &BTreeMap<LeadId, Vec<ClassifiedArtifact>>,
  top: usize,
) -> MissedReport {
  let mut ranked: Vec<&Lead> = missed
    .iter()
    .filter(|l| l.status == LeadStatus::NoArtifact)
    .collect();
  ranked.sort_by(|a, b| {
    b.hook_score
      .cmp(&a.hook_score)
      .then_with(|| a.lead_id.cmp(&b.lead_id))
  });
  ranked.truncate(top);

  let mut incidents: BTreeMap<String, usize> = BTreeMap::new();
  let mut locations: BTreeMap<String, usize> = BTreeMap::new();
  let mut agencies: BTreeMap<String, usize> = BTreeMap::new();
  let mut top_missed = Vec::new();
  let mut secondary_video_exists = Vec::new();

  for lead in ranked {
    let location = lead
      .location
      .clone()
      .filter(|l| !l.trim().is_empty())
      .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());
    let title: String = lead.title.chars().take(TITLE_CHARS).collect();

    *incidents.entry(lead.incident_type.to_string()).or_default() += 1;
    *locations.entry(location.clone()).or_default() += 1;
    for agency in &lead.entities.agencies {
      *agencies.entry(agency.clone()).or_default() += 1;
    }

    let found = artifacts.get(&lead.lead_id).map(Vec::as_slice).unwrap_or_default();
    let (primary, secondary): (Vec<&ClassifiedArtifact>, Vec<&ClassifiedArtifact>) =
      found.iter().partition(|a| a.source_class == SourceClass::Primary);

    if primary.is_empty() && !secondary.is_empty() {
      secondary_video_exists.push(SecondaryVideo {
        lead_id:        lead.lead_id.clone(),
        title:          title.clone(),
        hook_score:     lead.hook_score,
        location:       location.clone(),
        secondary_urls: secondary.iter().take(SECONDARY_URLS).map(|a| a.url.clone()).collect(),
      });
    }

    top_missed.push(MissedLead {
      lead_id: lead.lead_id.clone(),
      title,
      hook_score: lead.hook_score,
      incident_type: lead.incident_type.to_string(),
      location,
      agencies: lead.entities.agencies.clone(),
      total_artifacts: found.len(),
      primary_artifacts: primary.len(),
      secondary_artifacts: secondary.len(),
      url: lead.url.clone(),
    });
  }

  let by_incident_type = tallies(incidents);
  let by_location = tallies(locations);
  let by_agency = tallies(agencies);

  let mut registry_suggestions: Vec<RegistrySuggestion> = by_agency
    .iter()
    .filter(|t| t.count >= AGENCY_SUGGESTION_MIN)
    .map(|t| RegistrySuggestion {
      kind:         SuggestionKind::Agency,
      value:        t.key.clone(),
      missed_count: t.count,
      suggestion:   format!("Add official YouTube/press page for {}", t.key),
    })
    .collect();
  registry_suggestions.extend(
    by_location
      .iter()
      .filter(|t| t.count >= LOCATION_SUGGESTION_MIN && t.key != UNKNOWN_LOCATION)
      .map(|t| RegistrySuggestion {
        kind:         SuggestionKind::Location,
        value:        t.key.clone(),
        missed_count: t.count,
        suggestion:   format!("Add local PD/sheriff transparency portal for {}", t.key),
      }),
  );

  MissedReport {
    summary: summarize(counts),
    top_missed,
    by_incident_type,
    by_location,
    by_agency,
    secondary_video_exists,
    registry_suggestions,
  }
}

#[cfg(test)]
mod tests {
  use casefile_core::{
    artifact::{ArtifactType, Classification, SearchResult},
    lead::{Candidate, Entities, IncidentType, NewLead},
  };
  use chrono::Utc;

  use super::*;

  fn missed(url: &str, hook: u8, location: Option<&str>, agency: &str) -> Lead {
    let candidate = Candidate {
      url: url.into(),
      title: format!("Lead at {url}"),
      location: location.map(str::to_string),
      entities: Entities { agencies: vec![agency.into()], ..Entities::default() },
      ..Candidate::default()
    };
    let mut lead = Lead::from_new(
      NewLead {
        candidate,
        hook_score: hook,
        evidence_prescore: 0,
        incident_type: IncidentType::Pursuit,
      },
      Utc::now(),
    );
    lead.status = LeadStatus::NoArtifact;
    lead
  }

  fn secondary(lead: &Lead, url: &str) -> ClassifiedArtifact {
    let result = SearchResult {
      url:            url.into(),
      title:          "repost".into(),
      snippet:        String::new(),
      query_category: None,
    };
    ClassifiedArtifact::new(&lead.lead_id, &result, Classification {
      source_class:  SourceClass::Secondary,
      artifact_type: ArtifactType::Bodycam,
      confidence:    0.4,
      publisher:     "tmz.com".into(),
    })
  }

  #[test]
  fn conversion_rate_over_resolved_hunts() {
    let counts = BTreeMap::from([
      (LeadStatus::ArtifactFound, 1),
      (LeadStatus::NoArtifact, 2),
      (LeadStatus::New, 5),
    ]);
    let s = summarize(&counts);
    assert_eq!(s.total_leads, 8);
    assert_eq!(s.new_unhunted, 5);
    assert_eq!(s.conversion_rate, 33.3);
    assert_eq!(summarize(&BTreeMap::new()).conversion_rate, 0.0);
  }

  #[test]
  fn ranks_by_hook_and_flags_secondary_only_leads() {
    let a = missed("https://a.com/1", 40, Some("Mesa"), "Mesa PD");
    let b = missed("https://b.com/2", 90, Some("Mesa"), "Mesa PD");
    let c = missed("https://c.com/3", 70, None, "Tempe PD");
    let artifacts = BTreeMap::from([(b.lead_id.clone(), vec![
      secondary(&b, "https://tmz.com/x"),
    ])]);
    let report = missed_opportunities(&BTreeMap::new(), &[a, b.clone(), c], &artifacts, 10);

    let hooks: Vec<u8> = report.top_missed.iter().map(|m| m.hook_score).collect();
    assert_eq!(hooks, vec![90, 70, 40]);
    assert_eq!(report.top_missed[1].location, "unknown");
    assert_eq!(report.secondary_video_exists.len(), 1);
    assert_eq!(report.secondary_video_exists[0].lead_id, b.lead_id);
    assert_eq!(report.by_location[0], Tally { key: "Mesa".into(), count: 2 });
  }

  #[test]
  fn suggestions_need_repeat_misses() {
    let leads: Vec<Lead> = (0..3)
      .map(|i| missed(&format!("https://x.com/{i}"), 50, Some("Tulsa"), "Tulsa PD"))
      .chain([missed("https://y.com/1", 50, None, "Solo PD")])
      .collect();
    let report = missed_opportunities(&BTreeMap::new(), &leads, &BTreeMap::new(), 10);
    let values: Vec<(SuggestionKind, &str)> = report
      .registry_suggestions
      .iter()
      .map(|s| (s.kind, s.value.as_str()))
      .collect();
    assert_eq!(values, vec![
      (SuggestionKind::Agency, "Tulsa PD"),
      (SuggestionKind::Location, "Tulsa"),
    ]);
  }

  #[test]
  fn top_limits_analysis() {
    let leads: Vec<Lead> = (0..5)
      .map(|i| missed(&format!("https://x.com/{i}"), 50 + i, None, "A"))
      .collect();
    let report = missed_opportunities(&BTreeMap::new(), &leads, &BTreeMap::new(), 2);
    assert_eq!(report.top_missed.len(), 2);
    assert_eq!(report.top_missed[0].hook_score, 54);
  }
}

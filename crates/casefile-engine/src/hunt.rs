//! The artifact hunt: query planning, the per-lead result budget, binding
//! classifications to the lead, and the HUNTING resolution.

use std::{collections::BTreeSet, fmt, sync::LazyLock};

use casefile_core::{
  artifact::{ClassifiedArtifact, SearchResult},
  canonical::canonical_url,
  lead::{IncidentType, Lead, LeadId, LeadStatus},
  lifecycle::TransitionDirective,
  policy::ArtifactGating,
};
use regex::Regex;
use serde::Serialize;

use crate::{classify::classify, jurisdiction::Region};

static FOOTAGE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)^(bodycam|dashcam|body cam|dash cam|full video|raw footage)[:\s-]*")
    .expect("static regex")
});

// ─── Query planning ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryCategory {
  Official,
  Broad,
  Court,
}

impl QueryCategory {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Official => "official",
      Self::Broad => "broad",
      Self::Court => "court",
    }
  }
}

impl fmt::Display for QueryCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HuntQuery {
  pub query:    String,
  pub category: QueryCategory,
}

fn squash(s: &str) -> String { s.split_whitespace().collect::<Vec<_>>().join(" ") }

/// Plan up to `max_queries` searches for `lead`, official sources first.
///
/// The region, when known, supplies an agency if the lead names none and
/// adds a site-scoped query per local news domain.
pub fn build_hunt_queries(
  lead: &Lead,
  region: Option<&Region>,
  max_queries: usize,
) -> Vec<HuntQuery> {
  let entities = &lead.entities;
  let city = lead
    .location
    .as_deref()
    .filter(|l| !l.trim().is_empty())
    .or_else(|| entities.locations.first().map(String::as_str))
    .unwrap_or_default();
  let agency = entities
    .agencies
    .first()
    .map(String::as_str)
    .or_else(|| region.and_then(|r| r.agencies.first()).map(|a| a.query_name()))
    .unwrap_or_default();
  let name = entities.names.first().map(String::as_str).unwrap_or_default();
  let incident = match lead.incident_type {
    IncidentType::Unknown => "",
    other => other.as_str(),
  };

  let mut queries = Vec::new();
  let mut push = |category, query: String| {
    let query = squash(&query);
    if !query.is_empty() {
      queries.push(HuntQuery { query, category });
    }
  };

  if !agency.is_empty() && !city.is_empty() {
    push(QueryCategory::Official, format!(r#""body worn camera" "{agency}" {city}"#));
    push(QueryCategory::Official, format!(r#""critical incident briefing" "{agency}""#));
  }
  if !city.is_empty() {
    push(QueryCategory::Official, format!(r#"site:youtube.com "bodycam" "{city}" {incident}"#));
  }

  let clean_title = FOOTAGE_PREFIX.replace(lead.title.trim(), "");
  let clean_title = clean_title.trim();
  if !clean_title.is_empty() {
    push(QueryCategory::Broad, format!("{clean_title} bodycam OR dashcam video"));
  }
  if !name.is_empty() && !city.is_empty() {
    push(QueryCategory::Broad, format!("{name} {city} arrest bodycam"));
  }
  if !agency.is_empty() {
    push(QueryCategory::Broad, format!("{agency} officer involved {incident} video released"));
  }

  if !name.is_empty() {
    push(QueryCategory::Court, format!("{name} court hearing trial livestream"));
  }
  if !city.is_empty() && !incident.is_empty() {
    push(QueryCategory::Court, format!("{city} {incident} charges complaint affidavit"));
  }

  if let Some(region) = region {
    let subject = if name.is_empty() { clean_title } else { name };
    if !subject.is_empty() {
      for domain in region.search_domains() {
        push(QueryCategory::Broad, format!("site:{domain} {subject}"));
      }
    }
  }

  queries.truncate(max_queries);
  queries
}

// ─── Result budget ───────────────────────────────────────────────────────────

/// Search results kept for one lead, plus what was discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetedResults {
  pub kept:        Vec<SearchResult>,
  pub duplicates:  usize,
  pub over_budget: usize,
}

/// Keep at most `max_urls` distinct URLs, first seen wins.
pub fn apply_url_budget(results: Vec<SearchResult>, max_urls: usize) -> BudgetedResults {
  let mut out = BudgetedResults::default();
  let mut seen = BTreeSet::new();
  for result in results {
    if !seen.insert(canonical_url(&result.url)) {
      out.duplicates += 1;
    } else if out.kept.len() >= max_urls {
      out.over_budget += 1;
    } else {
      out.kept.push(result);
    }
  }
  out
}

// ─── Classification and resolution ───────────────────────────────────────────

/// Classify each result and bind it to `lead_id`.
pub fn classify_results(lead_id: &LeadId, results: &[SearchResult]) -> Vec<ClassifiedArtifact> {
  results
    .iter()
    .map(|r| ClassifiedArtifact::new(lead_id, r, classify(&r.url, &r.title, &r.snippet)))
    .collect()
}

pub fn has_qualifying_primary(artifacts: &[ClassifiedArtifact], min_confidence: f64) -> bool {
  artifacts.iter().any(|a| a.qualifies_as_primary(min_confidence))
}

/// ARTIFACT_FOUND when at least one artifact is primary at or above the
/// confidence gate, otherwise NO_ARTIFACT.
pub fn resolve_hunt(artifacts: &[ClassifiedArtifact], min_confidence: f64) -> LeadStatus {
  if has_qualifying_primary(artifacts, min_confidence) {
    LeadStatus::ArtifactFound
  } else {
    LeadStatus::NoArtifact
  }
}

/// The directive that closes a hunt over every artifact known for the lead.
pub fn hunt_directive(
  lead_id: LeadId,
  artifacts: &[ClassifiedArtifact],
  gating: &ArtifactGating,
) -> TransitionDirective {
  let min = gating.artifact_min_confidence;
  let qualifying = artifacts.iter().filter(|a| a.qualifies_as_primary(min)).count();
  let status = resolve_hunt(artifacts, min);
  let rationale = if qualifying > 0 {
    format!(
      "{qualifying} of {} artifact(s) primary at confidence >= {min}",
      artifacts.len()
    )
  } else {
    format!("no primary artifact at confidence >= {min} among {}", artifacts.len())
  };
  let best = artifacts
    .iter()
    .filter(|a| a.qualifies_as_primary(min))
    .map(|a| (a.confidence * 100.0).round() as u8)
    .max();
  let directive = TransitionDirective::new(lead_id, status, rationale);
  match best {
    Some(score) => directive.with_score(score),
    None => directive,
  }
}

#[cfg(test)]
mod tests {
  use casefile_core::{
    artifact::SourceClass,
    lead::{Candidate, Entities, NewLead},
    policy::Policy,
  };
  use chrono::Utc;

  use super::*;
  use crate::jurisdiction::{JurisdictionLookup, tests::sample};

  fn lead(title: &str, entities: Entities, location: Option<&str>) -> Lead {
    let candidate = Candidate {
      url: "https://news.example.com/story".into(),
      title: title.into(),
      entities,
      location: location.map(str::to_string),
      ..Candidate::default()
    };
    let new = NewLead {
      candidate,
      hook_score: 50,
      evidence_prescore: 0,
      incident_type: IncidentType::Shooting,
    };
    Lead::from_new(new, Utc::now())
  }

  fn result(url: &str, title: &str) -> SearchResult {
    SearchResult {
      url:            url.into(),
      title:          title.into(),
      snippet:        String::new(),
      query_category: Some("official".into()),
    }
  }

  #[test]
  fn full_entities_fill_every_category_up_to_the_cap() {
    let l = lead(
      "Bodycam: Officer shoots armed suspect",
      Entities {
        names:     vec!["John Smith".into()],
        agencies:  vec!["Mesa Police Department".into()],
        locations: vec![],
      },
      Some("Mesa"),
    );
    let queries = build_hunt_queries(&l, None, 8);
    assert_eq!(queries.len(), 8);
    assert_eq!(
      queries[0].query,
      r#""body worn camera" "Mesa Police Department" Mesa"#
    );
    assert_eq!(queries[3].query, "Officer shoots armed suspect bodycam OR dashcam video");
    assert_eq!(queries[7].query, "Mesa shooting charges complaint affidavit");
    assert_eq!(queries[7].category, QueryCategory::Court);
  }

  #[test]
  fn query_cap_is_respected() {
    let l = lead("Title", Entities::default(), Some("Mesa"));
    assert_eq!(build_hunt_queries(&l, None, 1).len(), 1);
  }

  #[test]
  fn sparse_lead_gets_only_title_query() {
    let l = lead("Raw footage - crash", Entities::default(), None);
    let queries = build_hunt_queries(&l, None, 8);
    assert_eq!(queries, vec![HuntQuery {
      query:    "crash bodycam OR dashcam video".into(),
      category: QueryCategory::Broad,
    }]);
  }

  #[test]
  fn region_supplies_agency_and_news_domains() {
    let registry = sample();
    let l = lead("Shooting", Entities::default(), Some("Phoenix"));
    let queries = build_hunt_queries(&l, registry.region("PHX"), 20);
    assert!(queries.iter().any(|q| q.query.contains(r#""PHXPD""#)));
    assert!(queries.iter().any(|q| q.query == "site:azcentral.com Shooting"));
    assert!(queries.iter().any(|q| q.query == "site:youtube.com Shooting"));
  }

  #[test]
  fn budget_keeps_first_unique_urls() {
    let results = vec![
      result("https://a.com/1", "a"),
      result("https://www.a.com/1", "dup"),
      result("https://b.com/2", "b"),
      result("https://c.com/3", "c"),
    ];
    let budgeted = apply_url_budget(results, 2);
    let urls: Vec<&str> = budgeted.kept.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://a.com/1", "https://b.com/2"]);
    assert_eq!(budgeted.duplicates, 1);
    assert_eq!(budgeted.over_budget, 1);
  }

  #[test]
  fn one_primary_artifact_resolves_found() {
    let id = LeadId::for_url("https://news.example.com/story");
    let artifacts = classify_results(&id, &[
      result("https://tmz.com/x", "bodycam compilation"),
      result("https://cspd.gov/release.pdf", "Critical Incident Briefing"),
    ]);
    let gating = Policy::default().artifact_gating;
    assert_eq!(resolve_hunt(&artifacts, gating.artifact_min_confidence), LeadStatus::ArtifactFound);
    let directive = hunt_directive(id, &artifacts, &gating);
    assert_eq!(directive.new_status, LeadStatus::ArtifactFound);
    assert!(directive.score.is_some());
  }

  #[test]
  fn secondary_or_low_confidence_resolves_not_found() {
    let id = LeadId::for_url("https://news.example.com/story");
    let mut artifacts = classify_results(&id, &[result("https://tmz.com/x", "bodycam")]);
    assert_eq!(resolve_hunt(&artifacts, 0.7), LeadStatus::NoArtifact);

    artifacts[0].source_class = SourceClass::Primary;
    artifacts[0].confidence = 0.69;
    assert_eq!(resolve_hunt(&artifacts, 0.7), LeadStatus::NoArtifact);
    assert_eq!(resolve_hunt(&[], 0.7), LeadStatus::NoArtifact);
  }
}

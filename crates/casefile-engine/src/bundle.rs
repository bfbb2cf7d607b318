//! Deterministic bundle scoring.
//!
//! Each artifact earns four factor scores, each scaled to its configured
//! maximum in [`BundlePolicy`]:
//!
//! | factor | raw value |
//! |---|---|
//! | source_trust | max of domain authority and source-class trust |
//! | entity_match | [`entity::entity_match`] over url, title and notes |
//! | timeline_fit | [`timeline::timeline_fit`] over url, title and notes |
//! | corroboration | independent domains agreeing on the artifact type |
//!
//! The best artifact of each lane is kept, the lane bests are sorted by
//! subtotal and combined with geometrically decaying weights, and the result
//! is normalised so four perfect lanes score 100.
//!
//! Every artifact also gets an evidence tier: T1 needs an official source
//! and a subtotal of at least `t1_threshold`, T2 needs `t2_threshold` and
//! corroboration of at least `t2_min_corroboration`, anything else is T3.
//!
//! The input order never matters: artifacts are sorted on every field before
//! duplicates collapse, and every intermediate collection is ordered.

use std::cmp::Ordering;

use std::collections::{BTreeMap, BTreeSet};

use casefile_core::{
  artifact::{ArtifactId, ArtifactType, ClassifiedArtifact, Lane, SourceClass},
  canonical::domain_of,
  case::{ArtifactScore, BundleScore, CaseMetadata, EvidenceTier, Factor, LaneSummary, Tier},
  lead::LeadId,
  policy::BundlePolicy,
};

use crate::{
  entity::{EntityProfile, entity_match, normalize_entity},
  jurisdiction::{DISPATCH_DOMAINS, JurisdictionLookup, RECORDS_DOMAINS, Region, resolve},
  round2,
  timeline::timeline_fit,
};

// ─── Trust tables ────────────────────────────────────────────────────────────

const TRUST_OFFICIAL: f64 = 1.0;
const TRUST_MEDIA: f64 = 0.6;
const TRUST_UNKNOWN: f64 = 0.15;

const CLASS_TRUST_PRIMARY: f64 = 0.8;
const CLASS_TRUST_SECONDARY: f64 = 0.15;

/// Each independent domain past the first adds this share of the maximum.
const CORROBORATION_STEP: f64 = 0.5;

/// Aggregator and true-crime channels: media, not official.
const REPOST_CHANNELS: &[&str] = &[
  "police activity",
  "real world police",
  "body cam watch",
  "law&crime network",
  "court tv",
  "law and crime",
  "crimeonline",
  "true crime daily",
];

const NEWS_HOST_PATTERNS: &[&str] = &[
  "news", "press", "media", "post", "times", "tribune", "herald", "gazette",
  "journal", "abc", "nbc", "cbs", "fox", "cnn",
];

const SURVEILLANCE_KEYWORDS: &[&str] = &[
  "surveillance",
  "cctv",
  "security camera",
  "ring doorbell",
  "store camera",
  "gas station camera",
  "parking lot camera",
  "traffic camera",
  "ring camera",
  "nest cam",
];

// ─── Lanes ───────────────────────────────────────────────────────────────────

/// Where an artifact lands when the bundle is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneClass {
  Lane(Lane),
  /// Press video, documents and audio: no lane, but a primary one earns the
  /// supporting bonus.
  Supporting,
  Unclassified,
}

fn artifact_text(a: &ClassifiedArtifact) -> String {
  format!("{} {} {}", a.url, a.title, a.notes)
}

pub fn lane_class(a: &ClassifiedArtifact) -> LaneClass {
  match a.artifact_type {
    ArtifactType::Bodycam | ArtifactType::Dashcam => return LaneClass::Lane(Lane::Bwc),
    ArtifactType::Interview => return LaneClass::Lane(Lane::Interrogation),
    ArtifactType::Court => return LaneClass::Lane(Lane::CourtVideo),
    _ => {}
  }
  let text = artifact_text(a).to_lowercase();
  if SURVEILLANCE_KEYWORDS.iter().any(|k| text.contains(k)) {
    return LaneClass::Lane(Lane::Surveillance);
  }
  match a.artifact_type {
    ArtifactType::PressVideo | ArtifactType::Document | ArtifactType::Audio => {
      LaneClass::Supporting
    }
    _ => LaneClass::Unclassified,
  }
}

// ─── Factors ─────────────────────────────────────────────────────────────────

fn host_matches(host: &str, domain: &str) -> bool {
  host == domain || host.ends_with(&format!(".{domain}"))
}

fn is_government_host(host: &str) -> bool {
  [".gov", ".us"]
    .iter()
    .any(|tld| host.ends_with(tld) || host.contains(&format!("{tld}.")))
}

/// Authority of where the artifact was published, in `[0, 1]`.
pub fn domain_trust(a: &ClassifiedArtifact, region: Option<&Region>) -> f64 {
  let url = a.url.to_lowercase();
  let host = domain_of(&a.url).unwrap_or_default();
  let byline = format!("{} {}", a.publisher, a.title).to_lowercase();

  if !host.is_empty()
    && (is_government_host(&host)
      || RECORDS_DOMAINS.iter().any(|d| host_matches(&host, d))
      || DISPATCH_DOMAINS.iter().any(|d| host_matches(&host, d)))
  {
    return TRUST_OFFICIAL;
  }
  if let Some(region) = region {
    let portal_hit = region
      .portals()
      .iter()
      .any(|p| url.starts_with(&p.to_lowercase()));
    let channel_hit = region
      .channel_agencies()
      .any(|agency| byline.contains(&agency.name.to_lowercase()));
    if portal_hit || channel_hit {
      return TRUST_OFFICIAL;
    }
  }
  if REPOST_CHANNELS.iter().any(|c| byline.contains(c))
    || NEWS_HOST_PATTERNS.iter().any(|p| host.contains(p))
  {
    return TRUST_MEDIA;
  }
  TRUST_UNKNOWN
}

fn class_trust(class: SourceClass) -> f64 {
  match class {
    SourceClass::Primary => CLASS_TRUST_PRIMARY,
    SourceClass::Secondary => CLASS_TRUST_SECONDARY,
  }
}

/// Raw source trust. Never lower for a primary artifact than for the same
/// artifact classed secondary.
pub fn source_trust(a: &ClassifiedArtifact, region: Option<&Region>) -> f64 {
  domain_trust(a, region).max(class_trust(a.source_class))
}

/// Distinct publishing domains per `(lead, artifact type)`. Unknown types
/// never corroborate.
fn corroborating_domains(
  artifacts: &[&ClassifiedArtifact],
) -> BTreeMap<(LeadId, ArtifactType), BTreeSet<String>> {
  let mut out: BTreeMap<_, BTreeSet<String>> = BTreeMap::new();
  for a in artifacts.iter().filter(|a| a.artifact_type.is_known()) {
    if let Some(host) = domain_of(&a.url) {
      out
        .entry((a.lead_id.clone(), a.artifact_type))
        .or_default()
        .insert(host);
    }
  }
  out
}

/// Raw corroboration for an artifact whose type is backed by `domains`
/// independent domains.
pub fn corroboration(domains: usize) -> f64 {
  if domains < 2 {
    0.0
  } else {
    ((domains - 1) as f64 * CORROBORATION_STEP).min(1.0)
  }
}

pub fn evidence_tier(
  subtotal: f64,
  official: bool,
  corroboration: f64,
  policy: &BundlePolicy,
) -> EvidenceTier {
  if subtotal >= policy.t1_threshold && official {
    EvidenceTier::T1
  } else if subtotal >= policy.t2_threshold && corroboration >= policy.t2_min_corroboration {
    EvidenceTier::T2
  } else {
    EvidenceTier::T3
  }
}

fn score_artifact(
  a: &ClassifiedArtifact,
  profile: &EntityProfile,
  case: &CaseMetadata,
  policy: &BundlePolicy,
  region: Option<&Region>,
  corroborating: &BTreeMap<(LeadId, ArtifactType), BTreeSet<String>>,
) -> ArtifactScore {
  let text = artifact_text(a);
  let domains = if a.artifact_type.is_known() {
    corroborating
      .get(&(a.lead_id.clone(), a.artifact_type))
      .map_or(0, BTreeSet::len)
  } else {
    0
  };

  let official = domain_trust(a, region) == TRUST_OFFICIAL;
  let raw_corroboration = corroboration(domains);
  let source_trust = round2(source_trust(a, region) * policy.source_trust_max);
  let entity_match = round2(entity_match(profile, &text) * policy.entity_match_max);
  let timeline_fit = round2(
    timeline_fit(&text, case.incident_year, policy.timeline_window_years)
      * policy.timeline_fit_max,
  );
  let corroboration = round2(raw_corroboration * policy.corroboration_max);
  let subtotal = round2(source_trust + entity_match + timeline_fit + corroboration);
  let lane = match lane_class(a) {
    LaneClass::Lane(lane) => Some(lane),
    _ => None,
  };

  ArtifactScore {
    source_trust,
    entity_match,
    timeline_fit,
    corroboration,
    subtotal,
    lane,
    tier: evidence_tier(subtotal, official, raw_corroboration, policy),
  }
}

// ─── Bundle synthesis ────────────────────────────────────────────────────────

pub fn tier_for(score: f64, policy: &BundlePolicy) -> Tier {
  if score >= policy.high_cutoff {
    Tier::High
  } else if score >= policy.medium_cutoff {
    Tier::Medium
  } else if score >= policy.low_cutoff {
    Tier::Low
  } else {
    Tier::Reject
  }
}

/// The factor with the largest summed points; ties go to the earlier entry
/// of [`Factor::ALL`]. `None` when nothing scored.
fn dominant_factor<'a>(scores: impl Iterator<Item = &'a ArtifactScore> + Clone) -> Option<Factor> {
  let mut best: Option<(Factor, f64)> = None;
  for factor in Factor::ALL {
    let total: f64 = scores.clone().map(|s| s.factor(factor)).sum();
    if total > 0.0 && best.is_none_or(|(_, b)| total > b) {
      best = Some((factor, total));
    }
  }
  best.map(|(f, _)| f)
}

fn factor_words(factor: Option<Factor>) -> String {
  factor.map_or_else(|| "no factor".to_string(), |f| f.as_str().replace('_', " "))
}

pub fn recommendation(tier: Tier, dominant: Option<Factor>, missing: &[Lane]) -> String {
  let factor = factor_words(dominant);
  let missing = if missing.is_empty() {
    "none".to_string()
  } else {
    missing.iter().map(|l| l.as_str()).collect::<Vec<_>>().join(", ")
  };
  match tier {
    Tier::High => format!("Ready to package: bundle led by {factor}. Missing lanes: {missing}."),
    Tier::Medium => {
      format!("Promising: led by {factor}; hunt the missing lanes ({missing}) before packaging.")
    }
    Tier::Low => format!("Weak: only {factor} contributes meaningfully. Keep hunting."),
    Tier::Reject => format!("Reject: evidence is insufficient (best factor: {factor})."),
  }
}

/// Score one bundle. Pure: identical inputs in any order give an identical
/// result.
pub fn score_bundle(
  artifacts: &[ClassifiedArtifact],
  case: &CaseMetadata,
  policy: &BundlePolicy,
  lookup: Option<&dyn JurisdictionLookup>,
) -> BundleScore {
  let mut sorted: Vec<&ClassifiedArtifact> = artifacts.iter().collect();
  sorted.sort_by(|a, b| total_order(a, b));
  sorted.dedup_by(|a, b| a.artifact_id == b.artifact_id);
  let urls: BTreeMap<&ArtifactId, &str> =
    sorted.iter().map(|a| (&a.artifact_id, a.url.as_str())).collect();

  let region = resolve(lookup, case.region_id.as_deref());
  let profile = normalize_entity(&case.defendant, &case.jurisdiction);
  let corroborating = corroborating_domains(&sorted);

  let artifact_scores: BTreeMap<ArtifactId, ArtifactScore> = sorted
    .iter()
    .map(|a| {
      let score = score_artifact(a, &profile, case, policy, region, &corroborating);
      (a.artifact_id.clone(), score)
    })
    .collect();

  // Lane best: highest subtotal, first (lowest id) on ties.
  let mut lanes: BTreeMap<Lane, ArtifactId> = BTreeMap::new();
  for (id, score) in &artifact_scores {
    let Some(lane) = score.lane else { continue };
    let better = lanes
      .get(&lane)
      .is_none_or(|current| score.subtotal > artifact_scores[current].subtotal);
    if better {
      lanes.insert(lane, id.clone());
    }
  }

  let mut bests: Vec<f64> = lanes.values().map(|id| artifact_scores[id].subtotal).collect();
  bests.sort_by(|a, b| b.total_cmp(a));
  let weighted: f64 = bests
    .iter()
    .enumerate()
    .map(|(i, s)| policy.lane_decay.powi(i as i32) * s)
    .sum();
  let norm: f64 = (0..Lane::ALL.len())
    .map(|i| policy.lane_decay.powi(i as i32))
    .sum();

  let supported = sorted.iter().any(|a| {
    a.source_class == SourceClass::Primary && lane_class(a) == LaneClass::Supporting
  });
  let bonus = if supported { policy.supporting_bonus } else { 0.0 };
  let bundle_score = round2((weighted / norm + bonus).clamp(0.0, 100.0));
  debug_assert!((0.0..=100.0).contains(&bundle_score));

  let tier = tier_for(bundle_score, policy);
  let dominant = if lanes.is_empty() {
    dominant_factor(artifact_scores.values())
  } else {
    dominant_factor(lanes.values().map(|id| &artifact_scores[id]))
  };
  let missing_lanes: Vec<Lane> =
    Lane::ALL.into_iter().filter(|l| !lanes.contains_key(l)).collect();

  let mut lane_summary: BTreeMap<Lane, LaneSummary> =
    Lane::ALL.into_iter().map(|l| (l, LaneSummary::default())).collect();
  for score in artifact_scores.values() {
    let Some(lane) = score.lane else { continue };
    let Some(summary) = lane_summary.get_mut(&lane) else { continue };
    summary.count += 1;
    match score.tier {
      EvidenceTier::T1 => summary.t1_count += 1,
      EvidenceTier::T2 => summary.t2_count += 1,
      EvidenceTier::T3 => {}
    }
  }
  for (lane, id) in &lanes {
    if let Some(summary) = lane_summary.get_mut(lane) {
      let best = &artifact_scores[id];
      summary.best_tier = Some(best.tier);
      summary.best_subtotal = best.subtotal;
      summary.best_url = urls.get(id).map(|u| u.to_string());
    }
  }

  BundleScore {
    recommendation: recommendation(tier, dominant, &missing_lanes),
    artifact_scores,
    bundle_score,
    tier,
    dominant_factor: dominant,
    lanes,
    lane_summary,
    missing_lanes,
  }
}

/// Every field takes part, so duplicates of one artifact id collapse onto
/// the same entry whatever order they arrived in.
fn total_order(a: &ClassifiedArtifact, b: &ClassifiedArtifact) -> Ordering {
  a.artifact_id
    .cmp(&b.artifact_id)
    .then_with(|| a.lead_id.cmp(&b.lead_id))
    .then_with(|| a.url.cmp(&b.url))
    .then_with(|| a.title.cmp(&b.title))
    .then_with(|| a.notes.cmp(&b.notes))
    .then_with(|| a.publisher.cmp(&b.publisher))
    .then_with(|| a.artifact_type.cmp(&b.artifact_type))
    .then_with(|| a.source_class.cmp(&b.source_class))
    .then_with(|| a.confidence.total_cmp(&b.confidence))
}

//! Case metadata and bundle score types.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{
  artifact::{ArtifactId, Lane},
  lead::LeadId,
};

// ─── Case metadata ───────────────────────────────────────────────────────────

/// Case-intake record. Read-only input to bundle scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseMetadata {
  #[serde(default)]
  pub defendant:     String,
  #[serde(default)]
  pub jurisdiction:  String,
  /// Accepts either a number or a string; unparseable values become `None`.
  #[serde(default, deserialize_with = "year_from_any")]
  pub incident_year: Option<i32>,
  #[serde(default)]
  pub region_id:     Option<String>,
}

impl CaseMetadata {
  /// `lastname_jurisdiction_year` slug, e.g. `smith_phoenix_2023`. The year
  /// part is omitted when unknown.
  pub fn case_id(&self) -> String {
    let last = self
      .defendant
      .split(',')
      .next()
      .unwrap_or_default()
      .split_whitespace()
      .filter(|w| !is_suffix(w))
      .next_back()
      .map(alnum_lower)
      .filter(|s| !s.is_empty())
      .unwrap_or_else(|| "unknown".to_string());
    let juris = self
      .jurisdiction
      .split(',')
      .map(alnum_lower)
      .find(|s| !s.is_empty())
      .unwrap_or_else(|| "unk".to_string());
    match self.incident_year {
      Some(year) => format!("{last}_{juris}_{year}"),
      None => format!("{last}_{juris}"),
    }
  }
}

fn is_suffix(word: &str) -> bool {
  matches!(
    word.trim_end_matches('.').to_lowercase().as_str(),
    "jr" | "sr" | "ii" | "iii" | "iv" | "esq"
  )
}

fn alnum_lower(s: &str) -> String {
  s.chars()
    .filter(char::is_ascii_alphanumeric)
    .map(|c| c.to_ascii_lowercase())
    .collect()
}

fn year_from_any<'de, D>(d: D) -> Result<Option<i32>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Int(i64),
    Text(String),
  }

  Ok(match Option::<Raw>::deserialize(d)? {
    Some(Raw::Int(n)) => i32::try_from(n).ok(),
    Some(Raw::Text(s)) => s.trim().parse().ok(),
    None => None,
  })
}

// ─── Scores ──────────────────────────────────────────────────────────────────

/// Coarse confidence bucket for a scored bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
  Reject,
  Low,
  Medium,
  High,
}

impl Tier {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::High => "HIGH",
      Self::Medium => "MEDIUM",
      Self::Low => "LOW",
      Self::Reject => "REJECT",
    }
  }
}

impl fmt::Display for Tier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The four per-artifact scoring factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
  SourceTrust,
  EntityMatch,
  TimelineFit,
  Corroboration,
}

impl Factor {
  /// Fixed order used both for reporting and for breaking ties.
  pub const ALL: [Factor; 4] = [
    Factor::SourceTrust,
    Factor::EntityMatch,
    Factor::TimelineFit,
    Factor::Corroboration,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::SourceTrust => "source_trust",
      Self::EntityMatch => "entity_match",
      Self::TimelineFit => "timeline_fit",
      Self::Corroboration => "corroboration",
    }
  }
}

impl fmt::Display for Factor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Per-artifact evidence grade. T1 is official and strong, T2 strong and
/// corroborated, T3 everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EvidenceTier {
  T1,
  T2,
  T3,
}

impl EvidenceTier {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::T1 => "T1",
      Self::T2 => "T2",
      Self::T3 => "T3",
    }
  }
}

impl fmt::Display for EvidenceTier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Per-artifact factor points. Each factor is already scaled to its
/// configured maximum; `subtotal` is their sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactScore {
  pub source_trust:  f64,
  pub entity_match:  f64,
  pub timeline_fit:  f64,
  pub corroboration: f64,
  pub subtotal:      f64,
  /// The evidence lane this artifact fills, if any.
  pub lane:          Option<Lane>,
  pub tier:          EvidenceTier,
}

impl ArtifactScore {
  pub fn factor(&self, factor: Factor) -> f64 {
    match factor {
      Factor::SourceTrust => self.source_trust,
      Factor::EntityMatch => self.entity_match,
      Factor::TimelineFit => self.timeline_fit,
      Factor::Corroboration => self.corroboration,
    }
  }
}

/// What one lane holds. Empty lanes report zero counts and no best.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneSummary {
  pub count:         usize,
  pub t1_count:      usize,
  pub t2_count:      usize,
  pub best_tier:     Option<EvidenceTier>,
  pub best_subtotal: f64,
  pub best_url:      Option<String>,
}

/// Result of one bundle scoring run. Never mutated; a re-score produces a new
/// value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleScore {
  pub artifact_scores: BTreeMap<ArtifactId, ArtifactScore>,
  /// Within `[0.0, 100.0]`.
  pub bundle_score:    f64,
  pub tier:            Tier,
  pub recommendation:  String,
  /// The factor contributing most across the lane-best artifacts.
  pub dominant_factor: Option<Factor>,
  /// The best artifact in each filled lane.
  pub lanes:           BTreeMap<Lane, ArtifactId>,
  /// Every lane, filled or not.
  pub lane_summary:    BTreeMap<Lane, LaneSummary>,
  /// Lanes with no artifact, in reporting order.
  pub missing_lanes:   Vec<Lane>,
}

/// A persisted scoring run: the deterministic score plus its envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRun {
  pub run_id:    Uuid,
  pub lead_id:   LeadId,
  pub case_id:   String,
  pub case:      CaseMetadata,
  pub score:     BundleScore,
  pub scored_at: DateTime<Utc>,
}

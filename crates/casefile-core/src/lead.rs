//! Lead types: discovered items that have not yet been fully vetted.
//!
//! A lead is created at discovery time with status [`LeadStatus::New`] and is
//! mutated only by applying a [`crate::lifecycle::TransitionDirective`]. Leads
//! are never deleted; terminal states are durable.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, canonical::{canonical_url, short_hash}};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Deterministic lead id: a hash of the canonical URL, so re-discovery of the
/// same page always lands on the same id.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LeadId(String);

impl LeadId {
  pub fn for_url(raw_url: &str) -> Self {
    Self(short_hash(&canonical_url(raw_url)))
  }

  /// Wrap an id read back from storage or supplied on the command line.
  pub fn from_stored(s: impl Into<String>) -> Self { Self(s.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for LeadId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Every state a lead can occupy. See [`crate::lifecycle`] for the edges.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
  New,
  Pass,
  Maybe,
  Kill,
  Hunting,
  ArtifactFound,
  NoArtifact,
  Approved,
  Packaged,
  Rendered,
}

impl LeadStatus {
  pub const ALL: [LeadStatus; 10] = [
    Self::New,
    Self::Pass,
    Self::Maybe,
    Self::Kill,
    Self::Hunting,
    Self::ArtifactFound,
    Self::NoArtifact,
    Self::Approved,
    Self::Packaged,
    Self::Rendered,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::New => "NEW",
      Self::Pass => "PASS",
      Self::Maybe => "MAYBE",
      Self::Kill => "KILL",
      Self::Hunting => "HUNTING",
      Self::ArtifactFound => "ARTIFACT_FOUND",
      Self::NoArtifact => "NO_ARTIFACT",
      Self::Approved => "APPROVED",
      Self::Packaged => "PACKAGED",
      Self::Rendered => "RENDERED",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|st| st.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| Error::UnknownStatus(s.to_string()))
  }

  /// Terminal states are retained forever and have no outgoing edges.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Kill | Self::NoArtifact | Self::Rendered)
  }

  /// Triage verdicts eligible for forwarding to the artifact hunt.
  pub fn is_forwardable(self) -> bool { matches!(self, Self::Pass | Self::Maybe) }
}

impl fmt::Display for LeadStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Sub-types ───────────────────────────────────────────────────────────────

/// Named entities extracted from a lead by an upstream collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
  #[serde(default)]
  pub names:     Vec<String>,
  #[serde(default)]
  pub agencies:  Vec<String>,
  #[serde(default)]
  pub locations: Vec<String>,
}

impl Entities {
  pub fn is_empty(&self) -> bool {
    self.names.is_empty() && self.agencies.is_empty() && self.locations.is_empty()
  }
}

/// Coarse guess at how intelligible a video's audio track is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioQuality {
  Good,
  Variable,
  Poor,
  #[default]
  Unknown,
}

impl AudioQuality {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Good => "good",
      Self::Variable => "variable",
      Self::Poor => "poor",
      Self::Unknown => "unknown",
    }
  }

  pub fn parse(s: &str) -> Self {
    match s {
      "good" => Self::Good,
      "variable" => Self::Variable,
      "poor" => Self::Poor,
      _ => Self::Unknown,
    }
  }

  /// Poor or unknown audio cannot rescue a candidate with no text.
  pub fn is_poor_or_unknown(self) -> bool {
    matches!(self, Self::Poor | Self::Unknown)
  }
}

/// Signals about the media itself, supplied by the enrichment collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitySignals {
  #[serde(default)]
  pub audio_quality: AudioQuality,
}

/// Coarse incident category used for routing and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
  Shooting,
  Pursuit,
  Domestic,
  Dui,
  Assault,
  Homicide,
  MissingPerson,
  Theft,
  UseOfForce,
  WelfareCheck,
  Standoff,
  #[default]
  Unknown,
}

impl IncidentType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Shooting => "shooting",
      Self::Pursuit => "pursuit",
      Self::Domestic => "domestic",
      Self::Dui => "dui",
      Self::Assault => "assault",
      Self::Homicide => "homicide",
      Self::MissingPerson => "missing_person",
      Self::Theft => "theft",
      Self::UseOfForce => "use_of_force",
      Self::WelfareCheck => "welfare_check",
      Self::Standoff => "standoff",
      Self::Unknown => "unknown",
    }
  }

  pub fn parse(s: &str) -> Self {
    match s {
      "shooting" => Self::Shooting,
      "pursuit" => Self::Pursuit,
      "domestic" => Self::Domestic,
      "dui" => Self::Dui,
      "assault" => Self::Assault,
      "homicide" => Self::Homicide,
      "missing_person" => Self::MissingPerson,
      "theft" => Self::Theft,
      "use_of_force" => Self::UseOfForce,
      "welfare_check" => Self::WelfareCheck,
      "standoff" => Self::Standoff,
      _ => Self::Unknown,
    }
  }
}

impl fmt::Display for IncidentType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Candidate (ingestion input) ─────────────────────────────────────────────

/// A discovered item as delivered by an ingestion collaborator (RSS, YouTube,
/// page scrape). Deserialised from one JSON line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
  /// The collaborator's own id; informational only.
  #[serde(default)]
  pub id:               Option<String>,
  pub url:              String,
  #[serde(default)]
  pub title:            String,
  #[serde(default)]
  pub description:      String,
  #[serde(default)]
  pub source_id:        Option<String>,
  #[serde(default)]
  pub published_at:     Option<String>,
  #[serde(default)]
  pub duration_sec:     Option<u32>,
  #[serde(default)]
  pub transcript_text:  Option<String>,
  #[serde(default)]
  pub entities:         Entities,
  #[serde(default)]
  pub quality_signals:  QualitySignals,
  #[serde(default)]
  pub location:         Option<String>,
  #[serde(default)]
  pub risk_flags:       Vec<String>,
  /// Score from an external (LLM) scorer, if one has already run.
  #[serde(default)]
  pub model_score:      Option<u8>,
  /// The label that scorer suggested; never authoritative.
  #[serde(default)]
  pub suggested_status: Option<LeadStatus>,
}

impl Candidate {
  pub fn has_transcript(&self) -> bool {
    self
      .transcript_text
      .as_deref()
      .is_some_and(|t| !t.trim().is_empty())
  }
}

// ─── Lead ────────────────────────────────────────────────────────────────────

/// Input to [`crate::store::LeadStore::insert_lead`]. Timestamps and the
/// initial status are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewLead {
  pub candidate:         Candidate,
  pub hook_score:        u8,
  /// Artifact-likelihood score from the evidence pre-scorer; uncapped.
  pub evidence_prescore: u32,
  pub incident_type:     IncidentType,
}

/// A persisted lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
  pub lead_id:           LeadId,
  /// Canonical URL; the natural key.
  pub url:               String,
  /// The URL as first discovered.
  pub source_url:        String,
  pub title:             String,
  pub description:       String,
  pub source_id:         Option<String>,
  pub published_at:      Option<String>,
  pub duration_sec:      Option<u32>,
  pub transcript_text:   Option<String>,
  pub entities:          Entities,
  pub quality_signals:   QualitySignals,
  pub location:          Option<String>,
  pub incident_type:     IncidentType,
  pub risk_flags:        Vec<String>,
  pub hook_score:        u8,
  pub evidence_prescore: u32,
  pub model_score:       Option<u8>,
  pub suggested_status:  Option<LeadStatus>,
  /// Set once triage has run; `None` before.
  pub triage_score:      Option<u8>,
  pub rationale:         Option<String>,
  pub status:            LeadStatus,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

impl Lead {
  /// A fresh `NEW` lead for `input`, keyed by its canonical URL.
  pub fn from_new(input: NewLead, now: DateTime<Utc>) -> Self {
    let NewLead { candidate, hook_score, evidence_prescore, incident_type } = input;
    Self {
      lead_id: LeadId::for_url(&candidate.url),
      url: canonical_url(&candidate.url),
      source_url: candidate.url,
      title: candidate.title,
      description: candidate.description,
      source_id: candidate.source_id,
      published_at: candidate.published_at,
      duration_sec: candidate.duration_sec,
      transcript_text: candidate.transcript_text,
      entities: candidate.entities,
      quality_signals: candidate.quality_signals,
      location: candidate.location,
      incident_type,
      risk_flags: candidate.risk_flags,
      hook_score: hook_score.min(100),
      evidence_prescore,
      model_score: candidate.model_score,
      suggested_status: candidate.suggested_status,
      triage_score: None,
      rationale: None,
      status: LeadStatus::New,
      created_at: now,
      updated_at: now,
    }
  }

  /// View this lead as the candidate record the triage rules read.
  pub fn as_candidate(&self) -> Candidate {
    Candidate {
      id:               Some(self.lead_id.to_string()),
      url:              self.source_url.clone(),
      title:            self.title.clone(),
      description:      self.description.clone(),
      source_id:        self.source_id.clone(),
      published_at:     self.published_at.clone(),
      duration_sec:     self.duration_sec,
      transcript_text:  self.transcript_text.clone(),
      entities:         self.entities.clone(),
      quality_signals:  self.quality_signals.clone(),
      location:         self.location.clone(),
      risk_flags:       self.risk_flags.clone(),
      model_score:      self.model_score,
      suggested_status: self.suggested_status,
    }
  }

  /// The score used when ordering and flooring this lead for forwarding.
  pub fn forwarding_score(&self) -> u8 { self.triage_score.unwrap_or(0) }
}

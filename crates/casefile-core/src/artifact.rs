//! Artifact types: classified pieces of corroborating or primary evidence.
//!
//! An artifact is immutable once created. It references its lead by id; the
//! lead never references its artifacts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, canonical::short_hash, lead::LeadId};

// ─── Search input ────────────────────────────────────────────────────────────

/// A raw hit from any search collaborator (web, video or news backend).
/// Ephemeral; consumed once by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
  pub url:            String,
  #[serde(default)]
  pub title:          String,
  #[serde(default)]
  pub snippet:        String,
  /// The query category that produced this hit ("official", "broad", ...).
  #[serde(default)]
  pub query_category: Option<String>,
}

// ─── Classification enums ────────────────────────────────────────────────────

/// Whether an artifact was published by an authoritative entity.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceClass {
  Secondary,
  Primary,
}

impl SourceClass {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Primary => "primary",
      Self::Secondary => "secondary",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "primary" => Ok(Self::Primary),
      "secondary" => Ok(Self::Secondary),
      other => Err(Error::UnknownSourceClass(other.to_string())),
    }
  }
}

impl fmt::Display for SourceClass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// What kind of evidence an artifact is.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
  Bodycam,
  Dashcam,
  Court,
  Interview,
  PressVideo,
  Document,
  Audio,
  Unknown,
}

impl ArtifactType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Bodycam => "bodycam",
      Self::Dashcam => "dashcam",
      Self::Court => "court",
      Self::Interview => "interview",
      Self::PressVideo => "press_video",
      Self::Document => "document",
      Self::Audio => "audio",
      Self::Unknown => "unknown",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "bodycam" => Ok(Self::Bodycam),
      "dashcam" => Ok(Self::Dashcam),
      "court" => Ok(Self::Court),
      "interview" => Ok(Self::Interview),
      "press_video" => Ok(Self::PressVideo),
      "document" => Ok(Self::Document),
      "audio" => Ok(Self::Audio),
      "unknown" => Ok(Self::Unknown),
      other => Err(Error::UnknownArtifactType(other.to_string())),
    }
  }

  pub fn is_known(self) -> bool { self != Self::Unknown }
}

impl fmt::Display for ArtifactType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Lanes ───────────────────────────────────────────────────────────────────

/// The evidence lanes a case bundle is assembled from.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lane {
  Bwc,
  Interrogation,
  Surveillance,
  CourtVideo,
}

impl Lane {
  /// Every lane, in reporting order.
  pub const ALL: [Lane; 4] =
    [Lane::Bwc, Lane::Interrogation, Lane::Surveillance, Lane::CourtVideo];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Bwc => "BWC",
      Self::Interrogation => "INTERROGATION",
      Self::Surveillance => "SURVEILLANCE",
      Self::CourtVideo => "COURT_VIDEO",
    }
  }
}

impl fmt::Display for Lane {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// Deterministic artifact id: a hash of `lead_id:url`.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
  pub fn derive(lead_id: &LeadId, url: &str) -> Self {
    Self(short_hash(&format!("{lead_id}:{url}")))
  }

  /// Wrap an id read back from storage.
  pub fn from_stored(s: impl Into<String>) -> Self { Self(s.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ArtifactId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Classifier output ───────────────────────────────────────────────────────

/// The classifier's verdict on one search result, before it is bound to a
/// lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
  pub source_class:  SourceClass,
  pub artifact_type: ArtifactType,
  /// Always within `[0.0, 1.0]`.
  pub confidence:    f64,
  /// Empty when the URL could not be parsed.
  pub publisher:     String,
}

/// A classified artifact bound to a lead. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedArtifact {
  pub artifact_id:   ArtifactId,
  pub lead_id:       LeadId,
  pub artifact_type: ArtifactType,
  pub url:           String,
  pub title:         String,
  pub publisher:     String,
  pub source_class:  SourceClass,
  pub confidence:    f64,
  pub notes:         String,
}

impl ClassifiedArtifact {
  /// Bind a classification of `result` to `lead_id`.
  pub fn new(
    lead_id: &LeadId,
    result: &SearchResult,
    classification: Classification,
  ) -> Self {
    let category = result.query_category.as_deref().unwrap_or("unknown");
    let snippet: String = result.snippet.chars().take(200).collect();
    Self {
      artifact_id:   ArtifactId::derive(lead_id, &result.url),
      lead_id:       lead_id.clone(),
      artifact_type: classification.artifact_type,
      url:           result.url.clone(),
      title:         result.title.clone(),
      publisher:     classification.publisher,
      source_class:  classification.source_class,
      confidence:    classification.confidence,
      notes:         format!("Query category: {category}. {snippet}"),
    }
  }

  /// True when this artifact satisfies the primary-evidence gate.
  pub fn qualifies_as_primary(&self, min_confidence: f64) -> bool {
    self.source_class == SourceClass::Primary && self.confidence >= min_confidence
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn artifact_id_depends_on_lead_and_url() {
    let a = LeadId::for_url("https://example.com/a");
    let b = LeadId::for_url("https://example.com/b");
    let url = "https://cspd.gov/release.pdf";
    assert_eq!(ArtifactId::derive(&a, url), ArtifactId::derive(&a, url));
    assert_ne!(ArtifactId::derive(&a, url), ArtifactId::derive(&b, url));
  }

  #[test]
  fn primary_gate_needs_class_and_confidence() {
    let lead = LeadId::for_url("https://example.com/a");
    let result = SearchResult {
      url:            "https://cspd.gov/x".into(),
      title:          "Briefing".into(),
      snippet:        String::new(),
      query_category: Some("official".into()),
    };
    let mut artifact = ClassifiedArtifact::new(&lead, &result, Classification {
      source_class:  SourceClass::Primary,
      artifact_type: ArtifactType::PressVideo,
      confidence:    0.9,
      publisher:     "cspd.gov".into(),
    });
    assert!(artifact.qualifies_as_primary(0.7));
    assert!(artifact.notes.starts_with("Query category: official."));

    artifact.source_class = SourceClass::Secondary;
    assert!(!artifact.qualifies_as_primary(0.7));
  }

  #[test]
  fn enum_strings_round_trip() {
    for t in [
      ArtifactType::Bodycam,
      ArtifactType::PressVideo,
      ArtifactType::Unknown,
    ] {
      assert_eq!(ArtifactType::parse(t.as_str()).unwrap(), t);
    }
    assert!(SourceClass::parse("tabloid").is_err());
  }
}

//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings. Entities, risk flags and scoring output
//! are compact JSON. Enums use their canonical `as_str` spelling.

use casefile_core::{
  artifact::{ArtifactId, ArtifactType, ClassifiedArtifact, SourceClass},
  case::ScoreRun,
  lead::{AudioQuality, IncidentType, Lead, LeadId, LeadStatus, QualitySignals},
  lifecycle::Transition,
};
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_json<T: DeserializeOwned>(s: &str) -> Result<T> {
  Ok(serde_json::from_str(s)?)
}

/// SQLite integers are `i64`; narrow them back to the domain width.
fn decode_int<T: TryFrom<i64>>(column: &'static str, value: i64) -> Result<T> {
  T::try_from(value).map_err(|_| Error::Corrupt { column, value: value.to_string() })
}

fn decode_opt_int<T: TryFrom<i64>>(column: &'static str, value: Option<i64>) -> Result<Option<T>> {
  value.map(|v| decode_int(column, v)).transpose()
}

pub fn decode_status(s: &str) -> Result<LeadStatus> { Ok(LeadStatus::parse(s)?) }

// ─── Leads ───────────────────────────────────────────────────────────────────

/// Column list shared by every `leads` query, in [`RawLead::from_row`] order.
pub const LEAD_COLUMNS: &str = "lead_id, url, source_url, title, description, source_id,
  published_at, duration_sec, transcript_text, entities, audio_quality, location,
  incident_type, risk_flags, hook_score, evidence_prescore, model_score,
  suggested_status, triage_score, rationale, status, created_at, updated_at";

/// Raw values read directly from a `leads` row.
pub struct RawLead {
  pub lead_id:           String,
  pub url:               String,
  pub source_url:        String,
  pub title:             String,
  pub description:       String,
  pub source_id:         Option<String>,
  pub published_at:      Option<String>,
  pub duration_sec:      Option<i64>,
  pub transcript_text:   Option<String>,
  pub entities:          String,
  pub audio_quality:     String,
  pub location:          Option<String>,
  pub incident_type:     String,
  pub risk_flags:        String,
  pub hook_score:        i64,
  pub evidence_prescore: i64,
  pub model_score:       Option<i64>,
  pub suggested_status:  Option<String>,
  pub triage_score:      Option<i64>,
  pub rationale:         Option<String>,
  pub status:            String,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawLead {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      lead_id:           row.get(0)?,
      url:               row.get(1)?,
      source_url:        row.get(2)?,
      title:             row.get(3)?,
      description:       row.get(4)?,
      source_id:         row.get(5)?,
      published_at:      row.get(6)?,
      duration_sec:      row.get(7)?,
      transcript_text:   row.get(8)?,
      entities:          row.get(9)?,
      audio_quality:     row.get(10)?,
      location:          row.get(11)?,
      incident_type:     row.get(12)?,
      risk_flags:        row.get(13)?,
      hook_score:        row.get(14)?,
      evidence_prescore: row.get(15)?,
      model_score:       row.get(16)?,
      suggested_status:  row.get(17)?,
      triage_score:      row.get(18)?,
      rationale:         row.get(19)?,
      status:            row.get(20)?,
      created_at:        row.get(21)?,
      updated_at:        row.get(22)?,
    })
  }

  pub fn into_lead(self) -> Result<Lead> {
    Ok(Lead {
      lead_id:           LeadId::from_stored(self.lead_id),
      url:               self.url,
      source_url:        self.source_url,
      title:             self.title,
      description:       self.description,
      source_id:         self.source_id,
      published_at:      self.published_at,
      duration_sec:      decode_opt_int("duration_sec", self.duration_sec)?,
      transcript_text:   self.transcript_text,
      entities:          decode_json(&self.entities)?,
      quality_signals:   QualitySignals {
        audio_quality: AudioQuality::parse(&self.audio_quality),
      },
      location:          self.location,
      incident_type:     IncidentType::parse(&self.incident_type),
      risk_flags:        decode_json(&self.risk_flags)?,
      hook_score:        decode_int("hook_score", self.hook_score)?,
      evidence_prescore: decode_int("evidence_prescore", self.evidence_prescore)?,
      model_score:       decode_opt_int("model_score", self.model_score)?,
      suggested_status:  self.suggested_status.as_deref().map(decode_status).transpose()?,
      triage_score:      decode_opt_int("triage_score", self.triage_score)?,
      rationale:         self.rationale,
      status:            decode_status(&self.status)?,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Transitions ─────────────────────────────────────────────────────────────

pub const TRANSITION_COLUMNS: &str =
  "transition_id, lead_id, from_status, to_status, score, rationale, recorded_at";

pub struct RawTransition {
  pub transition_id: String,
  pub lead_id:       String,
  pub from_status:   String,
  pub to_status:     String,
  pub score:         Option<i64>,
  pub rationale:     String,
  pub recorded_at:   String,
}

impl RawTransition {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      transition_id: row.get(0)?,
      lead_id:       row.get(1)?,
      from_status:   row.get(2)?,
      to_status:     row.get(3)?,
      score:         row.get(4)?,
      rationale:     row.get(5)?,
      recorded_at:   row.get(6)?,
    })
  }

  pub fn into_transition(self) -> Result<Transition> {
    Ok(Transition {
      transition_id: decode_uuid(&self.transition_id)?,
      lead_id:       LeadId::from_stored(self.lead_id),
      from_status:   decode_status(&self.from_status)?,
      to_status:     decode_status(&self.to_status)?,
      score:         decode_opt_int("score", self.score)?,
      rationale:     self.rationale,
      recorded_at:   decode_dt(&self.recorded_at)?,
    })
  }
}

// ─── Artifacts ───────────────────────────────────────────────────────────────

pub const ARTIFACT_COLUMNS: &str = "artifact_id, lead_id, artifact_type, url, title,
  publisher, source_class, confidence, notes";

pub struct RawArtifact {
  pub artifact_id:   String,
  pub lead_id:       String,
  pub artifact_type: String,
  pub url:           String,
  pub title:         String,
  pub publisher:     String,
  pub source_class:  String,
  pub confidence:    f64,
  pub notes:         String,
}

impl RawArtifact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      artifact_id:   row.get(0)?,
      lead_id:       row.get(1)?,
      artifact_type: row.get(2)?,
      url:           row.get(3)?,
      title:         row.get(4)?,
      publisher:     row.get(5)?,
      source_class:  row.get(6)?,
      confidence:    row.get(7)?,
      notes:         row.get(8)?,
    })
  }

  pub fn into_artifact(self) -> Result<ClassifiedArtifact> {
    Ok(ClassifiedArtifact {
      artifact_id:   ArtifactId::from_stored(self.artifact_id),
      lead_id:       LeadId::from_stored(self.lead_id),
      artifact_type: ArtifactType::parse(&self.artifact_type)?,
      url:           self.url,
      title:         self.title,
      publisher:     self.publisher,
      source_class:  SourceClass::parse(&self.source_class)?,
      confidence:    self.confidence,
      notes:         self.notes,
    })
  }
}

// ─── Score runs ──────────────────────────────────────────────────────────────

pub const SCORE_RUN_COLUMNS: &str = "run_id, lead_id, case_id, case_json, score_json, scored_at";

pub struct RawScoreRun {
  pub run_id:     String,
  pub lead_id:    String,
  pub case_id:    String,
  pub case_json:  String,
  pub score_json: String,
  pub scored_at:  String,
}

impl RawScoreRun {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      run_id:     row.get(0)?,
      lead_id:    row.get(1)?,
      case_id:    row.get(2)?,
      case_json:  row.get(3)?,
      score_json: row.get(4)?,
      scored_at:  row.get(5)?,
    })
  }

  pub fn into_score_run(self) -> Result<ScoreRun> {
    Ok(ScoreRun {
      run_id:    decode_uuid(&self.run_id)?,
      lead_id:   LeadId::from_stored(self.lead_id),
      case_id:   self.case_id,
      case:      decode_json(&self.case_json)?,
      score:     decode_json(&self.score_json)?,
      scored_at: decode_dt(&self.scored_at)?,
    })
  }
}

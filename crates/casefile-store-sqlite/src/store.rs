//! [`SqliteStore`], the SQLite implementation of [`LeadStore`].

use std::{collections::BTreeMap, path::Path};

use casefile_core::{
  artifact::ClassifiedArtifact,
  case::ScoreRun,
  lead::{Lead, LeadId, LeadStatus, NewLead},
  lifecycle::{Promotion, Transition, TransitionDirective, check_transition, is_allowed},
  store::{InsertOutcome, LeadQuery, LeadStore},
};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    ARTIFACT_COLUMNS, LEAD_COLUMNS, RawArtifact, RawLead, RawScoreRun, RawTransition,
    SCORE_RUN_COLUMNS, TRANSITION_COLUMNS, decode_status, encode_dt, encode_json, encode_uuid,
  },
  schema::SCHEMA,
};

const PROMOTION_RATIONALE: &str = "forwarded to artifact hunt";

/// What a compare-and-set found once it held the write lock.
enum CasOutcome {
  Applied(RawLead),
  NotFound,
  Stale(String),
}

enum PromoteOutcome {
  Promoted(String),
  AlreadyPromoted,
  NotFound,
  Ineligible(String),
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A lead store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn stale(id: LeadId, expected: LeadStatus, actual: &str) -> Result<Error> {
  Ok(Error::Core(casefile_core::Error::StaleTransition {
    id,
    expected,
    actual: decode_status(actual)?,
  }))
}

// ─── LeadStore impl ──────────────────────────────────────────────────────────

impl LeadStore for SqliteStore {
  type Error = Error;

  // ── Leads ─────────────────────────────────────────────────────────────────

  async fn insert_lead(&self, input: NewLead) -> Result<InsertOutcome> {
    let lead = Lead::from_new(input, Utc::now());

    let entities   = encode_json(&lead.entities)?;
    let risk_flags = encode_json(&lead.risk_flags)?;
    let created_at = encode_dt(lead.created_at);
    let row        = lead.clone();

    let existing: Option<RawLead> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let inserted = tx.execute(
          &format!(
            "INSERT INTO leads ({LEAD_COLUMNS}) VALUES (
               ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
               ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?22
             ) ON CONFLICT DO NOTHING"
          ),
          rusqlite::params![
            row.lead_id.as_str(),
            row.url,
            row.source_url,
            row.title,
            row.description,
            row.source_id,
            row.published_at,
            row.duration_sec,
            row.transcript_text,
            entities,
            row.quality_signals.audio_quality.as_str(),
            row.location,
            row.incident_type.as_str(),
            risk_flags,
            row.hook_score,
            row.evidence_prescore,
            row.model_score,
            row.suggested_status.map(LeadStatus::as_str),
            row.triage_score,
            row.rationale,
            row.status.as_str(),
            created_at,
          ],
        )?;

        let existing = if inserted == 0 {
          Some(tx.query_row(
            &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE url = ?1"),
            rusqlite::params![row.url],
            RawLead::from_row,
          )?)
        } else {
          None
        };
        tx.commit()?;
        Ok(existing)
      })
      .await?;

    match existing {
      Some(raw) => Ok(InsertOutcome::Existing(raw.into_lead()?)),
      None => Ok(InsertOutcome::Inserted(lead)),
    }
  }

  async fn get_lead<'a>(&'a self, id: &'a LeadId) -> Result<Option<Lead>> {
    let id_str = id.as_str().to_owned();

    let raw: Option<RawLead> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE lead_id = ?1"),
            rusqlite::params![id_str],
            RawLead::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawLead::into_lead).transpose()
  }

  async fn list_leads<'a>(&'a self, query: &'a LeadQuery) -> Result<Vec<Lead>> {
    let mut sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE 1 = 1");
    let mut values: Vec<Value> = Vec::new();

    if !query.statuses.is_empty() {
      let marks = vec!["?"; query.statuses.len()].join(", ");
      sql.push_str(&format!(" AND status IN ({marks})"));
      values.extend(query.statuses.iter().map(|s| Value::Text(s.as_str().to_owned())));
    }
    if let Some(min) = query.min_hook_score {
      sql.push_str(" AND hook_score >= ?");
      values.push(Value::Integer(i64::from(min)));
    }
    sql.push_str(" ORDER BY hook_score DESC, lead_id ASC");
    if let Some(limit) = query.limit {
      sql.push_str(" LIMIT ?");
      values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
    }

    let raws: Vec<RawLead> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(values), RawLead::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLead::into_lead).collect()
  }

  async fn status_counts(&self) -> Result<BTreeMap<LeadStatus, u64>> {
    let rows: Vec<(String, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM leads GROUP BY status")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(status, count)| {
        let count = u64::try_from(count)
          .map_err(|_| Error::Corrupt { column: "count", value: count.to_string() })?;
        Ok((decode_status(&status)?, count))
      })
      .collect()
  }

  // ── Transitions ───────────────────────────────────────────────────────────

  async fn apply_transition(
    &self,
    directive: TransitionDirective,
    expected: LeadStatus,
  ) -> Result<Lead> {
    check_transition(expected, directive.new_status)?;

    let lead_id       = directive.candidate_id.clone();
    let id_str        = lead_id.as_str().to_owned();
    let expected_str  = expected.as_str();
    let new_str       = directive.new_status.as_str();
    let transition_id = encode_uuid(Uuid::new_v4());
    let at_str        = encode_dt(Utc::now());
    // Triage is the only stage that owns `triage_score`.
    let sets_triage   = expected == LeadStatus::New;
    let risk_flags    = if directive.risk_flags.is_empty() {
      None
    } else {
      Some(encode_json(&directive.risk_flags)?)
    };
    let TransitionDirective { score, rationale, .. } = directive;

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let actual: Option<String> = tx
          .query_row(
            "SELECT status FROM leads WHERE lead_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(actual) = actual else {
          return Ok(CasOutcome::NotFound);
        };
        if actual != expected_str {
          return Ok(CasOutcome::Stale(actual));
        }

        tx.execute(
          "UPDATE leads SET
             status       = ?2,
             updated_at   = ?3,
             rationale    = ?4,
             triage_score = CASE WHEN ?5 THEN ?6 ELSE triage_score END,
             risk_flags   = COALESCE(?7, risk_flags)
           WHERE lead_id = ?1 AND status = ?8",
          rusqlite::params![
            id_str,
            new_str,
            at_str,
            rationale,
            sets_triage,
            score,
            risk_flags,
            expected_str,
          ],
        )?;
        tx.execute(
          &format!("INSERT INTO transitions ({TRANSITION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
          rusqlite::params![transition_id, id_str, expected_str, new_str, score, rationale, at_str],
        )?;
        let raw = tx.query_row(
          &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE lead_id = ?1"),
          rusqlite::params![id_str],
          RawLead::from_row,
        )?;
        tx.commit()?;
        Ok(CasOutcome::Applied(raw))
      })
      .await?;

    match outcome {
      CasOutcome::Applied(raw) => raw.into_lead(),
      CasOutcome::NotFound => Err(casefile_core::Error::LeadNotFound(lead_id).into()),
      CasOutcome::Stale(actual) => Err(stale(lead_id, expected, &actual)?),
    }
  }

  async fn transitions_for<'a>(&'a self, id: &'a LeadId) -> Result<Vec<Transition>> {
    let id_str = id.as_str().to_owned();

    let raws: Vec<RawTransition> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TRANSITION_COLUMNS} FROM transitions
           WHERE lead_id = ?1 ORDER BY recorded_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawTransition::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTransition::into_transition).collect()
  }

  // ── Forwarding ────────────────────────────────────────────────────────────

  async fn promote<'a>(&'a self, id: &'a LeadId, score: u8) -> Result<Option<Promotion>> {
    let promotion_id  = Uuid::new_v4();
    let recorded_at   = Utc::now();
    let id_str        = id.as_str().to_owned();
    let promotion_str = encode_uuid(promotion_id);
    let transition_id = encode_uuid(Uuid::new_v4());
    let at_str        = encode_dt(recorded_at);
    let hunting       = LeadStatus::Hunting.as_str();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let status: Option<String> = tx
          .query_row(
            "SELECT status FROM leads WHERE lead_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(status) = status else {
          return Ok(PromoteOutcome::NotFound);
        };
        let promoted = tx
          .query_row(
            "SELECT 1 FROM promotions WHERE lead_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if promoted {
          return Ok(PromoteOutcome::AlreadyPromoted);
        }
        let eligible = LeadStatus::parse(&status)
          .is_ok_and(|s| is_allowed(s, LeadStatus::Hunting));
        if !eligible {
          return Ok(PromoteOutcome::Ineligible(status));
        }

        tx.execute(
          "INSERT INTO promotions (promotion_id, lead_id, from_status, score, recorded_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![promotion_str, id_str, status, score, at_str],
        )?;
        tx.execute(
          "UPDATE leads SET status = ?2, updated_at = ?3 WHERE lead_id = ?1 AND status = ?4",
          rusqlite::params![id_str, hunting, at_str, status],
        )?;
        tx.execute(
          &format!("INSERT INTO transitions ({TRANSITION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
          rusqlite::params![
            transition_id,
            id_str,
            status,
            hunting,
            score,
            PROMOTION_RATIONALE,
            at_str,
          ],
        )?;
        tx.commit()?;
        Ok(PromoteOutcome::Promoted(status))
      })
      .await?;

    match outcome {
      PromoteOutcome::Promoted(from) => Ok(Some(Promotion {
        promotion_id,
        lead_id: id.clone(),
        from_status: decode_status(&from)?,
        score,
        recorded_at,
      })),
      PromoteOutcome::AlreadyPromoted => Ok(None),
      PromoteOutcome::NotFound => Err(casefile_core::Error::LeadNotFound(id.clone()).into()),
      PromoteOutcome::Ineligible(from) => Err(
        casefile_core::Error::InvalidTransition {
          from: decode_status(&from)?,
          to:   LeadStatus::Hunting,
        }
        .into(),
      ),
    }
  }

  async fn promoted_ids(&self) -> Result<Vec<LeadId>> {
    let ids: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT lead_id FROM promotions ORDER BY lead_id")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(ids.into_iter().map(LeadId::from_stored).collect())
  }

  // ── Artifacts ─────────────────────────────────────────────────────────────

  async fn insert_artifact(&self, artifact: ClassifiedArtifact) -> Result<bool> {
    let lead_id = artifact.lead_id.clone();

    let inserted: Option<bool> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM leads WHERE lead_id = ?1",
            rusqlite::params![artifact.lead_id.as_str()],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }
        let changed = tx.execute(
          &format!(
            "INSERT INTO artifacts ({ARTIFACT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT DO NOTHING"
          ),
          rusqlite::params![
            artifact.artifact_id.as_str(),
            artifact.lead_id.as_str(),
            artifact.artifact_type.as_str(),
            artifact.url,
            artifact.title,
            artifact.publisher,
            artifact.source_class.as_str(),
            artifact.confidence.clamp(0.0, 1.0),
            artifact.notes,
          ],
        )?;
        tx.commit()?;
        Ok(Some(changed == 1))
      })
      .await?;

    inserted.ok_or_else(|| casefile_core::Error::LeadNotFound(lead_id).into())
  }

  async fn artifacts_for<'a>(&'a self, id: &'a LeadId) -> Result<Vec<ClassifiedArtifact>> {
    let id_str = id.as_str().to_owned();

    let raws: Vec<RawArtifact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ARTIFACT_COLUMNS} FROM artifacts WHERE lead_id = ?1 ORDER BY artifact_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawArtifact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawArtifact::into_artifact).collect()
  }

  // ── Score history ─────────────────────────────────────────────────────────

  async fn record_score_run(&self, run: ScoreRun) -> Result<()> {
    let run_id     = encode_uuid(run.run_id);
    let lead_id    = run.lead_id.as_str().to_owned();
    let case_json  = encode_json(&run.case)?;
    let score_json = encode_json(&run.score)?;
    let bundle     = run.score.bundle_score;
    let tier       = run.score.tier.as_str();
    let at_str     = encode_dt(run.scored_at);
    let case_id    = run.case_id;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO score_runs (
             run_id, lead_id, case_id, case_json, score_json, bundle_score, tier, scored_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![run_id, lead_id, case_id, case_json, score_json, bundle, tier, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn score_runs_for<'a>(&'a self, id: &'a LeadId) -> Result<Vec<ScoreRun>> {
    let id_str = id.as_str().to_owned();

    let raws: Vec<RawScoreRun> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SCORE_RUN_COLUMNS} FROM score_runs
           WHERE lead_id = ?1 ORDER BY scored_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawScoreRun::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawScoreRun::into_score_run).collect()
  }
}

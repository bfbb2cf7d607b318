//! One module per pipeline stage. Each `run` reads from the store, calls the
//! pure engine functions and writes directives back.

pub mod forward;
pub mod hunt;
pub mod ingest;
pub mod report;
pub mod score;
pub mod triage;

use std::path::Path;

use anyhow::Context as _;
use casefile_core::{
  lead::{Lead, LeadId},
  policy::Policy,
  store::LeadStore as _,
};
use casefile_engine::jurisdiction::{JurisdictionLookup, JurisdictionRegistry, Region, resolve};
use casefile_store_sqlite::SqliteStore;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

/// Everything a stage needs, loaded once per process.
pub struct Ctx {
  pub store:    SqliteStore,
  pub policy:   Policy,
  pub registry: Option<JurisdictionRegistry>,
}

impl Ctx {
  pub fn lookup(&self) -> Option<&dyn JurisdictionLookup> {
    self.registry.as_ref().map(|r| r as &dyn JurisdictionLookup)
  }

  /// Resolve a region id, warning when the id is not in the registry.
  pub fn region(&self, region_id: Option<&str>) -> Option<&Region> {
    let region = resolve(self.lookup(), region_id);
    if let Some(id) = region_id
      && region.is_none()
    {
      warn!(region = id, "region not in jurisdiction registry; jurisdiction signals skipped");
    }
    region
  }

  pub async fn lead(&self, lead_id: &str) -> anyhow::Result<Lead> {
    let id = LeadId::from_stored(lead_id);
    self
      .store
      .get_lead(&id)
      .await
      .with_context(|| format!("loading lead {id}"))?
      .with_context(|| format!("lead not found: {id}"))
  }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

/// One `T` per non-blank line. Malformed lines are logged and skipped; the
/// count of skipped lines is returned alongside the records.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> anyhow::Result<(Vec<T>, usize)> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading {}", path.display()))?;
  let mut records = Vec::new();
  let mut malformed = 0;
  for (n, line) in raw.lines().enumerate() {
    if line.trim().is_empty() {
      continue;
    }
    match serde_json::from_str(line) {
      Ok(record) => records.push(record),
      Err(e) => {
        malformed += 1;
        warn!(file = %path.display(), line = n + 1, error = %e, "skipping malformed record");
      }
    }
  }
  Ok((records, malformed))
}

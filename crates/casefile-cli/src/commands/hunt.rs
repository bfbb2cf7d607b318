use std::path::Path;

use casefile_core::{
  artifact::SearchResult,
  lead::LeadStatus,
  store::LeadStore as _,
};
use casefile_engine::hunt::{apply_url_budget, build_hunt_queries, classify_results, hunt_directive};
use tracing::{debug, info};

use super::{Ctx, print_json, read_jsonl};

pub async fn queries(ctx: &Ctx, lead_id: &str, region_id: Option<&str>) -> anyhow::Result<()> {
  let lead = ctx.lead(lead_id).await?;
  let region = ctx.region(region_id);
  let plan = build_hunt_queries(&lead, region, ctx.policy.artifact_gating.hunt_max_queries);
  print_json(&plan)
}

pub async fn run(ctx: &Ctx, lead_id: &str, results: &Path) -> anyhow::Result<()> {
  let lead = ctx.lead(lead_id).await?;
  if lead.status != LeadStatus::Hunting {
    anyhow::bail!("lead {} is {}, expected {}", lead.lead_id, lead.status, LeadStatus::Hunting);
  }

  let gating = &ctx.policy.artifact_gating;
  let (results, malformed) = read_jsonl::<SearchResult>(results)?;
  let budgeted = apply_url_budget(results, gating.hunt_max_urls);

  let mut stored = 0;
  for artifact in classify_results(&lead.lead_id, &budgeted.kept) {
    let url = artifact.url.clone();
    if ctx.store.insert_artifact(artifact).await? {
      stored += 1;
    } else {
      debug!(id = %lead.lead_id, %url, "artifact already recorded");
    }
  }

  let artifacts = ctx.store.artifacts_for(&lead.lead_id).await?;
  let directive = hunt_directive(lead.lead_id.clone(), &artifacts, gating);
  let updated = ctx.store.apply_transition(directive, LeadStatus::Hunting).await?;

  info!(
    id = %updated.lead_id,
    status = %updated.status,
    stored,
    duplicates = budgeted.duplicates,
    over_budget = budgeted.over_budget,
    malformed,
    "hunt resolved"
  );
  print_json(&serde_json::json!({
    "lead_id": updated.lead_id,
    "status": updated.status,
    "rationale": updated.rationale,
    "artifacts_stored": stored,
    "artifacts_total": artifacts.len(),
    "duplicates": budgeted.duplicates,
    "over_budget": budgeted.over_budget,
  }))
}

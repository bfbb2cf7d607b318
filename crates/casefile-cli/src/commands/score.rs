use casefile_core::{
  case::{CaseMetadata, ScoreRun},
  lead::LeadStatus,
  lifecycle::TransitionDirective,
  store::LeadStore as _,
};
use casefile_engine::{bundle::score_bundle, hunt::has_qualifying_primary};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{Ctx, print_json};

const PACKAGING: [LeadStatus; 3] =
  [LeadStatus::Approved, LeadStatus::Packaged, LeadStatus::Rendered];

pub async fn run(ctx: &Ctx, lead_id: &str, case: CaseMetadata) -> anyhow::Result<()> {
  let lead = ctx.lead(lead_id).await?;
  // Warns on an unknown region; scoring resolves it again through the lookup.
  ctx.region(case.region_id.as_deref());
  let artifacts = ctx.store.artifacts_for(&lead.lead_id).await?;
  let score = score_bundle(&artifacts, &case, &ctx.policy.bundle, ctx.lookup());

  let run = ScoreRun {
    run_id: Uuid::new_v4(),
    lead_id: lead.lead_id.clone(),
    case_id: case.case_id(),
    case,
    score,
    scored_at: Utc::now(),
  };
  ctx.store.record_score_run(run.clone()).await?;

  info!(
    id = %run.lead_id,
    case_id = %run.case_id,
    bundle_score = run.score.bundle_score,
    tier = %run.score.tier,
    artifacts = artifacts.len(),
    "bundle scored"
  );
  print_json(&run)
}

pub async fn advance(ctx: &Ctx, lead_id: &str, target: &str) -> anyhow::Result<()> {
  let target = LeadStatus::parse(target)?;
  if !PACKAGING.contains(&target) {
    anyhow::bail!("advance target must be one of approved, packaged, rendered; got {target}");
  }
  let lead = ctx.lead(lead_id).await?;

  if target == LeadStatus::Approved {
    let artifacts = ctx.store.artifacts_for(&lead.lead_id).await?;
    let min = ctx.policy.artifact_gating.artifact_min_confidence;
    if !has_qualifying_primary(&artifacts, min) {
      anyhow::bail!(
        "lead {} has no primary artifact at confidence >= {min}; cannot approve",
        lead.lead_id
      );
    }
  }

  let directive =
    TransitionDirective::new(lead.lead_id.clone(), target, format!("advanced to {target}"));
  let updated = ctx.store.apply_transition(directive, lead.status).await?;
  info!(id = %updated.lead_id, from = %lead.status, to = %updated.status, "ADVANCE");
  print_json(&updated)
}

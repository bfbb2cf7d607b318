use casefile_core::{
  lead::{Lead, LeadStatus},
  store::{LeadQuery, LeadStore as _},
};
use casefile_engine::triage::{Score, TriageVerdict, evaluate};
use casefile_store_sqlite::Error as StoreError;
use serde::Serialize;
use tracing::{info, warn};

use super::{Ctx, print_json};

#[derive(Debug, Default, Serialize)]
struct TriageSummary {
  pass:       usize,
  maybe:      usize,
  kill:       usize,
  hard_kills: usize,
  overridden: usize,
  stale:      usize,
  dry_run:    bool,
}

/// The external model score when one exists, otherwise the hook score.
fn score_for(lead: &Lead) -> Score {
  Score {
    score:     lead.model_score.unwrap_or(lead.hook_score),
    suggested: lead.suggested_status,
    rationale: None,
  }
}

fn verdict_for(lead: &Lead, ctx: &Ctx) -> TriageVerdict {
  evaluate(&lead.as_candidate(), &ctx.policy.triage, |_| score_for(lead))
}

pub async fn run(ctx: &Ctx, limit: Option<usize>, dry_run: bool) -> anyhow::Result<()> {
  let query = LeadQuery {
    statuses: vec![LeadStatus::New],
    min_hook_score: Some(ctx.policy.triage.min_hook_score),
    limit,
  };
  let leads = ctx.store.list_leads(&query).await?;
  let mut summary = TriageSummary { dry_run, ..TriageSummary::default() };

  for lead in &leads {
    let verdict = verdict_for(lead, ctx);
    match verdict.status {
      LeadStatus::Pass => summary.pass += 1,
      LeadStatus::Maybe => summary.maybe += 1,
      _ => summary.kill += 1,
    }
    summary.hard_kills += usize::from(verdict.hard_kill.is_some());
    summary.overridden += usize::from(verdict.overridden.is_some());
    info!(
      id = %lead.lead_id,
      verdict = %verdict.status,
      score = verdict.score,
      rationale = %verdict.rationale,
      "TRIAGE"
    );
    if dry_run {
      continue;
    }

    match ctx
      .store
      .apply_transition(verdict.directive(lead.lead_id.clone()), LeadStatus::New)
      .await
    {
      Ok(_) => {}
      Err(StoreError::Core(e @ casefile_core::Error::StaleTransition { .. })) => {
        summary.stale += 1;
        warn!(id = %lead.lead_id, error = %e, "lead changed during triage; skipped");
      }
      Err(e) => return Err(e.into()),
    }
  }

  info!(
    triaged = leads.len(),
    pass = summary.pass,
    maybe = summary.maybe,
    kill = summary.kill,
    "triage complete"
  );
  print_json(&summary)
}

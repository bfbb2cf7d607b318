use std::collections::BTreeSet;

use casefile_core::{
  lead::LeadStatus,
  store::{LeadQuery, LeadStore as _},
};
use casefile_engine::forward::{ForwardItem, plan_forwarding};
use tracing::{info, warn};

use super::{Ctx, print_json};

pub async fn run(ctx: &Ctx, limit: Option<usize>, dry_run: bool) -> anyhow::Result<()> {
  let query = LeadQuery {
    statuses: vec![LeadStatus::Pass, LeadStatus::Maybe],
    ..LeadQuery::default()
  };
  let leads = ctx.store.list_leads(&query).await?;
  let promoted: BTreeSet<_> = ctx.store.promoted_ids().await?.into_iter().collect();

  let items = leads.iter().map(ForwardItem::from).collect();
  let mut plan = plan_forwarding(items, &promoted, &ctx.policy.forwarding, limit);

  if !dry_run {
    for item in &plan.forward {
      match ctx.store.promote(&item.id, item.score).await {
        Ok(Some(_)) => {}
        Ok(None) => plan.stats.already_promoted += 1,
        Err(e) => {
          plan.stats.errors += 1;
          warn!(id = %item.id, error = %e, "promotion failed");
        }
      }
    }
  }

  info!(
    forwarded = plan.stats.forwarded_total,
    deduped = plan.stats.dedupe_forwarded_removed,
    errors = plan.stats.errors,
    dry_run,
    "forwarding complete"
  );
  print_json(&serde_json::json!({
    "dry_run": dry_run,
    "stats": plan.stats,
    "forward": plan.forward,
  }))
}

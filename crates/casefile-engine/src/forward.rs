//! Forwarding policy: which triaged leads move on to the artifact hunt.
//!
//! 1. keep PASS leads, plus MAYBE leads when `route_maybes_to_artifact_hunt`
//! 2. drop leads already promoted (counted)
//! 3. stable sort: PASS before MAYBE, then score descending
//! 4. apply the batch limit
//! 5. dedupe by canonical URL, first seen wins (counted)
//! 6. MAYBE leads below `maybe_score_min_to_forward` are skipped (counted)

use std::collections::BTreeSet;

use casefile_core::{
  canonical::canonical_url,
  lead::{Lead, LeadId, LeadStatus},
  policy::ForwardingPolicy,
};
use serde::Serialize;
use tracing::{debug, info};

/// One forwarding candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardItem {
  pub id:     LeadId,
  pub url:    String,
  pub status: LeadStatus,
  pub score:  u8,
}

impl From<&Lead> for ForwardItem {
  fn from(lead: &Lead) -> Self {
    Self {
      id:     lead.lead_id.clone(),
      url:    lead.url.clone(),
      status: lead.status,
      score:  lead.forwarding_score(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForwardStats {
  pub forwarded_pass_count:     usize,
  pub forwarded_maybe_count:    usize,
  pub forwarded_total:          usize,
  pub dedupe_forwarded_removed: usize,
  pub already_promoted:         usize,
  pub below_floor:              usize,
  /// Promotions that failed downstream. Filled in by the caller.
  pub errors:                   usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForwardPlan {
  /// In forwarding order.
  pub forward: Vec<ForwardItem>,
  pub stats:   ForwardStats,
}

fn status_rank(status: LeadStatus) -> u8 {
  match status {
    LeadStatus::Pass => 0,
    _ => 1,
  }
}

/// Decide which of `items` to forward. Pure; the caller performs the
/// promotions.
pub fn plan_forwarding(
  items: Vec<ForwardItem>,
  promoted: &BTreeSet<LeadId>,
  policy: &ForwardingPolicy,
  limit: Option<usize>,
) -> ForwardPlan {
  let mut stats = ForwardStats::default();

  let mut eligible: Vec<ForwardItem> = items
    .into_iter()
    .filter(|item| {
      item.status.is_forwardable()
        && (item.status == LeadStatus::Pass || policy.route_maybes_to_artifact_hunt)
    })
    .filter(|item| {
      let seen = promoted.contains(&item.id);
      if seen {
        stats.already_promoted += 1;
      }
      !seen
    })
    .collect();

  eligible.sort_by(|a, b| {
    status_rank(a.status)
      .cmp(&status_rank(b.status))
      .then_with(|| b.score.cmp(&a.score))
  });
  if let Some(limit) = limit {
    eligible.truncate(limit);
  }

  let mut seen_urls = BTreeSet::new();
  let mut forward = Vec::new();
  for item in eligible {
    let key = canonical_url(&item.url);
    if !seen_urls.insert(key) {
      stats.dedupe_forwarded_removed += 1;
      debug!(id = %item.id, url = %item.url, "DEDUPE_FORWARD_SKIP");
      continue;
    }
    if item.status == LeadStatus::Maybe && item.score < policy.maybe_score_min_to_forward {
      stats.below_floor += 1;
      debug!(
        id = %item.id,
        score = item.score,
        floor = policy.maybe_score_min_to_forward,
        "SKIP_FORWARD"
      );
      continue;
    }

    let reason = if item.status == LeadStatus::Maybe {
      "route_maybes_to_artifact_hunt"
    } else {
      "pass"
    };
    info!(
      id = %item.id,
      label = %item.status,
      score = item.score,
      reason,
      "FORWARD"
    );
    match item.status {
      LeadStatus::Pass => stats.forwarded_pass_count += 1,
      _ => stats.forwarded_maybe_count += 1,
    }
    forward.push(item);
  }
  stats.forwarded_total = forward.len();

  ForwardPlan { forward, stats }
}

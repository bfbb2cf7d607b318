use std::{collections::BTreeMap, fmt::Write as _};

use casefile_core::{
  lead::LeadStatus,
  store::{LeadQuery, LeadStore as _},
};
use casefile_engine::report::{MissedReport, Tally, missed_opportunities};
use tracing::info;

use super::{Ctx, print_json};

pub async fn run(ctx: &Ctx, top: usize, json: bool) -> anyhow::Result<()> {
  let counts = ctx.store.status_counts().await?;
  let query = LeadQuery {
    statuses: vec![LeadStatus::NoArtifact],
    limit: Some(top),
    ..LeadQuery::default()
  };
  let missed = ctx.store.list_leads(&query).await?;

  let mut artifacts = BTreeMap::new();
  for lead in &missed {
    artifacts.insert(lead.lead_id.clone(), ctx.store.artifacts_for(&lead.lead_id).await?);
  }

  let report = missed_opportunities(&counts, &missed, &artifacts, top);
  info!(
    analysed = report.top_missed.len(),
    suggestions = report.registry_suggestions.len(),
    "report built"
  );
  if json {
    print_json(&report)
  } else {
    print!("{}", render(&report));
    Ok(())
  }
}

fn render_tallies(out: &mut String, heading: &str, tallies: &[Tally]) {
  if tallies.is_empty() {
    return;
  }
  let _ = writeln!(out, "\n{heading}");
  for t in tallies {
    let _ = writeln!(out, "  {:<40} {:>4}", t.key, t.count);
  }
}

/// Plain-text rendering of the report.
pub fn render(report: &MissedReport) -> String {
  let s = &report.summary;
  let mut out = String::new();
  let _ = writeln!(out, "MISSED OPPORTUNITY REPORT");
  let _ = writeln!(out, "  total leads:      {}", s.total_leads);
  let _ = writeln!(out, "  artifact found:   {}", s.artifact_found);
  let _ = writeln!(out, "  no artifact:      {}", s.no_artifact);
  let _ = writeln!(out, "  new (unhunted):   {}", s.new_unhunted);
  let _ = writeln!(out, "  conversion rate:  {:.1}%", s.conversion_rate);

  if !s.by_status.is_empty() {
    let _ = writeln!(out, "\nBY STATUS");
    for (status, count) in &s.by_status {
      let _ = writeln!(out, "  {:<40} {:>4}", status.as_str(), count);
    }
  }

  if !report.top_missed.is_empty() {
    let _ = writeln!(out, "\nTOP MISSED");
    for m in &report.top_missed {
      let _ = writeln!(
        out,
        "  [{:>3}] {} ({}, {}) artifacts {}/{} primary",
        m.hook_score, m.title, m.incident_type, m.location, m.primary_artifacts, m.total_artifacts
      );
    }
  }

  render_tallies(&mut out, "BY INCIDENT TYPE", &report.by_incident_type);
  render_tallies(&mut out, "BY LOCATION", &report.by_location);
  render_tallies(&mut out, "BY AGENCY", &report.by_agency);

  if !report.secondary_video_exists.is_empty() {
    let _ = writeln!(out, "\nSECONDARY VIDEO EXISTS");
    for v in &report.secondary_video_exists {
      let _ = writeln!(out, "  [{:>3}] {} ({})", v.hook_score, v.title, v.location);
      for url in &v.secondary_urls {
        let _ = writeln!(out, "        {url}");
      }
    }
  }

  if !report.registry_suggestions.is_empty() {
    let _ = writeln!(out, "\nREGISTRY SUGGESTIONS");
    for r in &report.registry_suggestions {
      let _ = writeln!(out, "  {} (missed {})", r.suggestion, r.missed_count);
    }
  }
  out
}

pub async fn show(ctx: &Ctx, lead_id: &str) -> anyhow::Result<()> {
  let lead = ctx.lead(lead_id).await?;
  let artifacts = ctx.store.artifacts_for(&lead.lead_id).await?;
  let transitions = ctx.store.transitions_for(&lead.lead_id).await?;
  let score_runs = ctx.store.score_runs_for(&lead.lead_id).await?;
  print_json(&serde_json::json!({
    "lead": lead,
    "artifacts": artifacts,
    "transitions": transitions,
    "score_runs": score_runs,
  }))
}

#[cfg(test)]
mod tests {
  use casefile_engine::report::summarize;

  use super::*;

  #[test]
  fn empty_report_renders_summary_only() {
    let report = MissedReport {
      summary: summarize(&BTreeMap::from([(LeadStatus::ArtifactFound, 1), (LeadStatus::NoArtifact, 3)])),
      ..MissedReport::default()
    };
    let text = render(&report);
    assert!(text.contains("conversion rate:  25.0%"));
    assert!(text.contains("NO_ARTIFACT"));
    assert!(!text.contains("TOP MISSED"));
  }
}

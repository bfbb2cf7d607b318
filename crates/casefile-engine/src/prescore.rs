//! Evidence pre-score: how likely an article is to lead to releasable
//! footage, computed before any paid scoring runs.
//!
//! Uncapped. Matched labels are kept so the score can be audited.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::{classify::VIDEO_PLATFORMS, jurisdiction::Region};

const KEYWORD_POINTS: u32 = 15;
const VIDEO_PLATFORM_POINTS: u32 = 20;
const AGENCY_POINTS: u32 = 10;
const LIFECYCLE_POINTS: u32 = 5;
const SUNSHINE_POINTS: u32 = 10;
const COURT_VIDEO_POINTS: u32 = 10;

fn labelled(rules: &[(&'static str, &str)]) -> Vec<(&'static str, Regex)> {
  rules
    .iter()
    .map(|(label, pattern)| {
      (*label, Regex::new(&format!(r"(?i)\b(?:{pattern})\b")).expect("static regex"))
    })
    .collect()
}

/// Each distinct hit scores separately.
static ARTIFACT_KEYWORDS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
  labelled(&[
    ("bodycam", r"bodycam"),
    ("body cam", r"body[\s-]?cam"),
    ("BWC", r"BWC"),
    ("body worn camera", r"body[\s-]?worn\s+camera"),
    ("body camera", r"body\s+camera"),
    ("custodial interview", r"custodial\s+interview"),
    ("interrogation video", r"interrogation\s+video"),
    ("surveillance footage", r"surveillance\s+footage"),
    ("trial livestream", r"trial\s+livestream"),
    ("dashcam", r"dashcam"),
    ("dash cam", r"dash[\s-]?cam"),
  ])
});

static LIFECYCLE_KEYWORDS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
  labelled(&[
    ("sentenced", "sentenced"),
    ("convicted", "convicted"),
    ("plea", "plea"),
    ("trial", "trial"),
    ("verdict", "verdict"),
  ])
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrescoreBreakdown {
  pub keyword_hits:   u32,
  pub video_platform: u32,
  pub agency_match:   u32,
  pub lifecycle:      u32,
  pub sunshine_state: u32,
  pub court_video:    u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvidencePrescore {
  pub score:     u32,
  pub matched:   Vec<String>,
  pub breakdown: PrescoreBreakdown,
}

fn hits(text: &str, rules: &[(&'static str, Regex)]) -> Vec<&'static str> {
  rules
    .iter()
    .filter(|(_, re)| re.is_match(text))
    .map(|(label, _)| *label)
    .collect()
}

/// Agencies named in `text`, by abbreviation first and then full name.
fn agency_hits<'r>(text: &str, region: &'r Region) -> Vec<&'r str> {
  let lower = text.to_lowercase();
  region
    .agencies
    .iter()
    .filter_map(|a| {
      if !a.abbrev.is_empty() && lower.contains(&a.abbrev.to_lowercase()) {
        Some(a.abbrev.as_str())
      } else if !a.name.is_empty() && lower.contains(&a.name.to_lowercase()) {
        Some(a.name.as_str())
      } else {
        None
      }
    })
    .collect()
}

/// Score `text` for artifact likelihood. Jurisdiction bonuses apply only when
/// a region is supplied.
pub fn evidence_prescore(text: &str, region: Option<&Region>) -> EvidencePrescore {
  let mut out = EvidencePrescore::default();

  let keywords = hits(text, &ARTIFACT_KEYWORDS);
  out.breakdown.keyword_hits = keywords.len() as u32 * KEYWORD_POINTS;
  out.matched.extend(keywords.iter().map(|k| k.to_string()));

  let lower = text.to_lowercase();
  let platforms: Vec<&str> = VIDEO_PLATFORMS
    .iter()
    .copied()
    .filter(|p| lower.contains(p))
    .collect();
  if !platforms.is_empty() {
    out.breakdown.video_platform = VIDEO_PLATFORM_POINTS;
    out.matched.extend(platforms.iter().map(|p| format!("video:{p}")));
  }

  if let Some(region) = region {
    let agencies = agency_hits(text, region);
    if !agencies.is_empty() {
      out.breakdown.agency_match = AGENCY_POINTS;
      out.matched.extend(agencies.iter().map(|a| format!("agency:{a}")));
    }
  }

  let lifecycle = hits(text, &LIFECYCLE_KEYWORDS);
  out.breakdown.lifecycle = lifecycle.len() as u32 * LIFECYCLE_POINTS;
  out.matched.extend(lifecycle.iter().map(|l| format!("lifecycle:{l}")));

  if let Some(region) = region {
    if region.is_sunshine_state() {
      out.breakdown.sunshine_state = SUNSHINE_POINTS;
      out.matched.push("sunshine_state".into());
    }
    if region.has_court_video() {
      out.breakdown.court_video = COURT_VIDEO_POINTS;
      out.matched.push("court_has_video".into());
    }
  }

  let b = &out.breakdown;
  out.score = b.keyword_hits
    + b.video_platform
    + b.agency_match
    + b.lifecycle
    + b.sunshine_state
    + b.court_video;
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::jurisdiction::{JurisdictionLookup, tests::sample};

  #[test]
  fn overlapping_keyword_patterns_score_separately() {
    // "bodycam" matches both the exact and the spaced-variant patterns.
    let p = evidence_prescore("Police release bodycam", None);
    assert_eq!(p.breakdown.keyword_hits, 30);
    assert_eq!(p.matched, vec!["bodycam", "body cam"]);
  }

  #[test]
  fn platform_and_lifecycle_points() {
    let p = evidence_prescore(
      "Watch at youtube.com/watch?v=1 after he was convicted and sentenced",
      None,
    );
    assert_eq!(p.breakdown.video_platform, 20);
    assert_eq!(p.breakdown.lifecycle, 10);
    assert_eq!(p.score, 30);
  }

  #[test]
  fn jurisdiction_bonuses_need_a_region() {
    let text = "PHXPD bodycam shows arrest";
    let without = evidence_prescore(text, None);

    let registry = sample();
    let with = evidence_prescore(text, registry.region("PHX"));
    assert_eq!(with.breakdown.agency_match, 10);
    assert_eq!(with.breakdown.sunshine_state, 10);
    assert_eq!(with.breakdown.court_video, 10);
    assert_eq!(with.score, without.score + 30);
    assert!(with.matched.contains(&"agency:PHXPD".to_string()));
  }

  #[test]
  fn word_boundaries_hold() {
    assert_eq!(evidence_prescore("the pleasant trialist", None).score, 0);
  }
}

//! Hook pre-scorer: a cheap 0–100 estimate of narrative and video appeal,
//! used to decide whether a lead is worth the costly downstream stages.
//!
//! Four independent buckets are summed and clamped:
//!
//! | bucket | max | signal |
//! |---|---|---|
//! | stakes | 25 | violence, then pursuit/assault, then arrest vocabulary |
//! | specificity | 25 | a proper name (+15) and a date (+10) |
//! | video | 25 | explicit footage terms (25) or generic camera terms (15) |
//! | recency | 20 | release vocabulary (+10) and official statements (+10) |

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static PROPER_NAME: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[A-Z][a-z]+\s+[A-Z][a-z]+").expect("static regex"));

static DATE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"\d{1,2}/\d{1,2}|\b(january|february|march|april|may|june|july|august|september|october|november|december)\b",
  )
  .expect("static regex")
});

/// Tiers are tried in order; only the first tier that hits scores.
const STAKES_TIERS: &[(&[&str], u8)] = &[
  (&["shooting", "shot", "killed", "fatal", "weapon", "gun"], 25),
  (&["chase", "pursuit", "assault", "stabbing"], 20),
  (&["arrest", "charged", "indicted"], 15),
];

const VIDEO_TIERS: &[(&[&str], u8)] = &[
  (
    &["bodycam", "dashcam", "body cam", "dash cam", "footage", "video released"],
    25,
  ),
  (&["video", "surveillance", "camera"], 15),
];

const RELEASE_WORDS: &[&str] = &["released", "new", "just", "breaking"];
const STATEMENT_WORDS: &[&str] = &["press conference", "briefing", "statement"];

/// Per-bucket contributions, for display and auditing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HookBreakdown {
  pub stakes:      u8,
  pub specificity: u8,
  pub video:       u8,
  pub recency:     u8,
  pub total:       u8,
}

fn any_of(text: &str, words: &[&str]) -> bool { words.iter().any(|w| text.contains(w)) }

fn first_tier(text: &str, tiers: &[(&[&str], u8)]) -> u8 {
  tiers
    .iter()
    .find(|(words, _)| any_of(text, words))
    .map_or(0, |(_, points)| *points)
}

pub fn breakdown(title: &str, snippet: &str) -> HookBreakdown {
  let original = format!("{title} {snippet}");
  let text = original.to_lowercase();

  let stakes = first_tier(&text, STAKES_TIERS);

  let mut specificity = 0;
  if PROPER_NAME.is_match(&original) {
    specificity += 15;
  }
  if DATE.is_match(&text) {
    specificity += 10;
  }

  let video = first_tier(&text, VIDEO_TIERS);

  let mut recency = 0;
  if any_of(&text, RELEASE_WORDS) {
    recency += 10;
  }
  if any_of(&text, STATEMENT_WORDS) {
    recency += 10;
  }

  let total = (stakes + specificity + video + recency).min(100);
  HookBreakdown { stakes, specificity, video, recency, total }
}

/// The hook score for a title and snippet, in `[0, 100]`.
pub fn heuristic_score(title: &str, snippet: &str) -> u8 { breakdown(title, snippet).total }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_text_scores_zero() {
    assert_eq!(heuristic_score("", ""), 0);
  }

  #[test]
  fn buckets_are_independent_and_summed() {
    let b = breakdown(
      "Bodycam video released in fatal shooting",
      "Officer Jane Doe speaks at press conference on March 3",
    );
    assert_eq!(b.stakes, 25);
    assert_eq!(b.specificity, 25);
    assert_eq!(b.video, 25);
    assert_eq!(b.recency, 20);
    assert_eq!(b.total, 95);
  }

  #[test]
  fn stakes_take_only_the_highest_tier() {
    let b = breakdown("suspect charged after chase", "");
    assert_eq!(b.stakes, 20);
  }

  #[test]
  fn weaker_video_terms_score_less() {
    assert_eq!(breakdown("surveillance camera shows theft", "").video, 15);
    assert_eq!(breakdown("dash cam shows theft", "").video, 25);
  }

  #[test]
  fn proper_name_needs_original_case() {
    assert_eq!(breakdown("john smith", "").specificity, 0);
    assert_eq!(breakdown("John Smith", "").specificity, 15);
    assert_eq!(breakdown("arrest on 4/12", "").specificity, 10);
  }

  #[test]
  fn score_never_exceeds_100() {
    let s = heuristic_score(
      "BREAKING: Bodycam footage released of fatal shooting, John Smith",
      "Statement and briefing on January 5, 3/4, video, gun, weapon",
    );
    assert!(s <= 100);
  }
}

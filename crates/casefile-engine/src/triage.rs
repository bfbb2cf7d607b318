//! Triage: the hard-kill short-circuit followed by the threshold verdict.
//!
//! [`evaluate`] checks the hard-kill rules before it calls the scorer, so a
//! candidate that can never be used costs nothing to reject. The numeric
//! score is authoritative: whatever label a scorer suggests, the verdict is
//! re-derived from the configured thresholds.

use std::fmt;

use casefile_core::{
  lead::{AudioQuality, Candidate, LeadId, LeadStatus},
  lifecycle::TransitionDirective,
  policy::TriagePolicy,
};
use serde::Serialize;
use tracing::info;

/// Why a candidate was killed without scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum HardKill {
  TooShort {
    duration_sec: u32,
    min_sec:      u32,
  },
  NoUsableText {
    description_chars: usize,
    min_chars:         usize,
    audio:             AudioQuality,
  },
}

impl fmt::Display for HardKill {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::TooShort { duration_sec, min_sec } => {
        write!(f, "hard kill: duration {duration_sec}s below minimum {min_sec}s")
      }
      Self::NoUsableText { description_chars, min_chars, audio } => write!(
        f,
        "hard kill: no transcript, description {description_chars} chars below {min_chars}, audio {}",
        audio.as_str()
      ),
    }
  }
}

/// The hard-kill rules. A missing or zero duration is unknown, not short.
pub fn hard_kill(candidate: &Candidate, policy: &TriagePolicy) -> Option<HardKill> {
  if let Some(duration_sec) = candidate.duration_sec
    && duration_sec > 0
    && duration_sec < policy.min_duration_sec
  {
    return Some(HardKill::TooShort { duration_sec, min_sec: policy.min_duration_sec });
  }

  let description_chars = candidate.description.trim().chars().count();
  let audio = candidate.quality_signals.audio_quality;
  if !candidate.has_transcript()
    && description_chars < policy.min_text_length
    && audio.is_poor_or_unknown()
  {
    return Some(HardKill::NoUsableText {
      description_chars,
      min_chars: policy.min_text_length,
      audio,
    });
  }
  None
}

/// Map a numeric score onto PASS / MAYBE / KILL.
pub fn threshold_status(score: u8, policy: &TriagePolicy) -> LeadStatus {
  if score >= policy.pass_threshold {
    LeadStatus::Pass
  } else if score >= policy.maybe_threshold {
    LeadStatus::Maybe
  } else {
    LeadStatus::Kill
  }
}

/// What a scorer (heuristic or model) reports for one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
  pub score:     u8,
  /// The label the scorer would have picked; advisory only.
  pub suggested: Option<LeadStatus>,
  pub rationale: Option<String>,
}

impl Score {
  pub fn new(score: u8) -> Self { Self { score: score.min(100), ..Self::default() } }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriageVerdict {
  pub status:     LeadStatus,
  pub score:      u8,
  pub rationale:  String,
  pub hard_kill:  Option<HardKill>,
  /// A suggested label the thresholds overruled.
  pub overridden: Option<LeadStatus>,
  pub risk_flags: Vec<String>,
}

impl TriageVerdict {
  pub fn directive(&self, lead_id: LeadId) -> TransitionDirective {
    TransitionDirective::new(lead_id, self.status, self.rationale.clone())
      .with_score(self.score)
      .with_risk_flags(self.risk_flags.clone())
  }
}

fn threshold_rationale(score: u8, status: LeadStatus, policy: &TriagePolicy) -> String {
  match status {
    LeadStatus::Pass => format!("score {score} >= pass threshold {}", policy.pass_threshold),
    LeadStatus::Maybe => format!(
      "score {score} in maybe band [{}, {})",
      policy.maybe_threshold, policy.pass_threshold
    ),
    _ => format!("score {score} < maybe threshold {}", policy.maybe_threshold),
  }
}

/// Triage one candidate. `scorer` runs only when no hard-kill rule applies.
pub fn evaluate<F>(candidate: &Candidate, policy: &TriagePolicy, scorer: F) -> TriageVerdict
where
  F: FnOnce(&Candidate) -> Score,
{
  if let Some(kill) = hard_kill(candidate, policy) {
    return TriageVerdict {
      status:     LeadStatus::Kill,
      score:      0,
      rationale:  kill.to_string(),
      hard_kill:  Some(kill),
      overridden: None,
      risk_flags: candidate.risk_flags.clone(),
    };
  }

  let scored = scorer(candidate);
  let score = scored.score.min(100);
  let status = threshold_status(score, policy);

  let overridden = scored.suggested.filter(|s| *s != status);
  if let Some(suggested) = overridden {
    info!(
      candidate = candidate.id.as_deref().unwrap_or(&candidate.url),
      %suggested,
      verdict = %status,
      score,
      "scorer label overridden by thresholds"
    );
  }

  let mut rationale = threshold_rationale(score, status, policy);
  if let Some(extra) = scored.rationale.filter(|r| !r.trim().is_empty()) {
    rationale = format!("{rationale}; {}", extra.trim());
  }

  TriageVerdict {
    status,
    score,
    rationale,
    hard_kill: None,
    overridden,
    risk_flags: candidate.risk_flags.clone(),
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use casefile_core::{lead::QualitySignals, policy::Policy};

  use super::*;

  fn policy() -> TriagePolicy { Policy::default().triage }

  fn candidate() -> Candidate {
    Candidate {
      url: "https://example.com/v/1".into(),
      title: "Bodycam shows pursuit".into(),
      description: "d".repeat(200),
      duration_sec: Some(500),
      ..Candidate::default()
    }
  }

  #[test]
  fn short_video_is_killed_without_scoring() {
    let called = Cell::new(false);
    let c = Candidate { duration_sec: Some(30), ..candidate() };
    let verdict = evaluate(&c, &policy(), |_| {
      called.set(true);
      Score::new(95)
    });
    assert_eq!(verdict.status, LeadStatus::Kill);
    assert_eq!(verdict.score, 0);
    assert!(matches!(verdict.hard_kill, Some(HardKill::TooShort { .. })));
    assert!(!called.get());
  }

  #[test]
  fn long_description_avoids_text_kill() {
    let c = candidate();
    assert_eq!(c.transcript_text, None);
    assert_eq!(hard_kill(&c, &policy()), None);
    let verdict = evaluate(&c, &policy(), |_| Score::new(60));
    assert_eq!(verdict.status, LeadStatus::Maybe);
    assert_eq!(verdict.hard_kill, None);
  }

  #[test]
  fn no_text_and_poor_audio_is_killed() {
    let c = Candidate {
      description: "short".into(),
      quality_signals: QualitySignals { audio_quality: AudioQuality::Poor },
      ..candidate()
    };
    assert!(matches!(
      hard_kill(&c, &policy()),
      Some(HardKill::NoUsableText { description_chars: 5, .. })
    ));
  }

  #[test]
  fn good_audio_or_transcript_rescues_short_description() {
    let good_audio = Candidate {
      description: "short".into(),
      quality_signals: QualitySignals { audio_quality: AudioQuality::Good },
      ..candidate()
    };
    assert_eq!(hard_kill(&good_audio, &policy()), None);

    let transcript = Candidate {
      description: String::new(),
      transcript_text: Some("officer: stop".into()),
      ..candidate()
    };
    assert_eq!(hard_kill(&transcript, &policy()), None);
  }

  #[test]
  fn unknown_duration_is_not_short() {
    for duration_sec in [None, Some(0)] {
      let c = Candidate { duration_sec, ..candidate() };
      assert_eq!(hard_kill(&c, &policy()), None);
    }
  }

  #[test]
  fn thresholds_partition_every_score() {
    let p = policy();
    for score in 0..=100u8 {
      let expected = if score >= p.pass_threshold {
        LeadStatus::Pass
      } else if score >= p.maybe_threshold {
        LeadStatus::Maybe
      } else {
        LeadStatus::Kill
      };
      assert_eq!(threshold_status(score, &p), expected, "score {score}");
    }
  }

  #[test]
  fn suggested_label_is_overridden() {
    let verdict = evaluate(&candidate(), &policy(), |_| Score {
      score:     40,
      suggested: Some(LeadStatus::Pass),
      rationale: Some("looks great".into()),
    });
    assert_eq!(verdict.status, LeadStatus::Kill);
    assert_eq!(verdict.overridden, Some(LeadStatus::Pass));
    assert!(verdict.rationale.ends_with("; looks great"));
  }

  #[test]
  fn agreeing_label_is_not_an_override() {
    let verdict = evaluate(&candidate(), &policy(), |_| Score {
      score:     80,
      suggested: Some(LeadStatus::Pass),
      rationale: None,
    });
    assert_eq!(verdict.status, LeadStatus::Pass);
    assert_eq!(verdict.overridden, None);
  }

  #[test]
  fn directive_carries_score_and_flags() {
    let c = Candidate { risk_flags: vec!["minor".into()], ..candidate() };
    let verdict = evaluate(&c, &policy(), |_| Score::new(72));
    let d = verdict.directive(LeadId::for_url(&c.url));
    assert_eq!(d.new_status, LeadStatus::Pass);
    assert_eq!(d.score, Some(72));
    assert_eq!(d.risk_flags, vec!["minor".to_string()]);
  }
}

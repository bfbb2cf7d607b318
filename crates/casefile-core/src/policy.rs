//! The pipeline policy: every tunable threshold, loaded once per process and
//! passed by reference to each stage.
//!
//! No field carries a serde default. A source that omits a key fails to
//! deserialise; callers that want defaults layer [`Policy::default`] first.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const MAX_TIMELINE_WINDOW_YEARS: i32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
  pub triage:          TriagePolicy,
  pub artifact_gating: ArtifactGating,
  pub forwarding:      ForwardingPolicy,
  pub bundle:          BundlePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriagePolicy {
  pub pass_threshold:   u8,
  pub maybe_threshold:  u8,
  pub min_duration_sec: u32,
  pub min_text_length:  usize,
  /// Leads below this hook score are never selected for triage.
  pub min_hook_score:   u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactGating {
  pub artifact_min_confidence: f64,
  pub hunt_max_queries:        usize,
  pub hunt_max_urls:           usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardingPolicy {
  pub route_maybes_to_artifact_hunt: bool,
  pub maybe_score_min_to_forward:    u8,
}

/// Bundle scoring weights and tier cutoffs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundlePolicy {
  pub high_cutoff:           f64,
  pub medium_cutoff:         f64,
  pub low_cutoff:            f64,
  pub source_trust_max:      f64,
  pub entity_match_max:      f64,
  pub timeline_fit_max:      f64,
  pub corroboration_max:     f64,
  /// Weight multiplier applied to each successive lane.
  pub lane_decay:            f64,
  /// How many years either side of the incident year still count as a fit.
  pub timeline_window_years: i32,
  /// Points added when a primary supporting artifact is present.
  pub supporting_bonus:      f64,
  /// Subtotal an official artifact needs for evidence tier T1.
  pub t1_threshold:          f64,
  /// Subtotal a corroborated artifact needs for evidence tier T2.
  pub t2_threshold:          f64,
  /// Raw corroboration, in `[0, 1]`, that T2 additionally requires.
  pub t2_min_corroboration:  f64,
}

impl Default for Policy {
  fn default() -> Self {
    Self {
      triage:          TriagePolicy {
        pass_threshold:   70,
        maybe_threshold:  55,
        min_duration_sec: 60,
        min_text_length:  80,
        min_hook_score:   25,
      },
      artifact_gating: ArtifactGating {
        artifact_min_confidence: 0.7,
        hunt_max_queries:        8,
        hunt_max_urls:           25,
      },
      forwarding:      ForwardingPolicy {
        route_maybes_to_artifact_hunt: true,
        maybe_score_min_to_forward:    0,
      },
      bundle:          BundlePolicy {
        high_cutoff:           75.0,
        medium_cutoff:         50.0,
        low_cutoff:            25.0,
        source_trust_max:      35.0,
        entity_match_max:      30.0,
        timeline_fit_max:      20.0,
        corroboration_max:     15.0,
        lane_decay:            0.5,
        timeline_window_years: 1,
        supporting_bonus:      5.0,
        t1_threshold:          80.0,
        t2_threshold:          60.0,
        t2_min_corroboration:  0.3,
      },
    }
  }
}

impl Policy {
  /// Check cross-field invariants. Run once at startup, before any stage.
  pub fn validate(&self) -> Result<()> {
    let t = &self.triage;
    if t.pass_threshold > 100 {
      return invalid("triage.pass_threshold must be at most 100");
    }
    if t.maybe_threshold > t.pass_threshold {
      return invalid("triage.maybe_threshold must not exceed pass_threshold");
    }

    let g = &self.artifact_gating;
    if !(0.0..=1.0).contains(&g.artifact_min_confidence) {
      return invalid("artifact_gating.artifact_min_confidence must be in [0, 1]");
    }
    if g.hunt_max_queries == 0 || g.hunt_max_urls == 0 {
      return invalid("artifact_gating hunt budgets must be positive");
    }

    if self.forwarding.maybe_score_min_to_forward > 100 {
      return invalid("forwarding.maybe_score_min_to_forward must be at most 100");
    }

    let b = &self.bundle;
    if !(b.low_cutoff <= b.medium_cutoff
      && b.medium_cutoff <= b.high_cutoff
      && b.high_cutoff <= 100.0
      && b.low_cutoff >= 0.0)
    {
      return invalid("bundle cutoffs must satisfy 0 <= low <= medium <= high <= 100");
    }
    let maxes = [
      b.source_trust_max,
      b.entity_match_max,
      b.timeline_fit_max,
      b.corroboration_max,
    ];
    if maxes.iter().any(|m| !m.is_finite() || *m < 0.0) {
      return invalid("bundle factor maxima must be non-negative");
    }
    let total: f64 = maxes.iter().sum();
    if total <= 0.0 || total > 100.0 + 1e-9 {
      return invalid("bundle factor maxima must sum to a value in (0, 100]");
    }
    if !(b.lane_decay > 0.0 && b.lane_decay <= 1.0) {
      return invalid("bundle.lane_decay must be in (0, 1]");
    }
    if !(0..=MAX_TIMELINE_WINDOW_YEARS).contains(&b.timeline_window_years) {
      return invalid("bundle.timeline_window_years must be in [0, 50]");
    }
    if !(0.0..=100.0).contains(&b.supporting_bonus) {
      return invalid("bundle.supporting_bonus must be in [0, 100]");
    }
    if !(b.t2_threshold >= 0.0 && b.t2_threshold <= b.t1_threshold && b.t1_threshold <= 100.0) {
      return invalid("bundle evidence tiers must satisfy 0 <= t2 <= t1 <= 100");
    }
    if !(0.0..=1.0).contains(&b.t2_min_corroboration) {
      return invalid("bundle.t2_min_corroboration must be in [0, 1]");
    }
    Ok(())
  }
}

fn invalid(msg: &str) -> Result<()> { Err(Error::InvalidPolicy(msg.to_string())) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_valid() { Policy::default().validate().unwrap(); }

  #[test]
  fn inverted_thresholds_rejected() {
    let mut policy = Policy::default();
    policy.triage.maybe_threshold = 80;
    assert!(matches!(policy.validate(), Err(Error::InvalidPolicy(_))));
  }

  #[test]
  fn factor_maxima_cannot_exceed_100() {
    let mut policy = Policy::default();
    policy.bundle.corroboration_max = 30.0;
    assert!(policy.validate().is_err());
  }

  #[test]
  fn evidence_tier_thresholds_are_ordered() {
    let mut policy = Policy::default();
    policy.bundle.t2_threshold = 90.0;
    assert!(policy.validate().is_err());
  }

  #[test]
  fn timeline_window_is_bounded() {
    let mut policy = Policy::default();
    policy.bundle.timeline_window_years = MAX_TIMELINE_WINDOW_YEARS;
    policy.validate().unwrap();
    policy.bundle.timeline_window_years = i32::MAX;
    assert!(matches!(policy.validate(), Err(Error::InvalidPolicy(_))));
  }

  #[test]
  fn missing_key_is_an_error() {
    let mut value = serde_json::to_value(Policy::default()).unwrap();
    value["triage"]
      .as_object_mut()
      .unwrap()
      .remove("pass_threshold");
    assert!(serde_json::from_value::<Policy>(value).is_err());
  }
}

//! Incident relevance, typing and location extraction for discovered items.

use std::sync::LazyLock;

use casefile_core::lead::IncidentType;
use regex::Regex;

/// Gate applied at ingestion: items matching none of these are not incidents.
static INCIDENT_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?i)(bodycam|body[\s-]?cam|dashcam|dash[\s-]?cam|officer[\s-]?involved|shooting|pursuit|chase|critical[\s-]?incident|use[\s-]?of[\s-]?force|arrest|homicide|domestic|dui|dwi|welfare[\s-]?check|missing|amber[\s-]?alert|murder|manslaughter|assault|robbery|kidnap|abduct|standoff|barricade|stabbing|fatal|killed|shot|weapon|gun|knife|hostage|fugitive|warrant|indictment|charged|convicted|sentenced|arraign|verdict)",
  )
  .expect("static regex")
});

/// Incident-type rules in precedence order; the first match wins.
static INCIDENT_RULES: LazyLock<Vec<(IncidentType, Regex)>> = LazyLock::new(|| {
  [
    (
      IncidentType::Shooting,
      r"shoot|shot|gunfire|firearm|officer.involved.shoot",
    ),
    (IncidentType::Pursuit, r"pursuit|chase|fleeing|elude|evade"),
    (IncidentType::Domestic, r"domestic|family.violence"),
    (IncidentType::Dui, r"\bdui\b|\bdwi\b|drunk.driv|impaired.driv"),
    (IncidentType::Assault, r"assault|attack|battery|stab"),
    (
      IncidentType::Homicide,
      r"homicide|murder|manslaughter|killed|fatal",
    ),
    (
      IncidentType::MissingPerson,
      r"missing|abduct|kidnap|amber.alert",
    ),
    (IncidentType::Theft, r"robbery|burglary|theft|stolen|carjack"),
    (
      IncidentType::UseOfForce,
      r"use.of.force|excessive.force|taser|tased",
    ),
    (
      IncidentType::WelfareCheck,
      r"welfare.check|mental.health|crisis",
    ),
    (IncidentType::Standoff, r"standoff|barricade|hostage|swat"),
  ]
  .into_iter()
  .map(|(label, pattern)| {
    (label, Regex::new(&format!("(?i){pattern}")).expect("static regex"))
  })
  .collect()
});

/// "in Mesa, AZ" / "near Fort Worth".
static LOCATION_PREPOSITION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\b(?:in|near)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*),?\s*([A-Z]{2}\b)?")
    .expect("static regex")
});

/// "Tempe Police" / "Pinal County".
static LOCATION_AGENCY: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\s+(?:Police|Sheriff|PD|County)")
    .expect("static regex")
});

pub fn is_incident_related(text: &str) -> bool { INCIDENT_KEYWORDS.is_match(text) }

pub fn classify_incident(text: &str) -> IncidentType {
  INCIDENT_RULES
    .iter()
    .find(|(_, re)| re.is_match(text))
    .map_or(IncidentType::Unknown, |(label, _)| *label)
}

/// Best-effort location from free text; `None` when no pattern applies.
pub fn extract_location(text: &str) -> Option<String> {
  if let Some(caps) = LOCATION_PREPOSITION.captures(text) {
    let place = caps.get(1)?.as_str();
    return Some(match caps.get(2) {
      Some(state) => format!("{place}, {}", state.as_str()),
      None => place.to_string(),
    });
  }
  LOCATION_AGENCY
    .captures(text)
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn relevance_gate() {
    assert!(is_incident_related("Deputies release body-cam video"));
    assert!(is_incident_related("Man SENTENCED for robbery"));
    assert!(!is_incident_related("City council approves new budget"));
  }

  #[test]
  fn first_matching_type_wins() {
    // "shot" precedes "killed" in the table.
    assert_eq!(
      classify_incident("Man shot and killed during standoff"),
      IncidentType::Shooting
    );
    assert_eq!(
      classify_incident("Driver fleeing police crashes"),
      IncidentType::Pursuit
    );
    assert_eq!(classify_incident("Arrested for DUI"), IncidentType::Dui);
    assert_eq!(classify_incident("Council meeting"), IncidentType::Unknown);
  }

  #[test]
  fn dui_requires_word_boundary() {
    assert_ne!(classify_incident("Conduit repairs"), IncidentType::Dui);
  }

  #[test]
  fn location_from_preposition_with_state() {
    assert_eq!(
      extract_location("Officer-involved shooting in Mesa, AZ on Friday").as_deref(),
      Some("Mesa, AZ")
    );
    assert_eq!(
      extract_location("Crash near Fort Worth").as_deref(),
      Some("Fort Worth")
    );
  }

  #[test]
  fn location_from_agency_name() {
    assert_eq!(
      extract_location("Tempe Police release footage").as_deref(),
      Some("Tempe")
    );
    assert_eq!(extract_location("no capitals here"), None);
  }
}

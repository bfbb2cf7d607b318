//! Jurisdiction registry: per-region agencies, courts and publishing
//! channels, loaded from static JSON.
//!
//! Scoring stages take an optional [`JurisdictionLookup`]. Without one they
//! skip every jurisdiction-specific bonus and score on the artifact alone.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Domains that host primary-source court and docket records.
pub const RECORDS_DOMAINS: &[&str] = &[
  "courtlistener.com",
  "unicourt.com",
  "pacermonitor.com",
  "law.justia.com",
  "casetext.com",
];

/// Domains that host 911 and dispatch audio.
pub const DISPATCH_DOMAINS: &[&str] = &["broadcastify.com", "openmhz.com"];

/// States whose public-records law makes footage comparatively easy to get.
pub const SUNSHINE_STATES: &[&str] = &["FL", "TX", "AZ", "WA", "OH", "GA", "UT"];

// ─── Registry data ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agency {
  pub name:                String,
  #[serde(default)]
  pub abbrev:              String,
  #[serde(default)]
  pub youtube:             Option<String>,
  #[serde(default)]
  pub transparency_portal: Option<String>,
  #[serde(default)]
  pub foia_portal:         Option<String>,
}

impl Agency {
  /// The short name used in queries: the abbreviation when present.
  pub fn query_name(&self) -> &str {
    if self.abbrev.is_empty() { &self.name } else { &self.abbrev }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Court {
  pub name:      String,
  #[serde(default)]
  pub website:   Option<String>,
  #[serde(default)]
  pub has_video: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
  pub name:           String,
  #[serde(default)]
  pub state:          String,
  #[serde(default)]
  pub agencies:       Vec<Agency>,
  #[serde(default)]
  pub courts:         Vec<Court>,
  #[serde(default)]
  pub search_domains: Vec<String>,
}

impl Region {
  /// Transparency and FOIA portal URLs of every agency.
  pub fn portals(&self) -> Vec<&str> {
    self
      .agencies
      .iter()
      .flat_map(|a| [a.transparency_portal.as_deref(), a.foia_portal.as_deref()])
      .flatten()
      .collect()
  }

  /// Agencies that publish on an official video channel.
  pub fn channel_agencies(&self) -> impl Iterator<Item = &Agency> {
    self.agencies.iter().filter(|a| a.youtube.is_some())
  }

  /// Local news domains, plus `youtube.com` when any agency publishes there.
  pub fn search_domains(&self) -> Vec<&str> {
    let mut domains: Vec<&str> = self.search_domains.iter().map(String::as_str).collect();
    if self.channel_agencies().next().is_some() && !domains.contains(&"youtube.com") {
      domains.push("youtube.com");
    }
    domains
  }

  pub fn is_sunshine_state(&self) -> bool {
    SUNSHINE_STATES
      .iter()
      .any(|s| s.eq_ignore_ascii_case(&self.state))
  }

  pub fn has_court_video(&self) -> bool { self.courts.iter().any(|c| c.has_video) }
}

// ─── Lookup capability ───────────────────────────────────────────────────────

/// Resolves a region id to its registry entry.
pub trait JurisdictionLookup {
  fn region(&self, region_id: &str) -> Option<&Region>;
}

/// Resolve `region_id` through an optional lookup.
pub fn resolve<'a>(
  lookup: Option<&'a dyn JurisdictionLookup>,
  region_id: Option<&str>,
) -> Option<&'a Region> {
  lookup.zip(region_id).and_then(|(l, id)| l.region(id))
}

/// An in-memory registry keyed by region id (e.g. `"SF"`, `"PHX"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JurisdictionRegistry {
  regions: BTreeMap<String, Region>,
}

impl JurisdictionRegistry {
  pub fn new(regions: BTreeMap<String, Region>) -> Result<Self> {
    for (id, region) in &regions {
      if id.trim().is_empty() {
        return Err(Error::InvalidRegistry("empty region id".into()));
      }
      if let Some(agency) = region.agencies.iter().find(|a| a.name.trim().is_empty()) {
        return Err(Error::InvalidRegistry(format!(
          "region {id}: agency with abbrev {:?} has no name",
          agency.abbrev
        )));
      }
    }
    Ok(Self { regions })
  }

  pub fn from_json(raw: &str) -> Result<Self> { Self::new(serde_json::from_str(raw)?) }

  pub fn len(&self) -> usize { self.regions.len() }

  pub fn is_empty(&self) -> bool { self.regions.is_empty() }
}

impl JurisdictionLookup for JurisdictionRegistry {
  fn region(&self, region_id: &str) -> Option<&Region> { self.regions.get(region_id) }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  pub(crate) const SAMPLE: &str = r#"{
    "PHX": {
      "name": "Phoenix",
      "state": "AZ",
      "agencies": [
        {
          "name": "Phoenix Police Department",
          "abbrev": "PHXPD",
          "youtube": "https://www.youtube.com/@PhoenixPolice",
          "transparency_portal": "https://www.phoenix.gov/police/critical-incidents",
          "foia_portal": "https://www.phoenix.gov/police/records"
        },
        { "name": "Maricopa County Sheriff", "abbrev": "MCSO" }
      ],
      "courts": [
        { "name": "Maricopa County Superior Court", "has_video": true }
      ],
      "search_domains": ["azcentral.com", "abc15.com"]
    },
    "SF": {
      "name": "San Francisco",
      "state": "CA",
      "courts": [{ "name": "San Francisco Superior Court" }]
    }
  }"#;

  pub(crate) fn sample() -> JurisdictionRegistry {
    JurisdictionRegistry::from_json(SAMPLE).unwrap()
  }

  #[test]
  fn loads_and_resolves_regions() {
    let registry = sample();
    assert_eq!(registry.len(), 2);
    assert!(!registry.is_empty());
    assert!(JurisdictionRegistry::from_json("{}").unwrap().is_empty());
    let phx = registry.region("PHX").unwrap();
    assert!(phx.is_sunshine_state());
    assert!(phx.has_court_video());
    assert_eq!(phx.portals().len(), 2);
    assert!(registry.region("NYC").is_none());
  }

  #[test]
  fn youtube_joins_search_domains_for_channel_agencies() {
    let registry = sample();
    assert_eq!(registry.region("PHX").unwrap().search_domains(), vec![
      "azcentral.com",
      "abc15.com",
      "youtube.com"
    ]);
    assert!(registry.region("SF").unwrap().search_domains().is_empty());
  }

  #[test]
  fn resolve_without_lookup_is_none() {
    let registry = sample();
    assert!(resolve(None, Some("PHX")).is_none());
    assert!(resolve(Some(&registry), None).is_none());
    assert!(resolve(Some(&registry), Some("PHX")).is_some());
  }

  #[test]
  fn unnamed_agency_is_rejected() {
    let raw = r#"{"X": {"name": "X", "agencies": [{"name": " ", "abbrev": "XPD"}]}}"#;
    assert!(matches!(
      JurisdictionRegistry::from_json(raw),
      Err(Error::InvalidRegistry(_))
    ));
  }
}

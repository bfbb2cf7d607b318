//! Search-result classifier: source class, artifact type, confidence and
//! publisher for one `(url, title, snippet)` triple.
//!
//! Pipeline:
//!   url + title + snippet
//!     └─ source signals  → (class, base confidence)
//!          └─ `.gov` override
//!               └─ type rules (first match wins)
//!                    └─ confidence adjustments → clamp → round
//!
//! Never fails. Input whose URL does not parse degrades to
//! `secondary / unknown` with an empty publisher.

use std::sync::LazyLock;

use casefile_core::{
  artifact::{ArtifactType, Classification, SourceClass},
  canonical::domain_of,
};
use regex::Regex;

use crate::round2;

// ─── Signals ─────────────────────────────────────────────────────────────────

/// Official-publisher tokens and the named aggregator channels that repost
/// agency footage unedited.
static PRIMARY_SIGNALS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?i)(police|sheriff|pd\b|\.gov|department|agency|county|district.attorney|da\.org|court|dps\.|highway.patrol|state.patrol|prosecutor|critical.incident|officer.involved|press.release|media.release|bodycam|body.worn.camera|dashcam|dash.camera|Law.Crime|Court.TV|Police.Activity|Real.World.Police|BodyCam.Central)",
  )
  .expect("static regex")
});

/// Tabloid, social and compilation tokens. Any hit forces secondary.
static SECONDARY_SIGNALS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?i)(daily.mail|tmz|insider|buzzfeed|reddit|tiktok|instagram|twitter\.com/|compilation|top.10|worst|best.of|react|commentary)",
  )
  .expect("static regex")
});

/// Channel bylines in video titles: "... by Channel" or "... - Channel".
static BYLINE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"by\s+([^|]+)|[-–]\s+([^|]+?)$").expect("static regex")
});

pub const VIDEO_PLATFORMS: &[&str] = &["youtube.com", "youtu.be", "vimeo.com"];

const PRIMARY_BASE: f64 = 0.8;
const SECONDARY_BASE: f64 = 0.3;
const NEUTRAL_BASE: f64 = 0.5;
const GOV_FLOOR: f64 = 0.9;
const KNOWN_TYPE_BONUS: f64 = 0.1;
const PLATFORM_BONUS: f64 = 0.05;
const PDF_DOCUMENT_FLOOR: f64 = 0.85;

// ─── Artifact-type table ─────────────────────────────────────────────────────

/// How a [`TypeRule`] decides whether it applies.
pub enum Matcher {
  /// The URL path ends with this (lowercase) suffix.
  UrlPathSuffix(&'static str),
  /// The pattern matches anywhere in `url title snippet`.
  Text(Regex),
}

pub struct TypeRule {
  pub label:   ArtifactType,
  pub matcher: Matcher,
}

fn text_rule(label: ArtifactType, pattern: &str) -> TypeRule {
  TypeRule {
    label,
    matcher: Matcher::Text(
      Regex::new(&format!("(?i){pattern}")).expect("static regex"),
    ),
  }
}

/// Artifact-type rules in precedence order; the first rule that applies wins.
///
/// | # | label | applies when |
/// |---|---|---|
/// | 1 | document | URL path is a PDF file |
/// | 2 | bodycam | `bodycam`, `body worn`, `bwc`, `body cam` |
/// | 3 | dashcam | `dashcam`, `dash cam`, `in car`, `cruiser` |
/// | 4 | court | `court`, `trial`, `hearing`, `sentencing`, `arraign`, `livestream` |
/// | 5 | interview | `interrogat`, `interview`, `confession` |
/// | 6 | press_video | `press conference`, `briefing`, `press release ... video` |
/// | 7 | document | `affidavit`, `complaint`, `indictment`, `warrant`, `docket`, `.pdf` |
/// | 8 | audio | `911 call`, `dispatch`, `scanner`, `radio`, `audio` |
///
/// Rule 1 comes first because a PDF is a document whatever footage its text
/// mentions.
pub static TYPE_RULES: LazyLock<Vec<TypeRule>> = LazyLock::new(|| {
  vec![
    TypeRule {
      label:   ArtifactType::Document,
      matcher: Matcher::UrlPathSuffix(".pdf"),
    },
    text_rule(ArtifactType::Bodycam, r"bodycam|body.worn|bwc|body.cam"),
    text_rule(ArtifactType::Dashcam, r"dashcam|dash.cam|in.car|cruiser"),
    text_rule(
      ArtifactType::Court,
      r"court|trial|hearing|sentencing|arraign|livestream",
    ),
    text_rule(ArtifactType::Interview, r"interrogat|interview|confession"),
    text_rule(
      ArtifactType::PressVideo,
      r"press.conference|briefing|press.release.*video",
    ),
    text_rule(
      ArtifactType::Document,
      r"affidavit|complaint|indictment|warrant|docket|\.pdf",
    ),
    text_rule(ArtifactType::Audio, r"911.call|dispatch|scanner|radio|audio"),
  ]
});

fn url_path_lower(url: &str) -> String {
  let without_fragment = url.split('#').next().unwrap_or_default();
  let path = without_fragment.split('?').next().unwrap_or_default();
  path.to_lowercase()
}

/// The first rule in [`TYPE_RULES`] that applies, or `unknown`.
pub fn artifact_type(url: &str, text: &str) -> ArtifactType {
  let path = url_path_lower(url);
  TYPE_RULES
    .iter()
    .find(|rule| match &rule.matcher {
      Matcher::UrlPathSuffix(suffix) => path.ends_with(suffix),
      Matcher::Text(re) => re.is_match(text),
    })
    .map_or(ArtifactType::Unknown, |rule| rule.label)
}

// ─── Classifier ──────────────────────────────────────────────────────────────

pub fn is_video_platform(domain: &str) -> bool {
  VIDEO_PLATFORMS
    .iter()
    .any(|p| domain == *p || domain.ends_with(&format!(".{p}")))
}

fn publisher(domain: &str, title: &str) -> String {
  if domain.contains(".gov") {
    return domain.to_string();
  }
  if is_video_platform(domain)
    && let Some(caps) = BYLINE.captures(title)
  {
    let byline = caps
      .get(1)
      .or_else(|| caps.get(2))
      .map(|m| m.as_str().trim())
      .unwrap_or_default();
    if !byline.is_empty() {
      return byline.to_string();
    }
  }
  domain.to_string()
}

/// Classify one search result.
pub fn classify(url: &str, title: &str, snippet: &str) -> Classification {
  let Some(domain) = domain_of(url) else {
    return Classification {
      source_class:  SourceClass::Secondary,
      artifact_type: ArtifactType::Unknown,
      confidence:    SECONDARY_BASE,
      publisher:     String::new(),
    };
  };

  let text = format!("{url} {title} {snippet}");
  let (mut source_class, mut confidence) = if SECONDARY_SIGNALS.is_match(&text) {
    (SourceClass::Secondary, SECONDARY_BASE)
  } else if PRIMARY_SIGNALS.is_match(&text) {
    (SourceClass::Primary, PRIMARY_BASE)
  } else {
    (SourceClass::Secondary, NEUTRAL_BASE)
  };

  if url.to_lowercase().contains(".gov") {
    source_class = SourceClass::Primary;
    confidence = confidence.max(GOV_FLOOR);
  }

  let artifact_type = artifact_type(url, &text);

  if artifact_type.is_known() {
    confidence += KNOWN_TYPE_BONUS;
  }
  if source_class == SourceClass::Primary && is_video_platform(&domain) {
    confidence += PLATFORM_BONUS;
  }
  if artifact_type == ArtifactType::Document && url.to_lowercase().contains(".pdf") {
    confidence = confidence.max(PDF_DOCUMENT_FLOOR);
  }
  let confidence = round2(confidence.clamp(0.0, 1.0));
  debug_assert!((0.0..=1.0).contains(&confidence));

  Classification {
    source_class,
    artifact_type,
    confidence,
    publisher: publisher(&domain, title),
  }
}

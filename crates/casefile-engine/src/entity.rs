//! Defendant and jurisdiction normalisation, and the entity-match factor.

use std::collections::BTreeSet;

use serde::Serialize;

const NAME_SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv", "esq"];

const STATE_NAMES: &[(&str, &str)] = &[
  ("ca", "california"),
  ("fl", "florida"),
  ("az", "arizona"),
  ("wa", "washington"),
  ("co", "colorado"),
  ("tx", "texas"),
  ("oh", "ohio"),
  ("ga", "georgia"),
  ("ut", "utah"),
];

const NAME_WEIGHT: f64 = 0.8;
const JURISDICTION_WEIGHT: f64 = 0.2;

/// Normalised matching material for one case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityProfile {
  /// First defendant, lowercased, suffixes removed.
  pub canonical:           String,
  pub last_name:           String,
  /// Name variants, longest first.
  pub variants:            Vec<String>,
  /// Name parts that must each appear for a full match. A hyphenated part
  /// is satisfied by any of its pieces. Initials are not units.
  pub name_units:          Vec<Vec<String>>,
  pub jurisdiction_tokens: Vec<String>,
}

/// Lowercase alphanumeric words of `text`.
pub fn words(text: &str) -> Vec<String> {
  text
    .split(|c: char| !c.is_alphanumeric())
    .filter(|w| !w.is_empty())
    .map(str::to_lowercase)
    .collect()
}

fn is_suffix(part: &str) -> bool { NAME_SUFFIXES.contains(&part.trim_end_matches('.')) }

fn jurisdiction_tokens(jurisdiction: &str) -> Vec<String> {
  let mut tokens = Vec::new();
  for part in jurisdiction.split(',') {
    let part = part.trim().to_lowercase();
    if part.is_empty() {
      continue;
    }
    let expanded = STATE_NAMES
      .iter()
      .find(|(abbrev, _)| *abbrev == part)
      .map(|(_, name)| name.to_string());
    tokens.push(part);
    tokens.extend(expanded);
  }
  tokens
}

pub fn normalize_entity(defendant: &str, jurisdiction: &str) -> EntityProfile {
  let primary = defendant.split(',').next().unwrap_or_default().trim();
  let canonical_input = primary.to_lowercase();
  let parts: Vec<&str> = canonical_input
    .split_whitespace()
    .filter(|p| !is_suffix(p))
    .collect();

  let jurisdiction_tokens = jurisdiction_tokens(jurisdiction);
  let Some(&last) = parts.last() else {
    return EntityProfile { jurisdiction_tokens, ..EntityProfile::default() };
  };
  let last = last.trim_end_matches('.');
  let first = (parts.len() > 1).then(|| parts[0].trim_end_matches('.'));
  let middle = if parts.len() > 2 { parts.get(1).copied() } else { None };

  let mut variants = BTreeSet::new();
  variants.insert(parts.join(" "));
  variants.insert(last.to_string());
  if let Some(first) = first {
    variants.insert(format!("{first} {last}"));
    variants.insert(format!("{last} {first}"));
    if let Some(initial) = first.chars().next() {
      variants.insert(format!("{initial} {last}"));
    }
    if let Some(m) = middle.and_then(|m| m.chars().next()) {
      variants.insert(format!("{first} {m} {last}"));
    }
  }
  if last.contains('-') {
    for piece in last.split('-').filter(|p| !p.is_empty()) {
      variants.insert(piece.to_string());
      if let Some(first) = first {
        variants.insert(format!("{first} {piece}"));
      }
    }
  }
  variants.retain(|v| !v.is_empty());
  // Variants are matched against word-split text, so normalise them the
  // same way.
  let mut variants: Vec<String> = variants
    .into_iter()
    .map(|v| words(&v).join(" "))
    .filter(|v| !v.is_empty())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect();
  variants.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

  let name_units = parts
    .iter()
    .map(|p| words(p))
    .filter(|unit| !(unit.len() == 1 && unit[0].chars().count() == 1))
    .filter(|unit| !unit.is_empty())
    .collect();

  EntityProfile {
    canonical: parts.join(" "),
    last_name: last.to_string(),
    variants,
    name_units,
    jurisdiction_tokens,
  }
}

fn contains_phrase(haystack: &[String], phrase: &[String]) -> bool {
  !phrase.is_empty() && haystack.windows(phrase.len()).any(|w| w == phrase)
}

/// Name/jurisdiction overlap between a profile and free text, in `[0, 1]`.
///
/// A multi-word variant appearing as a phrase counts as a full name match;
/// otherwise the name part is the fraction of name units present.
pub fn entity_match(profile: &EntityProfile, text: &str) -> f64 {
  let tokens = words(text);
  if tokens.is_empty() {
    return 0.0;
  }
  let token_set: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();

  let phrase_hit = profile
    .variants
    .iter()
    .map(|v| words(v))
    .filter(|v| v.len() > 1)
    .any(|v| contains_phrase(&tokens, &v));
  let name_ratio = if phrase_hit {
    1.0
  } else if profile.name_units.is_empty() {
    0.0
  } else {
    let matched = profile
      .name_units
      .iter()
      .filter(|unit| unit.iter().any(|piece| token_set.contains(piece.as_str())))
      .count();
    matched as f64 / profile.name_units.len() as f64
  };

  let jurisdiction_hit = profile.jurisdiction_tokens.iter().any(|tok| {
    let tok_words = words(tok);
    !tok_words.is_empty() && tok_words.iter().all(|w| token_set.contains(w.as_str()))
  });

  NAME_WEIGHT * name_ratio + if jurisdiction_hit { JURISDICTION_WEIGHT } else { 0.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_suffixes_and_takes_first_defendant() {
    let p = normalize_entity("John A. Smith Jr., Bob Roe", "Phoenix, AZ");
    assert_eq!(p.canonical, "john a. smith");
    assert_eq!(p.last_name, "smith");
    assert!(p.variants.contains(&"j smith".to_string()));
    assert!(p.variants.contains(&"john a smith".to_string()));
    assert_eq!(p.name_units, vec![vec!["john".to_string()], vec!["smith".to_string()]]);
    assert_eq!(p.jurisdiction_tokens, vec!["phoenix", "az", "arizona"]);
  }

  #[test]
  fn variants_are_longest_first() {
    let p = normalize_entity("Maria Lopez", "");
    let lens: Vec<usize> = p.variants.iter().map(String::len).collect();
    let mut sorted = lens.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(lens, sorted);
  }

  #[test]
  fn middle_initial_tolerated() {
    let p = normalize_entity("John A. Smith", "Phoenix, AZ");
    let full = entity_match(&p, "Bodycam shows John Smith arrest in Phoenix");
    assert!((full - 1.0).abs() < 1e-9);
    let initial = entity_match(&p, "J. Smith booked");
    assert!((initial - 0.8).abs() < 1e-9);
  }

  #[test]
  fn partial_and_absent_names() {
    let p = normalize_entity("John Smith", "Mesa");
    assert!((entity_match(&p, "smith case update") - 0.4).abs() < 1e-9);
    assert!((entity_match(&p, "mesa police news") - 0.2).abs() < 1e-9);
    assert_eq!(entity_match(&p, ""), 0.0);
  }

  #[test]
  fn hyphenated_surname_matches_either_piece() {
    let p = normalize_entity("Jane Doe-Ray", "");
    assert!(p.variants.contains(&"jane ray".to_string()));
    assert!((entity_match(&p, "Jane Ray trial begins") - 0.8).abs() < 1e-9);
    assert!((entity_match(&p, "Ray trial begins") - 0.4).abs() < 1e-9);
  }

  #[test]
  fn multi_word_jurisdiction_needs_all_words() {
    let p = normalize_entity("", "Fort Worth, TX");
    assert!((entity_match(&p, "fort worth police") - 0.2).abs() < 1e-9);
    assert_eq!(entity_match(&p, "fort lauderdale police"), 0.0);
  }
}

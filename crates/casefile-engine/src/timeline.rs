//! Timeline fit: how well the years an artifact mentions line up with the
//! incident year.

use std::sync::LazyLock;

use regex::Regex;

static YEAR: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("static regex"));

/// No usable date signal. Deliberately above a contradicting date.
pub const NEUTRAL_FIT: f64 = 0.5;

pub fn extract_years(text: &str) -> Vec<i32> {
  YEAR
    .captures_iter(text)
    .filter_map(|c| c.get(1)?.as_str().parse().ok())
    .collect()
}

/// Fit of a single year against the incident year, in `[0, 1]`.
///
/// | offset from incident | fit |
/// |---|---|
/// | earlier than `window` years before | 0.1 |
/// | up to `window` years before | 0.3 |
/// | same year up to `window` years after | 1.0 |
/// | up to two years past the window | 0.7 |
/// | later | 0.4 |
pub fn year_fit(year: i32, incident_year: i32, window: i32) -> f64 {
  let diff = i64::from(year) - i64::from(incident_year);
  let window = i64::from(window);
  if diff < -window {
    0.1
  } else if diff < 0 {
    0.3
  } else if diff <= window {
    1.0
  } else if diff <= window + 2 {
    0.7
  } else {
    0.4
  }
}

/// Best fit over every year mentioned in `text`; [`NEUTRAL_FIT`] when the
/// text has no year or the incident year is unknown.
pub fn timeline_fit(text: &str, incident_year: Option<i32>, window: i32) -> f64 {
  let Some(incident_year) = incident_year else {
    return NEUTRAL_FIT;
  };
  extract_years(text)
    .into_iter()
    .map(|y| year_fit(y, incident_year, window))
    .fold(None, |best: Option<f64>, fit| Some(best.map_or(fit, |b| b.max(fit))))
    .unwrap_or(NEUTRAL_FIT)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_date_is_neutral_not_contradicting() {
    let none = timeline_fit("no dates here", Some(2022), 1);
    let contradicting = timeline_fit("archived 2015", Some(2022), 1);
    assert_eq!(none, NEUTRAL_FIT);
    assert!(none > contradicting);
  }

  #[test]
  fn unknown_incident_year_is_neutral() {
    assert_eq!(timeline_fit("March 2022", None, 1), NEUTRAL_FIT);
  }

  #[test]
  fn window_buckets() {
    assert_eq!(year_fit(2022, 2022, 1), 1.0);
    assert_eq!(year_fit(2023, 2022, 1), 1.0);
    assert_eq!(year_fit(2021, 2022, 1), 0.3);
    assert_eq!(year_fit(2019, 2022, 1), 0.1);
    assert_eq!(year_fit(2025, 2022, 1), 0.7);
    assert_eq!(year_fit(2030, 2022, 1), 0.4);
  }

  #[test]
  fn extreme_inputs_do_not_overflow() {
    assert_eq!(year_fit(2022, 2022, i32::MAX), 1.0);
    assert_eq!(year_fit(2022, i32::MIN, 1), 0.4);
    assert_eq!(year_fit(2022, i32::MAX, 1), 0.1);
  }

  #[test]
  fn best_year_wins() {
    assert_eq!(
      timeline_fit("filed 2019, footage released 2022", Some(2022), 1),
      1.0
    );
  }

  #[test]
  fn years_need_word_boundaries() {
    assert!(extract_years("id 120225 and 2022x").is_empty());
    assert_eq!(extract_years("/2023/05/story"), vec![2023]);
  }
}

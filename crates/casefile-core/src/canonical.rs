//! URL canonicalisation and deterministic id derivation.
//!
//! The canonical URL is the dedup key for leads: two discoveries of the same
//! page through different feeds must collapse onto one record.

use sha2::{Digest, Sha256};
use ::url::Url;

/// Query parameters that never change the identity of a page.
const TRACKING_PARAMS: &[&str] =
  &["fbclid", "gclid", "mc_cid", "mc_eid", "ref", "ref_src"];

/// Canonicalise `raw` into the dedup key.
///
/// Lowercases scheme and host, strips `www.`, default ports, fragments,
/// tracking parameters and the trailing slash, and sorts the remaining query
/// pairs. Input that does not parse as an absolute URL falls back to its
/// trimmed, lowercased form so dirty data still dedupes against itself.
pub fn canonical_url(raw: &str) -> String {
  let trimmed = raw.trim();
  let Ok(mut parsed) = Url::parse(trimmed) else {
    return trimmed.to_lowercase();
  };
  if parsed.host_str().is_none() {
    return trimmed.to_lowercase();
  }

  parsed.set_fragment(None);

  if let Some(host) = parsed.host_str().map(str::to_lowercase)
    && let Some(bare) = host.strip_prefix("www.")
  {
    let bare = bare.to_string();
    // set_host only fails for cannot-be-a-base URLs, excluded above.
    let _ = parsed.set_host(Some(&bare));
  }

  let default_port = matches!(
    (parsed.scheme(), parsed.port()),
    ("http", Some(80)) | ("https", Some(443))
  );
  if default_port {
    let _ = parsed.set_port(None);
  }

  let path = parsed.path().trim_end_matches('/').to_string();
  if !path.is_empty() && path != parsed.path() {
    parsed.set_path(&path);
  }

  let mut pairs: Vec<(String, String)> = parsed
    .query_pairs()
    .filter(|(k, _)| {
      let k = k.to_lowercase();
      !k.starts_with("utm_") && !TRACKING_PARAMS.contains(&k.as_str())
    })
    .map(|(k, v)| (k.into_owned(), v.into_owned()))
    .collect();
  pairs.sort();

  if pairs.is_empty() {
    parsed.set_query(None);
  } else {
    parsed.query_pairs_mut().clear().extend_pairs(pairs);
  }

  // The bare root still renders as "/".
  let mut out = parsed.to_string();
  if out.ends_with('/') && parsed.query().is_none() {
    out.pop();
  }
  out
}

/// The bare host of `raw` (lowercase, no `www.`), or `None` when `raw` is not
/// an absolute URL.
pub fn domain_of(raw: &str) -> Option<String> {
  let parsed = Url::parse(raw.trim()).ok()?;
  let host = parsed.host_str()?.to_lowercase();
  Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// First 16 hex characters of the SHA-256 digest of `input`.
pub fn short_hash(input: &str) -> String {
  let digest = Sha256::digest(input.as_bytes());
  hex::encode(digest)[..16].to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_noise_from_url() {
    let raw = "HTTPS://WWW.Example.com:443/news/story/?utm_source=rss&b=2&a=1#top";
    assert_eq!(canonical_url(raw), "https://example.com/news/story?a=1&b=2");
  }

  #[test]
  fn trailing_slash_removed_before_query() {
    assert_eq!(
      canonical_url("https://example.com/story/?id=1"),
      canonical_url("https://example.com/story?id=1")
    );
    assert_eq!(canonical_url("https://example.com/?id=1"), "https://example.com/?id=1");
  }

  #[test]
  fn trailing_slash_removed_without_query() {
    assert_eq!(
      canonical_url("https://example.com/video/"),
      "https://example.com/video"
    );
    assert_eq!(canonical_url("https://example.com/"), "https://example.com");
  }

  #[test]
  fn variants_collapse_to_one_key() {
    let a = canonical_url("https://www.youtube.com/watch?v=abc&utm_medium=x");
    let b = canonical_url("https://youtube.com/watch?v=abc");
    assert_eq!(a, b);
  }

  #[test]
  fn malformed_falls_back_to_lowercase() {
    assert_eq!(canonical_url("  Not A URL "), "not a url");
    assert_eq!(domain_of("not a url"), None);
  }

  #[test]
  fn domain_strips_www() {
    assert_eq!(
      domain_of("https://www.CSPD.gov/release.pdf").as_deref(),
      Some("cspd.gov")
    );
  }

  #[test]
  fn short_hash_is_stable() {
    assert_eq!(short_hash("abc"), short_hash("abc"));
    assert_eq!(short_hash("abc").len(), 16);
    assert_ne!(short_hash("abc"), short_hash("abd"));
  }
}

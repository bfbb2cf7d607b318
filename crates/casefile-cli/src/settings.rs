//! Loading the policy and the jurisdiction registry.

use std::path::Path;

use anyhow::Context as _;
use casefile_core::policy::Policy;
use casefile_engine::jurisdiction::JurisdictionRegistry;
use config::{Config, Environment, File};
use tracing::{info, warn};

const DEFAULT_CONFIG: &str = "casefile.toml";

/// Defaults, then the TOML file, then `CASEFILE_*` variables. The result is
/// validated before it is returned.
pub fn load_policy(path: Option<&Path>) -> anyhow::Result<Policy> {
  let defaults =
    Config::try_from(&Policy::default()).context("failed to encode default policy")?;
  let file = match path {
    Some(path) => File::from(path).required(true),
    None => File::with_name(DEFAULT_CONFIG).required(false),
  };

  let settings = Config::builder()
    .add_source(defaults)
    .add_source(file)
    .add_source(
      Environment::with_prefix("CASEFILE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read policy configuration")?;

  let policy: Policy = settings
    .try_deserialize()
    .context("failed to deserialise Policy")?;
  policy.validate().context("policy failed validation")?;
  Ok(policy)
}

pub fn load_registry(path: &Path) -> anyhow::Result<JurisdictionRegistry> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading jurisdiction registry {}", path.display()))?;
  let registry = JurisdictionRegistry::from_json(&raw)
    .with_context(|| format!("parsing jurisdiction registry {}", path.display()))?;
  if registry.is_empty() {
    warn!(path = %path.display(), "jurisdiction registry has no regions");
  } else {
    info!(regions = registry.len(), "loaded jurisdiction registry");
  }
  Ok(registry)
}

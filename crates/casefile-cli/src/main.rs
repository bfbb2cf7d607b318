//! `casefile`: drives each pipeline stage against the lead store.
//!
//! # Usage
//!
//! ```text
//! casefile ingest candidates.jsonl --region PHX
//! casefile triage --limit 50
//! casefile forward
//! casefile hunt <lead_id> results.jsonl
//! casefile score <lead_id> --defendant "John Smith" --jurisdiction "Phoenix, AZ" --year 2023
//! casefile report --top 20
//! ```
//!
//! Policy is read from the defaults, then `--config`, then `CASEFILE_*`
//! environment variables (`CASEFILE_TRIAGE__PASS_THRESHOLD=75`).

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use commands::Ctx;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "casefile", version, about = "Lead triage, artifact hunt and bundle scoring")]
struct Cli {
  /// Path to a TOML policy file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// SQLite database holding leads, artifacts and score history.
  #[arg(long, value_name = "PATH", default_value = "data/pipeline.db")]
  db: PathBuf,

  /// JSON jurisdiction registry keyed by region id.
  #[arg(long, value_name = "FILE")]
  jurisdictions: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Classify one search result and print the verdict as JSON.
  Classify {
    #[arg(long)]
    url:     String,
    #[arg(long, default_value = "")]
    title:   String,
    #[arg(long, default_value = "")]
    snippet: String,
  },
  /// Print the hook score and its bucket breakdown.
  Hook {
    #[arg(long)]
    title:   String,
    #[arg(long, default_value = "")]
    snippet: String,
  },
  /// Insert candidates from a JSONL file as NEW leads.
  Ingest {
    file:   PathBuf,
    /// Region used for the evidence pre-score.
    #[arg(long)]
    region: Option<String>,
  },
  /// Triage NEW leads into PASS / MAYBE / KILL.
  Triage {
    #[arg(long)]
    limit:   Option<usize>,
    #[arg(long)]
    dry_run: bool,
  },
  /// Forward PASS (and routed MAYBE) leads to the artifact hunt.
  Forward {
    #[arg(long)]
    limit:   Option<usize>,
    #[arg(long)]
    dry_run: bool,
  },
  /// Print the hunt query plan for a lead.
  Queries {
    lead_id: String,
    #[arg(long)]
    region:  Option<String>,
  },
  /// Classify search results for a HUNTING lead and resolve the hunt.
  Hunt {
    lead_id: String,
    results: PathBuf,
  },
  /// Bundle-score a lead's artifacts against case metadata.
  Score {
    lead_id:      String,
    #[arg(long)]
    defendant:    String,
    #[arg(long)]
    jurisdiction: String,
    #[arg(long)]
    year:         Option<String>,
    #[arg(long)]
    region:       Option<String>,
  },
  /// Move an ARTIFACT_FOUND lead through packaging.
  Advance {
    lead_id: String,
    /// approved, packaged or rendered.
    target:  String,
  },
  /// Missed-opportunity report over NO_ARTIFACT leads.
  Report {
    #[arg(long, default_value_t = 20)]
    top:  usize,
    #[arg(long)]
    json: bool,
  },
  /// Print a lead with its artifacts, transitions and score runs.
  Show { lead_id: String },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  // Pure commands need neither policy nor store.
  match &cli.command {
    Command::Classify { url, title, snippet } => {
      return commands::print_json(&casefile_engine::classify::classify(url, title, snippet));
    }
    Command::Hook { title, snippet } => {
      return commands::print_json(&casefile_engine::hook::breakdown(title, snippet));
    }
    _ => {}
  }

  let policy = settings::load_policy(cli.config.as_deref())?;
  let registry = cli
    .jurisdictions
    .as_deref()
    .map(settings::load_registry)
    .transpose()?;

  if let Some(parent) = cli.db.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating database directory {}", parent.display()))?;
  }
  let store = casefile_store_sqlite::SqliteStore::open(&cli.db)
    .await
    .with_context(|| format!("failed to open store at {}", cli.db.display()))?;

  let ctx = Ctx { store, policy, registry };

  match cli.command {
    Command::Classify { .. } | Command::Hook { .. } => Ok(()),
    Command::Ingest { file, region } => commands::ingest::run(&ctx, &file, region.as_deref()).await,
    Command::Triage { limit, dry_run } => commands::triage::run(&ctx, limit, dry_run).await,
    Command::Forward { limit, dry_run } => commands::forward::run(&ctx, limit, dry_run).await,
    Command::Queries { lead_id, region } => {
      commands::hunt::queries(&ctx, &lead_id, region.as_deref()).await
    }
    Command::Hunt { lead_id, results } => commands::hunt::run(&ctx, &lead_id, &results).await,
    Command::Score { lead_id, defendant, jurisdiction, year, region } => {
      let case = casefile_core::case::CaseMetadata {
        defendant,
        jurisdiction,
        incident_year: year.as_deref().and_then(|y| y.trim().parse().ok()),
        region_id: region,
      };
      commands::score::run(&ctx, &lead_id, case).await
    }
    Command::Advance { lead_id, target } => commands::score::advance(&ctx, &lead_id, &target).await,
    Command::Report { top, json } => commands::report::run(&ctx, top, json).await,
    Command::Show { lead_id } => commands::report::show(&ctx, &lead_id).await,
  }
}

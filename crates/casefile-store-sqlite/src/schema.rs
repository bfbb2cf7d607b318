//! SQL schema for the casefile SQLite store.
//!
//! Executed at connection startup. Migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per canonical URL. Rows are updated in place by status
-- transitions and never deleted.
CREATE TABLE IF NOT EXISTS leads (
    lead_id           TEXT PRIMARY KEY,
    url               TEXT NOT NULL UNIQUE,  -- canonical URL
    source_url        TEXT NOT NULL,
    title             TEXT NOT NULL,
    description       TEXT NOT NULL,
    source_id         TEXT,
    published_at      TEXT,
    duration_sec      INTEGER,
    transcript_text   TEXT,
    entities          TEXT NOT NULL DEFAULT '{}',  -- JSON
    audio_quality     TEXT NOT NULL DEFAULT 'unknown',
    location          TEXT,
    incident_type     TEXT NOT NULL DEFAULT 'unknown',
    risk_flags        TEXT NOT NULL DEFAULT '[]',  -- JSON array
    hook_score        INTEGER NOT NULL,
    evidence_prescore INTEGER NOT NULL DEFAULT 0,
    model_score       INTEGER,
    suggested_status  TEXT,
    triage_score      INTEGER,
    rationale         TEXT,
    status            TEXT NOT NULL DEFAULT 'NEW',
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    CHECK (hook_score BETWEEN 0 AND 100)
);

-- Strictly append-only.
CREATE TABLE IF NOT EXISTS transitions (
    transition_id TEXT PRIMARY KEY,
    lead_id       TEXT NOT NULL REFERENCES leads(lead_id),
    from_status   TEXT NOT NULL,
    to_status     TEXT NOT NULL,
    score         INTEGER,
    rationale     TEXT NOT NULL,
    recorded_at   TEXT NOT NULL
);

-- Back-reference from a lead to its artifact hunt. At most one per lead.
CREATE TABLE IF NOT EXISTS promotions (
    promotion_id TEXT PRIMARY KEY,
    lead_id      TEXT NOT NULL REFERENCES leads(lead_id),
    from_status  TEXT NOT NULL,
    score        INTEGER NOT NULL,
    recorded_at  TEXT NOT NULL,
    UNIQUE (lead_id)
);

CREATE TABLE IF NOT EXISTS artifacts (
    artifact_id   TEXT PRIMARY KEY,
    lead_id       TEXT NOT NULL REFERENCES leads(lead_id),
    artifact_type TEXT NOT NULL,
    url           TEXT NOT NULL,
    title         TEXT NOT NULL,
    publisher     TEXT NOT NULL,
    source_class  TEXT NOT NULL,   -- 'primary' | 'secondary'
    confidence    REAL NOT NULL,
    notes         TEXT NOT NULL,
    UNIQUE (lead_id, url),
    CHECK  (confidence BETWEEN 0.0 AND 1.0)
);

-- One row per bundle scoring run; never updated.
CREATE TABLE IF NOT EXISTS score_runs (
    run_id       TEXT PRIMARY KEY,
    lead_id      TEXT NOT NULL REFERENCES leads(lead_id),
    case_id      TEXT NOT NULL,
    case_json    TEXT NOT NULL,
    score_json   TEXT NOT NULL,
    bundle_score REAL NOT NULL,
    tier         TEXT NOT NULL,
    scored_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS leads_status_idx       ON leads(status);
CREATE INDEX IF NOT EXISTS leads_hook_idx         ON leads(hook_score);
CREATE INDEX IF NOT EXISTS transitions_lead_idx   ON transitions(lead_id);
CREATE INDEX IF NOT EXISTS artifacts_lead_idx     ON artifacts(lead_id);
CREATE INDEX IF NOT EXISTS score_runs_lead_idx    ON score_runs(lead_id);

PRAGMA user_version = 1;
";

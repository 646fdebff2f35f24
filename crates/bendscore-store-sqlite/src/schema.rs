//! SQL schema for the bendscore SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS product_versions (
    id          TEXT PRIMARY KEY,
    product_id  TEXT NOT NULL,
    status      TEXT NOT NULL CHECK (status IN ('draft', 'published')),
    version     INTEGER NOT NULL DEFAULT 0 CHECK (version >= 0),
    fields_json TEXT NOT NULL,
    score_json  TEXT NOT NULL,
    created_by  TEXT NOT NULL,
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC
    updated_at  TEXT NOT NULL
);

-- At most one live draft per product.
CREATE UNIQUE INDEX IF NOT EXISTS product_versions_one_draft
    ON product_versions(product_id) WHERE status = 'draft';

-- Published version numbers are never reused.
CREATE UNIQUE INDEX IF NOT EXISTS product_versions_published_number
    ON product_versions(product_id, version) WHERE status = 'published';

CREATE TABLE IF NOT EXISTS product_field_evidence (
    id           TEXT PRIMARY KEY,
    version_id   TEXT NOT NULL REFERENCES product_versions(id),
    field_key    TEXT NOT NULL,
    source_type  TEXT NOT NULL
                 CHECK (source_type IN ('web_page', 'pdf', 'manual', 'other')),
    url          TEXT,
    quoted_text  TEXT,
    how_gathered TEXT,
    notes        TEXT,
    verified_by  TEXT NOT NULL,
    verified_at  TEXT NOT NULL,
    is_active    INTEGER NOT NULL DEFAULT 1,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS evidence_version_idx
    ON product_field_evidence(version_id);

PRAGMA user_version = 1;
";

//! SQL schema for the Carefile SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- The per-prisoner aggregate envelope. Created lazily on first write.
CREATE TABLE IF NOT EXISTS health_record (
    prisoner_number TEXT PRIMARY KEY,
    created_at      TEXT NOT NULL
);

-- Live current values, one row per (prisoner, field).
-- Replaced wholesale when the field changes (clear-and-replace).
CREATE TABLE IF NOT EXISTS field_value (
    prisoner_number TEXT NOT NULL REFERENCES health_record(prisoner_number),
    field           TEXT NOT NULL,
    value_int       INTEGER,
    value_text      TEXT,
    value_code      TEXT,
    value_json      TEXT,
    PRIMARY KEY (prisoner_number, field),
    CHECK ((value_int  IS NOT NULL) + (value_text IS NOT NULL)
         + (value_code IS NOT NULL) + (value_json IS NOT NULL) = 1)
);

-- The audit trail. Strictly append-only: no UPDATE or DELETE is ever issued
-- against this table in normal operation. history_id is monotonic with
-- creation order and is the tie-break for simultaneous writes.
-- merged_at / merged_from are reserved for prisoner-identity merges.
CREATE TABLE IF NOT EXISTS field_history (
    history_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    prisoner_number   TEXT NOT NULL,
    field             TEXT NOT NULL,
    value_int         INTEGER,
    value_text        TEXT,
    value_code        TEXT,
    value_json        TEXT,
    created_at        TEXT NOT NULL,
    created_by        TEXT NOT NULL,
    created_in_prison TEXT NOT NULL,
    merged_at         TEXT,
    merged_from       TEXT,
    CHECK ((value_int  IS NOT NULL) + (value_text IS NOT NULL)
         + (value_code IS NOT NULL) + (value_json IS NOT NULL) = 1)
);

-- The 'current pointer': one row per (prisoner, field), upserted in place on
-- every change. Never historized; field_history is the historical record.
CREATE TABLE IF NOT EXISTS field_metadata (
    prisoner_number      TEXT NOT NULL,
    field                TEXT NOT NULL,
    last_modified_at     TEXT NOT NULL,
    last_modified_by     TEXT NOT NULL,
    last_modified_prison TEXT NOT NULL,
    PRIMARY KEY (prisoner_number, field)
);

CREATE TABLE IF NOT EXISTS reference_data_domain (
    code           TEXT PRIMARY KEY,
    description    TEXT NOT NULL,
    list_sequence  INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL,
    created_by     TEXT NOT NULL,
    deactivated_at TEXT,
    deactivated_by TEXT
);

CREATE TABLE IF NOT EXISTS reference_data_code (
    id             TEXT PRIMARY KEY,    -- conventionally {domain}_{code}
    domain         TEXT NOT NULL REFERENCES reference_data_domain(code),
    code           TEXT NOT NULL,
    description    TEXT NOT NULL,
    list_sequence  INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL,
    created_by     TEXT NOT NULL,
    deactivated_at TEXT,
    deactivated_by TEXT,
    UNIQUE (domain, code)
);

CREATE INDEX IF NOT EXISTS field_history_prisoner_idx
    ON field_history(prisoner_number);
CREATE INDEX IF NOT EXISTS field_history_field_idx
    ON field_history(prisoner_number, field);
CREATE INDEX IF NOT EXISTS field_history_created_idx
    ON field_history(created_at);

PRAGMA user_version = 1;
";

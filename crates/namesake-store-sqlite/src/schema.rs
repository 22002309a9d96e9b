//! SQL schema for the namesake SQLite store.
//!
//! The `*_fold` columns hold lowercased copies of the searchable text so
//! query matching does not depend on SQLite's ASCII-only `lower()`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS contacts (
    contact_id     TEXT PRIMARY KEY,
    given          TEXT,
    additional     TEXT,
    family         TEXT,
    nickname       TEXT,
    file_as        TEXT,
    is_list        INTEGER NOT NULL DEFAULT 0,
    addresses      TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    phones         TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    full_name_fold TEXT NOT NULL,
    nickname_fold  TEXT,
    file_as_fold   TEXT
);

-- One row per address; position 0 is the primary address.
CREATE TABLE IF NOT EXISTS contact_emails (
    contact_id   TEXT NOT NULL REFERENCES contacts(contact_id) ON DELETE CASCADE,
    position     INTEGER NOT NULL,
    address      TEXT NOT NULL,
    address_fold TEXT NOT NULL,
    PRIMARY KEY (contact_id, position)
);

CREATE INDEX IF NOT EXISTS contact_emails_fold_idx ON contact_emails(address_fold);

PRAGMA user_version = 1;
";

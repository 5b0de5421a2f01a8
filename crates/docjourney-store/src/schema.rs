//! Database schema SQL.

/// The script cache table: at most one row per `root_url`.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documentation_scripts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    root_url TEXT NOT NULL UNIQUE,
    original_url TEXT NOT NULL,
    script_content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS ix_documentation_scripts_root_url
    ON documentation_scripts(root_url);
"#;

/// Refresh `updated_at` whenever a row's content columns change.
pub const TOUCH_TRIGGER_SQL: &str = r#"
CREATE TRIGGER IF NOT EXISTS documentation_scripts_touch
AFTER UPDATE OF root_url, original_url, script_content ON documentation_scripts
BEGIN
    UPDATE documentation_scripts
    SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
    WHERE id = new.id;
END;
"#;

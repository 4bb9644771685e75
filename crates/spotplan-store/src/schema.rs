//! Database schema SQL.

/// Spot records. The implicit rowid pins insertion order for listing.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS spots (
    id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    city TEXT NOT NULL,
    category TEXT NOT NULL,
    description TEXT,
    recommended_time_hours REAL NOT NULL CHECK (recommended_time_hours > 0),
    target_audience_json TEXT NOT NULL DEFAULT '[]',
    email TEXT NOT NULL,
    start_time TEXT,
    latitude REAL,
    longitude REAL,
    tags_json TEXT NOT NULL DEFAULT '[]',
    open_hours TEXT,
    entry_fee REAL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_spots_city ON spots(city);
"#;

use anyhow::Result;
use rusqlite::Connection;

use crate::db::repository::MetaRepo;

pub const SCHEMA_VERSION: &str = "1";

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS daily_records (
            mode         TEXT NOT NULL CHECK(mode IN ('daily','free')),
            day_index    INTEGER NOT NULL,
            completed    INTEGER NOT NULL DEFAULT 1,
            won          INTEGER NOT NULL,
            guess_count  INTEGER NOT NULL,
            recorded_at  TEXT DEFAULT (datetime('now')),
            PRIMARY KEY(mode, day_index)
        );

        CREATE TABLE IF NOT EXISTS stats_aggregate (
            mode                TEXT PRIMARY KEY CHECK(mode IN ('daily','free')),
            games_played        INTEGER NOT NULL DEFAULT 0,
            games_won           INTEGER NOT NULL DEFAULT 0,
            current_streak      INTEGER NOT NULL DEFAULT 0,
            max_streak          INTEGER NOT NULL DEFAULT 0,
            guess_distribution  TEXT NOT NULL DEFAULT '{}',
            version             INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS sessions (
            mode         TEXT PRIMARY KEY CHECK(mode IN ('daily','free')),
            day_index    INTEGER,
            target_code  TEXT NOT NULL,
            guesses      TEXT NOT NULL DEFAULT '[]',
            updated_at   TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;

    MetaRepo::set(conn, "schema_version", SCHEMA_VERSION)?;
    Ok(())
}

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{GameError, Result};
use crate::models::{DailyRecord, GameMode, StatsAggregate};

fn to_u32(value: i64, column: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| GameError::CorruptPersistedState(format!("{} out of range: {}", column, value)))
}

// ─── Daily records ───────────────────────────────────────────────────────────

pub struct RecordRepo;

impl RecordRepo {
    pub fn get(conn: &Connection, mode: GameMode, day_index: i64) -> Result<Option<DailyRecord>> {
        let row = conn
            .query_row(
                "SELECT day_index, completed, won, guess_count
                 FROM daily_records WHERE mode = ?1 AND day_index = ?2",
                params![mode.as_str(), day_index],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i32>(1)?,
                        row.get::<_, i32>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((day_index, completed, won, guess_count)) => Ok(Some(DailyRecord {
                day_index,
                completed: completed != 0,
                won: won != 0,
                guess_count: to_u32(guess_count, "guess_count")?,
            })),
        }
    }

    /// Inserts the record unless the day already has one. Returns whether a
    /// row was written.
    pub fn insert(conn: &Connection, mode: GameMode, record: &DailyRecord) -> Result<bool> {
        let changed = conn.execute(
            "INSERT OR IGNORE INTO daily_records (mode, day_index, completed, won, guess_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                mode.as_str(),
                record.day_index,
                record.completed as i32,
                record.won as i32,
                record.guess_count
            ],
        )?;
        Ok(changed == 1)
    }

    pub fn all(conn: &Connection, mode: GameMode) -> Result<Vec<DailyRecord>> {
        let mut stmt = conn.prepare(
            "SELECT day_index, completed, won, guess_count
             FROM daily_records WHERE mode = ?1 ORDER BY day_index",
        )?;

        let rows = stmt.query_map(params![mode.as_str()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i32>(1)?,
                row.get::<_, i32>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (day_index, completed, won, guess_count) = r?;
            result.push(DailyRecord {
                day_index,
                completed: completed != 0,
                won: won != 0,
                guess_count: to_u32(guess_count, "guess_count")?,
            });
        }
        Ok(result)
    }
}

// ─── Stats aggregate ─────────────────────────────────────────────────────────

pub struct AggregateRepo;

impl AggregateRepo {
    /// Version counter of the stored aggregate; 0 when none is stored.
    pub fn version(conn: &Connection, mode: GameMode) -> Result<i64> {
        let version = conn
            .query_row(
                "SELECT version FROM stats_aggregate WHERE mode = ?1",
                params![mode.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(version.unwrap_or(0))
    }

    pub fn load(conn: &Connection, mode: GameMode) -> Result<Option<StatsAggregate>> {
        let row = conn
            .query_row(
                "SELECT games_played, games_won, current_streak, max_streak, guess_distribution
                 FROM stats_aggregate WHERE mode = ?1",
                params![mode.as_str()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((played, won, current, max, distribution)) = row else {
            return Ok(None);
        };

        let guess_distribution = serde_json::from_str(&distribution).map_err(|e| {
            GameError::CorruptPersistedState(format!("guess distribution: {}", e))
        })?;
        let aggregate = StatsAggregate {
            games_played: to_u32(played, "games_played")?,
            games_won: to_u32(won, "games_won")?,
            current_streak: to_u32(current, "current_streak")?,
            max_streak: to_u32(max, "max_streak")?,
            guess_distribution,
        };
        if aggregate.games_won > aggregate.games_played {
            return Err(GameError::CorruptPersistedState(format!(
                "{} wins out of {} games",
                aggregate.games_won, aggregate.games_played
            )));
        }
        Ok(Some(aggregate))
    }

    /// Writes `aggregate` only if the stored version is still
    /// `expected_version`, bumping it by one. Returns whether it was written.
    pub fn store(
        conn: &Connection,
        mode: GameMode,
        aggregate: &StatsAggregate,
        expected_version: i64,
    ) -> Result<bool> {
        let distribution = serde_json::to_string(&aggregate.guess_distribution)
            .map_err(|e| GameError::CorruptPersistedState(e.to_string()))?;
        if expected_version == 0 {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO stats_aggregate
                    (mode, games_played, games_won, current_streak, max_streak, guess_distribution, version)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
                params![
                    mode.as_str(),
                    aggregate.games_played,
                    aggregate.games_won,
                    aggregate.current_streak,
                    aggregate.max_streak,
                    distribution
                ],
            )?;
            if inserted == 1 {
                return Ok(true);
            }
        }

        let changed = conn.execute(
            "UPDATE stats_aggregate SET
                games_played = ?2, games_won = ?3, current_streak = ?4,
                max_streak = ?5, guess_distribution = ?6, version = version + 1
             WHERE mode = ?1 AND version = ?7",
            params![
                mode.as_str(),
                aggregate.games_played,
                aggregate.games_won,
                aggregate.current_streak,
                aggregate.max_streak,
                distribution,
                expected_version
            ],
        )?;
        Ok(changed == 1)
    }
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub day_index: Option<i64>,
    pub target_code: String,
    pub guesses: Vec<String>,
}

pub struct SessionRepo;

impl SessionRepo {
    pub fn load(conn: &Connection, mode: GameMode) -> Result<Option<StoredSession>> {
        let row = conn
            .query_row(
                "SELECT day_index, target_code, guesses FROM sessions WHERE mode = ?1",
                params![mode.as_str()],
                |row| {
                    Ok((
                        row.get::<_, Option<i64>>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((day_index, target_code, guesses)) => {
                let guesses: Vec<String> = serde_json::from_str(&guesses).map_err(|e| {
                    GameError::CorruptPersistedState(format!("{} session guesses: {}", mode, e))
                })?;
                Ok(Some(StoredSession {
                    day_index,
                    target_code,
                    guesses,
                }))
            }
        }
    }

    pub fn save(conn: &Connection, mode: GameMode, session: &StoredSession) -> Result<()> {
        let guesses = serde_json::to_string(&session.guesses)
            .map_err(|e| GameError::CorruptPersistedState(e.to_string()))?;
        conn.execute(
            "INSERT INTO sessions (mode, day_index, target_code, guesses, updated_at)
             VALUES (?1, ?2, ?3, ?4, datetime('now'))
             ON CONFLICT(mode) DO UPDATE SET
                day_index = ?2, target_code = ?3, guesses = ?4, updated_at = datetime('now')",
            params![mode.as_str(), session.day_index, session.target_code, guesses],
        )?;
        Ok(())
    }

    pub fn delete(conn: &Connection, mode: GameMode) -> Result<()> {
        conn.execute("DELETE FROM sessions WHERE mode = ?1", params![mode.as_str()])?;
        Ok(())
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(GameError::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

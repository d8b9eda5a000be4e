//! Persisted daily results and the statistics derived from them.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::db::repository::{AggregateRepo, RecordRepo};
use crate::error::{GameError, Result};
use crate::models::{DailyRecord, GameMode, GameStatus, StatsAggregate};
use crate::session::GameSession;

/// Only daily play is scored.
const STATS_MODE: GameMode = GameMode::Daily;

pub struct StatsStore<'c> {
    conn: &'c Connection,
}

impl<'c> StatsStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Scores a finished daily session. Each day can be scored exactly once;
    /// later attempts fail with [`GameError::AlreadyRecorded`] and change
    /// nothing.
    pub fn record(&self, session: &GameSession) -> Result<StatsAggregate> {
        if session.mode() != STATS_MODE {
            return Err(GameError::NotRecordable(format!(
                "{} games do not count toward statistics",
                session.mode()
            )));
        }
        if !session.is_terminal() {
            return Err(GameError::NotRecordable("the game is still in progress".to_string()));
        }
        let day_index = session
            .day_index()
            .ok_or_else(|| GameError::NotRecordable("the session has no day".to_string()))?;

        let record = DailyRecord {
            day_index,
            completed: true,
            won: session.status() == GameStatus::Won,
            guess_count: session.guess_count() as u32,
        };

        // IMMEDIATE takes the write lock up front so the read-modify-write of
        // the aggregate below cannot interleave with another writer.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        if RecordRepo::get(&tx, STATS_MODE, day_index)?.is_some() {
            log::info!("Day {} already recorded; ignoring", day_index);
            return Err(GameError::AlreadyRecorded { day_index });
        }

        let expected_version = AggregateRepo::version(&tx, STATS_MODE)?;
        let mut aggregate = match AggregateRepo::load(&tx, STATS_MODE) {
            Ok(Some(found)) => found,
            Ok(None) => StatsAggregate::from_history(&load_history(&tx)),
            Err(GameError::CorruptPersistedState(reason)) => {
                log::warn!("Stored statistics are corrupt ({}); rebuilding from history", reason);
                StatsAggregate::from_history(&load_history(&tx))
            }
            Err(e) => return Err(e),
        };

        if !RecordRepo::insert(&tx, STATS_MODE, &record)? {
            return Err(GameError::AlreadyRecorded { day_index });
        }
        let previous = match RecordRepo::get(&tx, STATS_MODE, day_index - 1) {
            Ok(found) => found,
            Err(GameError::CorruptPersistedState(reason)) => {
                log::warn!(
                    "Record for day {} is unreadable ({}); not extending the streak",
                    day_index - 1,
                    reason
                );
                None
            }
            Err(e) => return Err(e),
        };
        aggregate.apply(&record, previous.as_ref());

        if !AggregateRepo::store(&tx, STATS_MODE, &aggregate, expected_version)? {
            return Err(GameError::Storage(rusqlite::Error::StatementChangedRows(0)));
        }
        tx.commit()?;

        log::info!(
            "Recorded day {}: {} in {} guesses (streak {})",
            day_index,
            if record.won { "won" } else { "lost" },
            record.guess_count,
            aggregate.current_streak
        );
        Ok(aggregate)
    }

    /// Current statistics. Never fails: unreadable state is logged and
    /// rebuilt from history, or treated as no history at all.
    pub fn aggregate(&self) -> StatsAggregate {
        match AggregateRepo::load(self.conn, STATS_MODE) {
            Ok(Some(found)) => found,
            Ok(None) => StatsAggregate::from_history(&self.history()),
            Err(e) => {
                log::warn!("Could not read statistics ({}); rebuilding from history", e);
                StatsAggregate::from_history(&self.history())
            }
        }
    }

    /// Every scored day, oldest first. Empty if the history is unreadable.
    pub fn history(&self) -> Vec<DailyRecord> {
        load_history(self.conn)
    }

    pub fn is_recorded(&self, day_index: i64) -> bool {
        matches!(RecordRepo::get(self.conn, STATS_MODE, day_index), Ok(Some(_)))
    }
}

fn load_history(conn: &Connection) -> Vec<DailyRecord> {
    RecordRepo::all(conn, STATS_MODE).unwrap_or_else(|e| {
        log::warn!("Could not read game history ({}); treating it as empty", e);
        Vec::new()
    })
}

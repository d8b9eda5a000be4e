//! The engine the presentation layer talks to: one live session per mode,
//! persisted after every change, with finished daily games scored into
//! [`StatsStore`].
//!
//! `Game` owns the database connection, which makes it the single writer
//! for sessions and statistics.

pub mod share;

use chrono::NaiveDate;
use rand::Rng;
use rusqlite::Connection;

use crate::catalog::CountryCatalog;
use crate::config::{DuplicateGuessPolicy, GameConfig};
use crate::db::repository::{SessionRepo, StoredSession};
use crate::error::{GameError, Result};
use crate::models::{CountryRecord, DailyRecord, GameMode, Guess, StatsAggregate};
use crate::seed::DailySeed;
use crate::session::GameSession;
use crate::stats::StatsStore;

pub struct Game {
    conn: Connection,
    catalog: CountryCatalog,
    seed: DailySeed,
    policy: DuplicateGuessPolicy,
    today: i64,
    daily: GameSession,
    free: GameSession,
}

impl Game {
    /// Restores both sessions from storage, discarding a daily session left
    /// over from an earlier day and anything that no longer replays cleanly.
    pub fn open(
        conn: Connection,
        catalog: CountryCatalog,
        config: &GameConfig,
        today: NaiveDate,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let seed = DailySeed::new(config.epoch);
        let today = seed.daily_index(today);
        let policy = config.duplicate_guesses;

        let daily_target = seed.select_country(today, &catalog).clone();
        let daily = GameSession::start(GameMode::Daily, daily_target, Some(today))
            .with_duplicate_policy(policy);
        let free_target = seed.select_random_country(&catalog, None, rng).clone();
        let free = GameSession::start(GameMode::Free, free_target, None).with_duplicate_policy(policy);

        let mut game = Self {
            conn,
            catalog,
            seed,
            policy,
            today,
            daily,
            free,
        };

        for mode in GameMode::all() {
            match game.load_session(mode) {
                Ok(Some(session)) => *game.slot(mode) = session,
                Ok(None) => {}
                Err(e) => log::warn!("Discarding stored {} session: {}", mode, e),
            }
            game.persist(game.session(mode))?;
        }

        // A daily game may have finished without its result being stored.
        game.record_daily();
        Ok(game)
    }

    fn load_session(&self, mode: GameMode) -> Result<Option<GameSession>> {
        let Some(stored) = SessionRepo::load(&self.conn, mode)? else {
            return Ok(None);
        };

        if mode == GameMode::Daily && stored.day_index != Some(self.today) {
            log::info!(
                "Daily session from day {:?} expired; starting day {}",
                stored.day_index,
                self.today
            );
            return Ok(None);
        }

        let target = self.catalog.get(&stored.target_code).cloned().ok_or_else(|| {
            GameError::CorruptPersistedState(format!("unknown target '{}'", stored.target_code))
        })?;
        if mode == GameMode::Daily && target.code != self.daily.target().code {
            return Err(GameError::CorruptPersistedState(format!(
                "stored daily target {} does not match today's puzzle",
                target.code
            )));
        }

        let session = GameSession::restore(
            mode,
            target,
            stored.day_index,
            &stored.guesses,
            &self.catalog,
            self.policy,
        )?;
        log::debug!("Restored {} session with {} guesses", mode, session.guess_count());
        Ok(Some(session))
    }

    fn slot(&mut self, mode: GameMode) -> &mut GameSession {
        match mode {
            GameMode::Daily => &mut self.daily,
            GameMode::Free => &mut self.free,
        }
    }

    fn persist(&self, session: &GameSession) -> Result<()> {
        SessionRepo::save(
            &self.conn,
            session.mode(),
            &StoredSession {
                day_index: session.day_index(),
                target_code: session.target().code.clone(),
                guesses: session.guess_codes(),
            },
        )
    }

    /// Stores `session` and only then makes it the live one, so a failed
    /// write leaves memory and storage in agreement.
    fn replace(&mut self, session: GameSession) -> Result<&GameSession> {
        self.persist(&session)?;
        let mode = session.mode();
        let slot = self.slot(mode);
        *slot = session;
        Ok(&*slot)
    }

    fn daily_session_for(&self, day: i64) -> GameSession {
        let target = self.seed.select_country(day, &self.catalog).clone();
        GameSession::start(GameMode::Daily, target, Some(day)).with_duplicate_policy(self.policy)
    }

    /// Scores the daily session if it has finished. Failures are logged;
    /// the next [`Game::open`] retries.
    fn record_daily(&self) {
        if !self.daily.is_terminal() {
            return;
        }
        match StatsStore::new(&self.conn).record(&self.daily) {
            Ok(_) => {}
            Err(GameError::AlreadyRecorded { day_index }) => {
                log::debug!("Day {} was already scored", day_index);
            }
            Err(e) => log::warn!("Could not record daily result: {}", e),
        }
    }

    pub fn session(&self, mode: GameMode) -> &GameSession {
        match mode {
            GameMode::Daily => &self.daily,
            GameMode::Free => &self.free,
        }
    }

    pub fn catalog(&self) -> &CountryCatalog {
        &self.catalog
    }

    pub fn seed(&self) -> &DailySeed {
        &self.seed
    }

    pub fn today(&self) -> i64 {
        self.today
    }

    /// Starts `mode` over: today's puzzle for daily play, a new random
    /// country for free play.
    pub fn start(&mut self, mode: GameMode, rng: &mut impl Rng) -> Result<&GameSession> {
        match mode {
            GameMode::Daily => self.start_daily(),
            GameMode::Free => self.generate_new_country(rng),
        }
    }

    /// Puts today's puzzle in the daily slot, replacing whatever was there.
    pub fn start_daily(&mut self) -> Result<&GameSession> {
        let session = self.daily_session_for(self.today);
        self.replace(session)
    }

    /// Moves the game to `date`. A new day starts a new daily session; the
    /// same day leaves everything alone.
    pub fn roll_over(&mut self, date: NaiveDate) -> Result<bool> {
        let day = self.seed.daily_index(date);
        if day == self.today {
            return Ok(false);
        }
        log::info!("Day changed from {} to {}", self.today, day);
        let session = self.daily_session_for(day);
        self.replace(session)?;
        self.today = day;
        Ok(true)
    }

    /// Picks a new random free-play target, different from the current one
    /// when possible, and starts over with no guesses.
    pub fn generate_new_country(&mut self, rng: &mut impl Rng) -> Result<&GameSession> {
        let current = self.free.target().code.clone();
        let target: CountryRecord = self
            .seed
            .select_random_country(&self.catalog, Some(&current), rng)
            .clone();
        log::debug!("New free-play target drawn");
        let session = GameSession::start(GameMode::Free, target, None).with_duplicate_policy(self.policy);
        self.replace(session)
    }

    pub fn submit_guess(&mut self, mode: GameMode, code: &str) -> Result<Guess> {
        let mut next = self.session(mode).clone();
        let guess = next.submit_guess(code, &self.catalog)?.clone();
        self.replace(next)?;

        if mode.counts_toward_stats() {
            self.record_daily();
        }
        Ok(guess)
    }

    /// Wipes the guesses of a session while keeping its target. Today's
    /// puzzle can only be cleared once its result is scored, so the guess
    /// budget of an unscored day cannot be reset.
    pub fn clear_guesses(&mut self, mode: GameMode) -> Result<()> {
        if mode == GameMode::Daily && !StatsStore::new(&self.conn).is_recorded(self.today) {
            return Err(GameError::invalid_guess(
                "today's puzzle can only be cleared after it has been scored",
            ));
        }
        let mut next = self.session(mode).clone();
        next.clear_guesses();
        self.replace(next)?;
        Ok(())
    }

    pub fn stats(&self) -> StatsAggregate {
        StatsStore::new(&self.conn).aggregate()
    }

    pub fn history(&self) -> Vec<DailyRecord> {
        StatsStore::new(&self.conn).history()
    }

    pub fn share_text(&self, mode: GameMode) -> String {
        share::share_text(self.session(mode))
    }

    /// Hands the connection back, e.g. to reopen the game after a restart.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::models::GameStatus;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn catalog() -> CountryCatalog {
        CountryCatalog::new(vec![
            CountryRecord::new("FR", "France", 46.2, 2.2),
            CountryRecord::new("US", "United States", 39.8, -98.6),
            CountryRecord::new("DE", "Germany", 51.2, 10.5),
            CountryRecord::new("JP", "Japan", 36.2, 138.3),
        ])
        .unwrap()
    }

    fn epoch() -> NaiveDate {
        crate::seed::default_epoch()
    }

    fn open(conn: Connection, date: NaiveDate) -> Game {
        open_with(conn, date, &GameConfig::default())
    }

    fn open_with(conn: Connection, date: NaiveDate, config: &GameConfig) -> Game {
        let mut rng = StdRng::seed_from_u64(3);
        Game::open(conn, catalog(), config, date, &mut rng).unwrap()
    }

    #[test]
    fn epoch_day_plays_france() {
        let mut game = open(open_in_memory().unwrap(), epoch());
        assert_eq!(game.today(), 0);
        assert_eq!(game.session(GameMode::Daily).target().code, "FR");

        let us = game.submit_guess(GameMode::Daily, "US").unwrap();
        assert!(us.proximity_percent < 40);
        let fr = game.submit_guess(GameMode::Daily, "FR").unwrap();
        assert_eq!(fr.proximity_percent, 100);
        assert_eq!(game.session(GameMode::Daily).status(), GameStatus::Won);

        let stats = game.stats();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.guess_distribution.get(&2), Some(&1));
        assert_eq!(game.history()[0].guess_count, 2);
    }

    #[test]
    fn session_survives_reopen_on_same_day() {
        let mut game = open(open_in_memory().unwrap(), epoch());
        game.submit_guess(GameMode::Daily, "JP").unwrap();
        game.submit_guess(GameMode::Free, "JP").unwrap();
        let free_target = game.session(GameMode::Free).target().code.clone();

        let game = open(game.into_connection(), epoch());
        assert_eq!(game.session(GameMode::Daily).guess_codes(), vec!["JP"]);
        assert_eq!(game.session(GameMode::Free).target().code, free_target);
        assert_eq!(game.session(GameMode::Free).guess_count(), 1);
    }

    #[test]
    fn next_day_starts_fresh_daily_session() {
        let mut game = open(open_in_memory().unwrap(), epoch());
        game.submit_guess(GameMode::Daily, "JP").unwrap();

        let tomorrow = epoch().succ_opt().unwrap();
        let game = open(game.into_connection(), tomorrow);
        assert_eq!(game.today(), 1);
        assert_eq!(game.session(GameMode::Daily).target().code, "US");
        assert!(game.session(GameMode::Daily).guesses().is_empty());
    }

    #[test]
    fn roll_over_only_acts_on_a_new_day() {
        let mut game = open(open_in_memory().unwrap(), epoch());
        game.submit_guess(GameMode::Daily, "JP").unwrap();
        assert!(!game.roll_over(epoch()).unwrap());
        assert_eq!(game.session(GameMode::Daily).guess_count(), 1);

        assert!(game.roll_over(epoch().succ_opt().unwrap()).unwrap());
        assert_eq!(game.session(GameMode::Daily).day_index(), Some(1));
        assert_eq!(game.session(GameMode::Daily).guess_count(), 0);
    }

    #[test]
    fn replaying_a_scored_day_does_not_count_twice() {
        let mut game = open(open_in_memory().unwrap(), epoch());
        game.submit_guess(GameMode::Daily, "FR").unwrap();
        game.clear_guesses(GameMode::Daily).unwrap();
        game.submit_guess(GameMode::Daily, "US").unwrap();
        game.submit_guess(GameMode::Daily, "FR").unwrap();

        let stats = game.stats();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.guess_distribution.get(&1), Some(&1));
        assert_eq!(stats.guess_distribution.get(&2), None);
    }

    #[test]
    fn six_misses_count_as_a_loss() {
        let mut game = open(open_in_memory().unwrap(), epoch());
        for code in ["US", "DE", "JP", "US", "DE", "JP"] {
            game.submit_guess(GameMode::Daily, code).unwrap();
        }
        assert_eq!(game.session(GameMode::Daily).status(), GameStatus::Lost);
        assert!(matches!(
            game.submit_guess(GameMode::Daily, "FR"),
            Err(GameError::InvalidGuess { .. })
        ));

        let stats = game.stats();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.games_won, 0);
        assert_eq!(stats.current_streak, 0);
    }

    #[test]
    fn free_play_never_touches_stats() {
        let mut game = open(open_in_memory().unwrap(), epoch());
        let target = game.session(GameMode::Free).target().code.clone();
        game.submit_guess(GameMode::Free, &target).unwrap();
        assert_eq!(game.session(GameMode::Free).status(), GameStatus::Won);
        assert_eq!(game.stats(), StatsAggregate::default());

        let mut rng = StdRng::seed_from_u64(11);
        let next = game.generate_new_country(&mut rng).unwrap();
        assert_ne!(next.target().code, target);
        assert_eq!(next.status(), GameStatus::InProgress);
    }

    #[test]
    fn unknown_guess_is_rejected_without_persisting() {
        let mut game = open(open_in_memory().unwrap(), epoch());
        assert!(matches!(
            game.submit_guess(GameMode::Daily, "Atlantis"),
            Err(GameError::InvalidGuess { .. })
        ));
        let game = open(game.into_connection(), epoch());
        assert!(game.session(GameMode::Daily).guesses().is_empty());
    }

    #[test]
    fn corrupt_stored_session_is_replaced() {
        let conn = open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO sessions (mode, day_index, target_code, guesses) VALUES ('daily', 0, 'FR', 'garbage')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO sessions (mode, day_index, target_code, guesses) VALUES ('free', NULL, 'XX', '[]')",
            [],
        )
        .unwrap();

        let game = open(conn, epoch());
        assert!(game.session(GameMode::Daily).guesses().is_empty());
        assert_eq!(game.session(GameMode::Daily).target().code, "FR");
        assert!(game.catalog().get(&game.session(GameMode::Free).target().code).is_some());
    }

    #[test]
    fn finished_but_unrecorded_day_is_scored_on_open() {
        let conn = open_in_memory().unwrap();
        SessionRepo::save(
            &conn,
            GameMode::Daily,
            &StoredSession {
                day_index: Some(0),
                target_code: "FR".to_string(),
                guesses: vec!["DE".to_string(), "FR".to_string()],
            },
        )
        .unwrap();

        let game = open(conn, epoch());
        assert_eq!(game.stats().games_won, 1);
        assert_eq!(game.stats().guess_distribution.get(&2), Some(&1));
    }

    #[test]
    fn unscored_daily_cannot_be_cleared() {
        let mut game = open(open_in_memory().unwrap(), epoch());
        for code in ["US", "DE", "JP", "US", "DE"] {
            game.submit_guess(GameMode::Daily, code).unwrap();
        }
        assert!(matches!(
            game.clear_guesses(GameMode::Daily),
            Err(GameError::InvalidGuess { .. })
        ));
        assert_eq!(game.session(GameMode::Daily).guess_count(), 5);

        game.submit_guess(GameMode::Daily, "FR").unwrap();
        let stats = game.stats();
        assert_eq!(stats.games_won, 1);
        assert_eq!(stats.guess_distribution.get(&6), Some(&1));
        assert_eq!(stats.guess_distribution.get(&1), None);
    }

    #[test]
    fn free_play_can_always_be_cleared() {
        let mut game = open(open_in_memory().unwrap(), epoch());
        game.submit_guess(GameMode::Free, "JP").unwrap();
        game.clear_guesses(GameMode::Free).unwrap();
        assert!(game.session(GameMode::Free).guesses().is_empty());
    }

    #[test]
    fn start_dispatches_on_mode() {
        let mut game = open(open_in_memory().unwrap(), epoch());
        let mut rng = StdRng::seed_from_u64(5);

        game.submit_guess(GameMode::Daily, "JP").unwrap();
        let daily = game.start(GameMode::Daily, &mut rng).unwrap();
        assert_eq!(daily.target().code, "FR");
        assert_eq!(daily.day_index(), Some(0));
        assert!(daily.guesses().is_empty());

        let before = game.session(GameMode::Free).target().code.clone();
        game.submit_guess(GameMode::Free, "JP").unwrap();
        let free = game.start(GameMode::Free, &mut rng).unwrap();
        assert_ne!(free.target().code, before);
        assert_eq!(free.day_index(), None);
        assert!(free.guesses().is_empty());
    }

    #[test]
    fn failed_save_leaves_session_untouched() {
        let conn = open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TRIGGER sessions_read_only BEFORE UPDATE ON sessions
             WHEN NEW.guesses != '[]'
             BEGIN SELECT RAISE(ABORT, 'sessions are read-only'); END;",
        )
        .unwrap();
        let mut game = open(conn, epoch());

        assert!(matches!(
            game.submit_guess(GameMode::Daily, "JP"),
            Err(GameError::Storage(_))
        ));
        assert!(game.session(GameMode::Daily).guesses().is_empty());
        assert!(game.submit_guess(GameMode::Free, "JP").is_err());
        assert!(game.session(GameMode::Free).guesses().is_empty());
    }

    #[test]
    fn tightening_duplicate_policy_keeps_todays_guesses() {
        let mut game = open(open_in_memory().unwrap(), epoch());
        game.submit_guess(GameMode::Daily, "US").unwrap();
        game.submit_guess(GameMode::Daily, "US").unwrap();

        let strict = GameConfig {
            duplicate_guesses: DuplicateGuessPolicy::Reject,
            ..GameConfig::default()
        };
        let mut game = open_with(game.into_connection(), epoch(), &strict);
        assert_eq!(game.session(GameMode::Daily).guess_codes(), vec!["US", "US"]);
        assert!(matches!(
            game.submit_guess(GameMode::Daily, "US"),
            Err(GameError::InvalidGuess { .. })
        ));
    }
}

//! The guess-session state machine.
//!
//! A session starts `InProgress` and ends `Won` (the latest guess is the
//! target) or `Lost` (the guess budget ran out). Guesses are append-only and
//! nothing is accepted once the session has ended.

use serde::{Deserialize, Serialize};

use crate::catalog::CountryCatalog;
use crate::config::DuplicateGuessPolicy;
use crate::distance;
use crate::error::{GameError, Result};
use crate::models::{CountryRecord, GameMode, GameStatus, Guess};

pub const MAX_GUESSES: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    mode: GameMode,
    target: CountryRecord,
    /// Day being played; only daily sessions have one.
    day_index: Option<i64>,
    guesses: Vec<Guess>,
    status: GameStatus,
    #[serde(skip)]
    duplicate_policy: DuplicateGuessPolicy,
}

impl GameSession {
    pub fn start(mode: GameMode, target: CountryRecord, day_index: Option<i64>) -> Self {
        Self {
            mode,
            target,
            day_index: if mode == GameMode::Daily { day_index } else { None },
            guesses: Vec::new(),
            status: GameStatus::InProgress,
            duplicate_policy: DuplicateGuessPolicy::default(),
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicateGuessPolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Rebuilds a session by replaying previously submitted codes in order.
    /// Stored guesses were legal when made, so they replay without the
    /// duplicate check; `policy` governs only guesses submitted afterwards.
    pub fn restore(
        mode: GameMode,
        target: CountryRecord,
        day_index: Option<i64>,
        codes: &[String],
        catalog: &CountryCatalog,
        policy: DuplicateGuessPolicy,
    ) -> Result<Self> {
        let mut session = Self::start(mode, target, day_index)
            .with_duplicate_policy(DuplicateGuessPolicy::Allow);
        for code in codes {
            session.submit_guess(code, catalog).map_err(|e| {
                GameError::CorruptPersistedState(format!(
                    "Replaying {} session guess '{}': {}",
                    mode, code, e
                ))
            })?;
        }
        Ok(session.with_duplicate_policy(policy))
    }

    pub fn submit_guess(&mut self, code: &str, catalog: &CountryCatalog) -> Result<&Guess> {
        if self.status.is_terminal() {
            return Err(GameError::invalid_guess(format!(
                "the game is already {}",
                self.status.as_str()
            )));
        }

        let guessed = catalog
            .get(code)
            .ok_or_else(|| GameError::invalid_guess(format!("unknown country code '{}'", code.trim())))?;

        if self.duplicate_policy == DuplicateGuessPolicy::Reject && self.has_guessed(&guessed.code) {
            return Err(GameError::invalid_guess(format!(
                "{} was already guessed",
                guessed.name
            )));
        }

        let guess = distance::score_guess(&self.target, guessed);
        log::debug!(
            "{} guess #{}: {} at {:.0}km ({}%)",
            self.mode,
            self.guesses.len() + 1,
            guess.country_code,
            guess.distance_km,
            guess.proximity_percent
        );
        self.guesses.push(guess);

        self.status = if guessed.code == self.target.code {
            GameStatus::Won
        } else if self.guesses.len() >= MAX_GUESSES {
            GameStatus::Lost
        } else {
            GameStatus::InProgress
        };

        Ok(&self.guesses[self.guesses.len() - 1])
    }

    /// Drops every guess and reopens the session on the same target.
    pub fn clear_guesses(&mut self) {
        self.guesses.clear();
        self.status = GameStatus::InProgress;
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn target(&self) -> &CountryRecord {
        &self.target
    }

    pub fn day_index(&self) -> Option<i64> {
        self.day_index
    }

    pub fn guesses(&self) -> &[Guess] {
        &self.guesses
    }

    pub fn guess_codes(&self) -> Vec<String> {
        self.guesses.iter().map(|g| g.country_code.clone()).collect()
    }

    pub fn last_guess(&self) -> Option<&Guess> {
        self.guesses.last()
    }

    pub fn guess_count(&self) -> usize {
        self.guesses.len()
    }

    pub fn remaining_guesses(&self) -> usize {
        if self.status.is_terminal() {
            0
        } else {
            MAX_GUESSES - self.guesses.len()
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn duplicate_policy(&self) -> DuplicateGuessPolicy {
        self.duplicate_policy
    }

    fn has_guessed(&self, code: &str) -> bool {
        self.guesses.iter().any(|g| g.country_code == code)
    }
}

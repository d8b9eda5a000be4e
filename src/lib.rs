//! Engine for a daily country-guessing game.
//!
//! A target country is chosen per calendar day (or at random in free play);
//! each guess is scored by great-circle distance, bearing and proximity until
//! the player finds the target or runs out of guesses. Finished daily games
//! feed persistent statistics that count every day once.

pub mod catalog;
pub mod config;
pub mod db;
pub mod distance;
pub mod error;
pub mod game;
pub mod models;
pub mod seed;
pub mod session;
pub mod stats;
pub mod utils;

pub use catalog::CountryCatalog;
pub use config::{AppConfig, DistanceUnit, DuplicateGuessPolicy, GameConfig, SettingsData, Theme};
pub use error::GameError;
pub use game::Game;
pub use models::{CountryRecord, DailyRecord, GameMode, GameStatus, Guess, StatsAggregate};
pub use seed::DailySeed;
pub use session::{GameSession, MAX_GUESSES};
pub use stats::StatsStore;

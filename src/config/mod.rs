pub mod settings;

pub use settings::{AppConfig, DistanceUnit, DuplicateGuessPolicy, GameConfig, SettingsData, Theme};

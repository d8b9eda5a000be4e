use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::GameError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Km,
    Miles,
}

impl DistanceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnit::Km => "km",
            DistanceUnit::Miles => "miles",
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "km" | "kilometers" | "kilometres" => Ok(DistanceUnit::Km),
            "mi" | "miles" => Ok(DistanceUnit::Miles),
            _ => Err(anyhow::anyhow!("Unknown distance unit: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow::anyhow!("Unknown theme: {}", s)),
        }
    }
}

/// What to do when a player submits a country they already guessed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateGuessPolicy {
    #[default]
    Allow,
    Reject,
}

impl DuplicateGuessPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateGuessPolicy::Allow => "allow",
            DuplicateGuessPolicy::Reject => "reject",
        }
    }
}

impl FromStr for DuplicateGuessPolicy {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow" => Ok(DuplicateGuessPolicy::Allow),
            "reject" => Ok(DuplicateGuessPolicy::Reject),
            _ => Err(anyhow::anyhow!("Unknown duplicate guess policy: {}", s)),
        }
    }
}

/// Display preferences. Never consulted by scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsData {
    #[serde(default)]
    pub distance_unit: DistanceUnit,
    #[serde(default)]
    pub theme: Theme,
}

fn default_epoch() -> NaiveDate {
    crate::seed::default_epoch()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Calendar date of day 0.
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDate,
    #[serde(default)]
    pub duplicate_guesses: DuplicateGuessPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            epoch: default_epoch(),
            duplicate_guesses: DuplicateGuessPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: SettingsData,
    #[serde(default)]
    pub game: GameConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "worldle")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("worldle.db"))
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Reads the config at `path`. A missing file yields defaults; a file
    /// that cannot be read or parsed is reported as corrupt.
    pub fn load_from(path: &Path) -> Result<Self, GameError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            GameError::CorruptPersistedState(format!("Reading {:?}: {}", path, e))
        })?;
        toml::from_str(&content).map_err(|e| {
            GameError::CorruptPersistedState(format!("Parsing {:?}: {}", path, e))
        })
    }

    /// Like [`AppConfig::load_from`], but a corrupt file is logged and
    /// replaced by defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}; falling back to default settings", e);
                Self::default()
            }
        }
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Ok(Self::load_or_default(&path))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }
}

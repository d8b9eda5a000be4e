use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Daily,
    Free,
}

impl GameMode {
    pub fn all() -> Vec<GameMode> {
        vec![GameMode::Daily, GameMode::Free]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Daily => "daily",
            GameMode::Free => "free",
        }
    }

    /// Only daily results feed the statistics.
    pub fn counts_toward_stats(&self) -> bool {
        matches!(self, GameMode::Daily)
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(GameMode::Daily),
            "free" => Ok(GameMode::Free),
            _ => Err(anyhow::anyhow!("Unknown game mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::InProgress => "in_progress",
            GameStatus::Won => "won",
            GameStatus::Lost => "lost",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!(GameMode::from_str("Daily").unwrap(), GameMode::Daily);
        assert_eq!(GameMode::from_str("free").unwrap(), GameMode::Free);
        assert!(GameMode::from_str("weekly").is_err());
    }

    #[test]
    fn only_won_and_lost_are_terminal() {
        assert!(!GameStatus::InProgress.is_terminal());
        assert!(GameStatus::Won.is_terminal());
        assert!(GameStatus::Lost.is_terminal());
    }
}

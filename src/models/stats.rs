use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one scored calendar day. Written once per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub day_index: i64,
    pub completed: bool,
    pub won: bool,
    pub guess_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsAggregate {
    pub games_played: u32,
    pub games_won: u32,
    pub current_streak: u32,
    pub max_streak: u32,
    /// Winning guess count -> number of wins. Losses are not listed here.
    pub guess_distribution: BTreeMap<u32, u32>,
}

impl StatsAggregate {
    pub fn losses(&self) -> u32 {
        self.games_played.saturating_sub(self.games_won)
    }

    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.games_won as f64 / self.games_played as f64 * 100.0
        }
    }

    /// Folds one new record into the aggregate. `previous` is the record for
    /// `record.day_index - 1`, if one exists.
    pub fn apply(&mut self, record: &DailyRecord, previous: Option<&DailyRecord>) {
        self.games_played += 1;
        if record.won {
            self.games_won += 1;
            let extends = previous.map(|p| p.won).unwrap_or(false);
            self.current_streak = if extends { self.current_streak + 1 } else { 1 };
            *self
                .guess_distribution
                .entry(record.guess_count)
                .or_insert(0) += 1;
        } else {
            self.current_streak = 0;
        }
        self.max_streak = self.max_streak.max(self.current_streak);
    }

    /// Recomputes the aggregate from scratch, in day order.
    pub fn from_history(records: &[DailyRecord]) -> Self {
        let mut sorted: Vec<&DailyRecord> = records.iter().collect();
        sorted.sort_by_key(|r| r.day_index);

        let mut agg = StatsAggregate::default();
        let mut prev: Option<&DailyRecord> = None;
        for record in sorted {
            let previous = prev.filter(|p| p.day_index == record.day_index - 1);
            agg.apply(record, previous);
            prev = Some(record);
        }
        agg
    }

    pub fn max_distribution_count(&self) -> u32 {
        self.guess_distribution.values().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(day_index: i64, won: bool, guess_count: u32) -> DailyRecord {
        DailyRecord {
            day_index,
            completed: true,
            won,
            guess_count,
        }
    }

    #[test]
    fn streak_extends_only_over_consecutive_wins() {
        let agg = StatsAggregate::from_history(&[
            rec(1, true, 3),
            rec(2, true, 2),
            rec(4, true, 1),
        ]);
        assert_eq!(agg.games_played, 3);
        assert_eq!(agg.current_streak, 1);
        assert_eq!(agg.max_streak, 2);
    }

    #[test]
    fn loss_resets_streak_and_skips_distribution() {
        let agg = StatsAggregate::from_history(&[rec(1, true, 4), rec(2, false, 6)]);
        assert_eq!(agg.current_streak, 0);
        assert_eq!(agg.max_streak, 1);
        assert_eq!(agg.losses(), 1);
        assert_eq!(agg.guess_distribution.get(&6), None);
        assert_eq!(agg.guess_distribution.get(&4), Some(&1));
    }

    #[test]
    fn win_after_loss_starts_new_streak() {
        let agg = StatsAggregate::from_history(&[rec(1, false, 6), rec(2, true, 5)]);
        assert_eq!(agg.current_streak, 1);
    }

    #[test]
    fn empty_aggregate_has_zero_win_rate() {
        let agg = StatsAggregate::default();
        assert_eq!(agg.win_rate(), 0.0);
        assert_eq!(agg.max_distribution_count(), 0);
    }
}

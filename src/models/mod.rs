pub mod country;
pub mod game;
pub mod guess;
pub mod stats;

pub use country::CountryRecord;
pub use game::{GameMode, GameStatus};
pub use guess::Guess;
pub use stats::{DailyRecord, StatsAggregate};

use crate::distance::direction_glyph;
use crate::models::{GameMode, GameStatus};
use crate::session::{GameSession, MAX_GUESSES};

const SQUARE_COUNT: u8 = 5;

/// Five squares for a proximity: one green per full 20%, a yellow for a
/// remaining 10% or more, white for the rest.
pub fn proximity_squares(proximity_percent: u8) -> String {
    let greens = proximity_percent / 20;
    let yellow = proximity_percent - greens * 20 >= 10;
    let mut squares = "🟩".repeat(greens as usize);
    let mut used = greens;
    if yellow && used < SQUARE_COUNT {
        squares.push('🟨');
        used += 1;
    }
    squares.push_str(&"⬜".repeat((SQUARE_COUNT - used) as usize));
    squares
}

pub fn share_text(session: &GameSession) -> String {
    let score = match session.status() {
        GameStatus::Won => session.guess_count().to_string(),
        GameStatus::Lost => "X".to_string(),
        GameStatus::InProgress => "?".to_string(),
    };

    let title = match (session.mode(), session.day_index()) {
        (GameMode::Daily, Some(day)) => format!("#Worldle #{}", day),
        _ => "#Worldle (free play)".to_string(),
    };

    let mut lines = vec![format!("{} {}/{}", title, score, MAX_GUESSES)];
    for guess in session.guesses() {
        lines.push(format!(
            "{}{} {}%",
            proximity_squares(guess.proximity_percent),
            direction_glyph(guess),
            guess.proximity_percent
        ));
    }
    lines.join("\n")
}

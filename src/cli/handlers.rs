use anyhow::{Result, anyhow};
use rand::Rng;
use std::str::FromStr;

use worldle::config::{AppConfig, DistanceUnit, DuplicateGuessPolicy, Theme};
use worldle::distance::{Direction, direction_glyph, format_distance};
use worldle::game::share::proximity_squares;
use worldle::utils::format::{format_percent, progress_bar};
use worldle::{Game, GameError, GameMode, GameSession, GameStatus, MAX_GUESSES};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";

struct Palette {
    accent: &'static str,
    good: &'static str,
    warn: &'static str,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            accent: "\x1b[34m",
            good: "\x1b[32m",
            warn: "\x1b[33m",
        },
        Theme::Dark => Palette {
            accent: "\x1b[38;2;120;180;255m",
            good: "\x1b[38;2;90;220;120m",
            warn: "\x1b[38;2;240;200;90m",
        },
    }
}

fn mode_for(free: bool) -> GameMode {
    if free { GameMode::Free } else { GameMode::Daily }
}

// ─── Board ───────────────────────────────────────────────────────────────────

fn print_board(game: &Game, mode: GameMode, config: &AppConfig) {
    let p = palette(config.settings.theme);
    let session = game.session(mode);

    println!();
    match session.day_index() {
        Some(day) => println_colored!(
            p.accent,
            "  Worldle #{} ({})",
            day,
            game.seed().date_of(day).format("%Y-%m-%d")
        ),
        None => println_colored!(p.accent, "  Worldle: free play"),
    }
    println!();

    if session.guesses().is_empty() {
        println_colored!(DIM, "  No guesses yet. {} to go.", MAX_GUESSES);
    }
    for (i, guess) in session.guesses().iter().enumerate() {
        let name = game
            .catalog()
            .get(&guess.country_code)
            .map(|c| c.name.as_str())
            .unwrap_or(guess.country_code.as_str());
        let direction = if guess.distance_km == 0.0 {
            String::new()
        } else {
            Direction::from_bearing(guess.bearing_degrees).as_str().to_string()
        };
        println!(
            "  {}. {:<24} {:>8}  {} {:<3}  {} {:>3}%",
            i + 1,
            name,
            format_distance(guess.distance_km, config.settings.distance_unit),
            direction_glyph(guess),
            direction,
            proximity_squares(guess.proximity_percent),
            guess.proximity_percent
        );
    }

    println!();
    print_status(session, &p);
    println!();
}

fn print_status(session: &GameSession, p: &Palette) {
    match session.status() {
        GameStatus::InProgress => {
            println_colored!(DIM, "  {} guesses left", session.remaining_guesses());
        }
        GameStatus::Won => {
            println_colored!(
                p.good,
                "  ✓ {} in {}/{}",
                session.target().name,
                session.guess_count(),
                MAX_GUESSES
            );
        }
        GameStatus::Lost => {
            println_colored!(p.warn, "  ✗ Out of guesses. It was {}", session.target().name);
        }
    }
}

// ─── Commands ────────────────────────────────────────────────────────────────

pub fn handle_today(game: &Game, config: &AppConfig) -> Result<()> {
    print_board(game, GameMode::Daily, config);
    Ok(())
}

pub fn handle_guess(game: &mut Game, config: &AppConfig, words: &[String], free: bool) -> Result<()> {
    let mode = mode_for(free);
    let query = words.join(" ");
    let code = game
        .catalog()
        .resolve(&query)
        .map(|c| c.code.clone())
        .unwrap_or_else(|| query.clone());

    match game.submit_guess(mode, &code) {
        Ok(_) => print_board(game, mode, config),
        Err(GameError::InvalidGuess { reason }) => {
            println_colored!(RED, "  ✗ {}", reason);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub fn handle_new(game: &mut Game, config: &AppConfig, rng: &mut impl Rng) -> Result<()> {
    game.generate_new_country(rng)?;
    println_colored!(palette(config.settings.theme).good, "  ✓ New free-play country drawn");
    print_board(game, GameMode::Free, config);
    Ok(())
}

pub fn handle_clear(game: &mut Game, config: &AppConfig, free: bool) -> Result<()> {
    let mode = mode_for(free);
    match game.clear_guesses(mode) {
        Ok(()) => {
            println_colored!(palette(config.settings.theme).good, "  ✓ Cleared {} guesses", mode);
        }
        Err(GameError::InvalidGuess { reason }) => {
            println_colored!(RED, "  ✗ {}", reason);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub fn handle_stats(game: &Game, config: &AppConfig) -> Result<()> {
    let p = palette(config.settings.theme);
    let stats = game.stats();

    println!();
    println_colored!(p.accent, "  Statistics");
    println!();
    println_colored!(
        BOLD,
        "  Played: {}  |  Win %: {}  |  Streak: {}  |  Best: {}",
        stats.games_played,
        format_percent(stats.win_rate()),
        stats.current_streak,
        stats.max_streak
    );
    println!();
    println_colored!(DIM, "  Guess distribution");
    let max = stats.max_distribution_count();
    for count in 1..=MAX_GUESSES as u32 {
        let wins = stats.guess_distribution.get(&count).copied().unwrap_or(0);
        println!("  {}  {}  {}", count, progress_bar(wins, max, 20), wins);
    }
    println!("  X  {}  {}", progress_bar(stats.losses(), stats.games_played, 20), stats.losses());
    println!();
    Ok(())
}

pub fn handle_share(game: &Game, free: bool) -> Result<()> {
    println!("{}", game.share_text(mode_for(free)));
    Ok(())
}

pub fn handle_settings(
    config: &mut AppConfig,
    unit: Option<&str>,
    theme: Option<&str>,
    duplicates: Option<&str>,
) -> Result<()> {
    let mut changed = false;
    if let Some(unit) = unit {
        config.settings.distance_unit = DistanceUnit::from_str(unit)?;
        changed = true;
    }
    if let Some(theme) = theme {
        config.settings.theme = Theme::from_str(theme)?;
        changed = true;
    }
    if let Some(duplicates) = duplicates {
        config.game.duplicate_guesses = DuplicateGuessPolicy::from_str(duplicates)
            .map_err(|_| anyhow!("Unknown duplicate policy '{}'. Use: allow, reject", duplicates))?;
        changed = true;
    }
    if changed {
        config.save()?;
    }

    let p = palette(config.settings.theme);
    println!();
    println_colored!(p.accent, "  Settings");
    println!();
    println!("  Distance unit:  {}", config.settings.distance_unit.as_str());
    println!("  Theme:          {}", config.settings.theme.as_str());
    println!("  Repeat guesses: {}", config.game.duplicate_guesses.as_str());
    println!("  Epoch:          {}", config.game.epoch.format("%Y-%m-%d"));
    println!();
    Ok(())
}

pub fn handle_countries(game: &Game) -> Result<()> {
    for country in game.catalog().all() {
        println!("  {}  {}", country.code, country.name);
    }
    Ok(())
}

mod cli;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use rand::Rng;

use cli::args::{Cli, Commands};
use cli::handlers;
use worldle::{AppConfig, CountryCatalog, Game, db};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;
    let mut rng = rand::thread_rng();

    match cli.command.unwrap_or(Commands::Today) {
        // Settings don't need the database.
        Commands::Settings {
            unit,
            theme,
            duplicates,
        } => {
            handlers::handle_settings(
                &mut config,
                unit.as_deref(),
                theme.as_deref(),
                duplicates.as_deref(),
            )?;
        }
        Commands::Today => {
            let game = open_game(&config, &mut rng)?;
            handlers::handle_today(&game, &config)?;
        }
        Commands::Guess { country, free } => {
            let mut game = open_game(&config, &mut rng)?;
            handlers::handle_guess(&mut game, &config, &country, free)?;
        }
        Commands::New => {
            let mut game = open_game(&config, &mut rng)?;
            handlers::handle_new(&mut game, &config, &mut rng)?;
        }
        Commands::Clear { free } => {
            let mut game = open_game(&config, &mut rng)?;
            handlers::handle_clear(&mut game, &config, free)?;
        }
        Commands::Stats => {
            let game = open_game(&config, &mut rng)?;
            handlers::handle_stats(&game, &config)?;
        }
        Commands::Share { free } => {
            let game = open_game(&config, &mut rng)?;
            handlers::handle_share(&game, free)?;
        }
        Commands::Countries => {
            let game = open_game(&config, &mut rng)?;
            handlers::handle_countries(&game)?;
        }
    }

    Ok(())
}

/// Open the database and restore both sessions for today's UTC date.
fn open_game(config: &AppConfig, rng: &mut impl Rng) -> Result<Game> {
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = db::open(&db_path)?;

    let catalog = CountryCatalog::builtin().context("Loading country catalog")?;
    let today = Utc::now().date_naive();
    Game::open(conn, catalog, &config.game, today, rng).context("Opening game state")
}

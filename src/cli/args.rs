use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "worldle", version, author, about = "Guess the country of the day from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's puzzle and your guesses so far
    Today,
    /// Guess a country by ISO code or name
    Guess {
        /// Country code (FR) or name (France)
        #[arg(required = true, num_args = 1..)]
        country: Vec<String>,
        /// Play the free-play puzzle instead of today's
        #[arg(long)]
        free: bool,
    },
    /// Draw a new random free-play country
    New,
    /// Clear the guesses of the current puzzle
    Clear {
        #[arg(long)]
        free: bool,
    },
    /// Show statistics
    Stats,
    /// Print a shareable summary of the current puzzle
    Share {
        #[arg(long)]
        free: bool,
    },
    /// Show or change settings
    Settings {
        /// Distance unit: km or miles
        #[arg(long)]
        unit: Option<String>,
        /// Theme: light or dark
        #[arg(long)]
        theme: Option<String>,
        /// Repeated guesses: allow or reject
        #[arg(long)]
        duplicates: Option<String>,
    },
    /// List every country that can be guessed
    Countries,
}

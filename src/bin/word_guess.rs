use std::io;

use clap::Parser;
use secret_santa::game::{play, GuessState, MAX_ATTEMPTS};

#[derive(Parser, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
#[command(author, version, about)]
/// Guess the secret word one letter at a time
struct Cli {
    /// Wrong guesses allowed before the game is lost
    #[arg(long, short, default_value_t = MAX_ATTEMPTS, value_parser = clap::value_parser!(u8).range(1..))]
    attempts: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut state = GuessState::random(&mut rand::rng(), cli.attempts);
    let stdin = io::stdin();
    play(&mut state, &mut stdin.lock(), &mut io::stdout())?;
    Ok(())
}

use std::io::{self, BufRead, Write};

use log::debug;
use rand::{seq::IndexedRandom, Rng};

pub const WORD_BANK: [&str; 5] = ["salame", "fideos", "pizza", "hamburguesa", "banana"];
pub const MAX_ATTEMPTS: u8 = 10;
pub const PLACEHOLDER: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Empty,
    TooLong,
    /// Letter is in the word, number of positions it occupies
    Hit(usize),
    Miss,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessState {
    secret: Vec<char>,
    revealed: Vec<char>,
    attempts_left: u8,
}

impl GuessState {
    pub fn new(word: &str, attempts: u8) -> Self {
        let secret: Vec<char> = word.to_lowercase().chars().collect();
        let revealed = vec![PLACEHOLDER; secret.len()];
        Self {
            secret,
            revealed,
            attempts_left: attempts,
        }
    }

    /// Starts with a word picked uniformly from [`WORD_BANK`]
    pub fn random<R: Rng + ?Sized>(rng: &mut R, attempts: u8) -> Self {
        let word = WORD_BANK.choose(rng).copied().unwrap_or(WORD_BANK[0]);
        debug!("Picked a {} letter word", word.chars().count());
        Self::new(word, attempts)
    }

    pub fn secret(&self) -> String {
        self.secret.iter().collect()
    }

    pub fn revealed(&self) -> &[char] {
        &self.revealed
    }

    pub fn attempts_left(&self) -> u8 {
        self.attempts_left
    }

    pub fn status(&self) -> GameStatus {
        if !self.revealed.contains(&PLACEHOLDER) {
            GameStatus::Won
        } else if self.attempts_left == 0 {
            GameStatus::Lost
        } else {
            GameStatus::Playing
        }
    }

    /// Revealed letters separated by spaces, e.g. `p _ z z _`
    pub fn display(&self) -> String {
        self.revealed
            .iter()
            .map(char::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Applies one line of input. Rejected input leaves the state untouched
    pub fn guess(&mut self, input: &str) -> GuessOutcome {
        let input = input.trim().to_lowercase();
        let mut chars = input.chars();
        let letter = match (chars.next(), chars.next()) {
            (None, _) => return GuessOutcome::Empty,
            (Some(_), Some(_)) => return GuessOutcome::TooLong,
            (Some(letter), None) => letter,
        };

        let mut hits = 0;
        for (slot, &ch) in self.revealed.iter_mut().zip(&self.secret) {
            if ch == letter {
                *slot = ch;
                hits += 1;
            }
        }
        if hits > 0 {
            GuessOutcome::Hit(hits)
        } else {
            self.attempts_left = self.attempts_left.saturating_sub(1);
            GuessOutcome::Miss
        }
    }
}

/// Runs the game until it is won, lost or the input ends
pub fn play<R: BufRead, W: Write>(
    state: &mut GuessState,
    input: &mut R,
    out: &mut W,
) -> io::Result<GameStatus> {
    while state.status() == GameStatus::Playing {
        writeln!(out, "\nCurrent word: {}", state.display())?;
        write!(out, "Guess a letter: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out, "\nNo more input. The word was: {}", state.secret())?;
            return Ok(GameStatus::Playing);
        }

        match state.guess(&line) {
            GuessOutcome::Empty => writeln!(out, "Please enter a letter.")?,
            GuessOutcome::TooLong => writeln!(out, "Please enter a single letter.")?,
            GuessOutcome::Hit(_) => writeln!(out, "Great guess!")?,
            GuessOutcome::Miss => writeln!(
                out,
                "Wrong guess! Attempts left: {}",
                state.attempts_left()
            )?,
        }
    }

    let status = state.status();
    match status {
        GameStatus::Won => writeln!(
            out,
            "\nCongratulations!! You guessed the word: {}",
            state.secret()
        )?,
        GameStatus::Lost => writeln!(
            out,
            "\nYou ran out of attempts! The word was: {}",
            state.secret()
        )?,
        GameStatus::Playing => {}
    }
    Ok(status)
}

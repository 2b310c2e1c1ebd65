use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Parser, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default)]
#[command(
    author,
    version,
    about,
    long_about = "Randomly pairs Secret Santa participants and emails each one who they gift."
)]
pub struct Cli {
    /// Print the emails instead of sending them
    ///
    /// Also enabled by `DRY_RUN` in the environment or env file
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Path to the env file to load settings from
    ///
    /// If not specified uses `.env` in the current folder, or `secret_santa.env` if `.env` is missing
    #[arg(long = "env-file", value_name = "PATH")]
    pub env_filename: Option<String>,

    /// Sender email address (overrides `SENDER_EMAIL`)
    #[arg(long, value_name = "ADDRESS")]
    pub sender: Option<String>,

    /// Ask for interactive confirmation before sending emails
    #[arg(long, short)]
    pub confirm: bool,

    /// Only test the SMTP login, no emails are sent
    #[arg(long)]
    pub test_connect: bool,

    /// Trace the SMTP conversation in the logs
    #[arg(long)]
    pub debug_smtp: bool,

    /// JSON file with the participants (list of objects with `name` and `email`)
    ///
    /// If not specified uses `PARTICIPANTS_FILE` or the built in list
    #[arg(long = "participants", value_name = "PATH")]
    pub participants_filename: Option<String>,

    /// Write a JSON summary of the run to this file
    #[arg(long = "report", value_name = "PATH")]
    pub report_filename: Option<String>,

    /// Set logging level to use
    #[arg(long, short, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

impl Cli {
    /// Returns the env file requested on the command line, if any
    pub fn get_env_path(&self) -> Option<PathBuf> {
        self.env_filename.as_ref().map(PathBuf::from)
    }

    pub fn get_participants_path(&self) -> Option<PathBuf> {
        self.participants_filename.as_ref().map(PathBuf::from)
    }

    pub fn get_report_path(&self) -> Option<PathBuf> {
        self.report_filename.as_ref().map(PathBuf::from)
    }
}

/// Exists to provide better help messages variants copied from LevelFilter as
/// that's the type that is actually needed
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum LogLevel {
    /// Nothing emitted in this mode
    #[default]
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

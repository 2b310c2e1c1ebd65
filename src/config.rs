use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use anyhow::Context;
use log::{debug, warn};
use regex::Regex;

use crate::Cli;

pub const DEFAULT_ENV_FILE: &str = ".env";
pub const FALLBACK_ENV_FILE: &str = "secret_santa.env";
pub const DEFAULT_SENDER: &str = "secret.santa@example.com";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
/// Implicit TLS submission port
pub const DEFAULT_SMTP_PORT: u16 = 465;

const KEY_SENDER: &str = "SENDER_EMAIL";
const KEY_CREDENTIAL: &str = "password";
const KEY_DRY_RUN: &str = "DRY_RUN";
const KEY_DEBUG_SMTP: &str = "DEBUG_SMTP";
const KEY_SMTP_HOST: &str = "SMTP_HOST";
const KEY_SMTP_PORT: &str = "SMTP_PORT";
const KEY_PARTICIPANTS: &str = "PARTICIPANTS_FILE";

/// Secret used to log in to the SMTP server. Never printed
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(<redacted>)")
    }
}

/// Key value pairs read from an env file
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EnvFile {
    vars: HashMap<String, String>,
}

impl EnvFile {
    /// Picks the env file to load. An explicit path is always returned, even if it does not exist
    pub fn locate(explicit: Option<PathBuf>) -> Option<PathBuf> {
        if explicit.is_some() {
            return explicit;
        }
        [DEFAULT_ENV_FILE, FALLBACK_ENV_FILE]
            .into_iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    pub fn load_from(env_path: &Path) -> anyhow::Result<Self> {
        debug!("Loading env file from: {env_path:?}");
        let file_contents = fs::read_to_string(env_path)
            .with_context(|| format!("Failed to read contents of {env_path:?}"))?;
        Ok(Self::parse(&file_contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut vars = HashMap::new();
        for (line_no, line) in contents.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match parse_line(trimmed) {
                Some((key, value)) => {
                    vars.insert(key, value);
                }
                None => warn!("Ignoring malformed line {} in env file", line_no + 1),
            }
        }
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

fn parse_line(line: &str) -> Option<(String, String)> {
    static CELL_LINE: OnceLock<Regex> = OnceLock::new();
    let re_line = CELL_LINE.get_or_init(|| {
        debug!("Compiling regex for parsing env file lines");
        Regex::new(r"^(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*)$")
            .expect("failed to compile regex")
    });

    let captures = re_line.captures(line)?;
    let key = captures.get(1)?.as_str().to_owned();
    let value = unquote(captures.get(2).map_or("", |m| m.as_str().trim()));
    Some((key, value.to_owned()))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Values accepted as "on" for boolean keys
fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes")
}

/// Settings supplied by the configuration source (env file and process environment)
#[derive(Debug, PartialEq, Eq)]
pub struct Config {
    pub sender: Option<String>,
    pub credential: Option<Credential>,
    pub dry_run: bool,
    pub debug_smtp: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub participants_path: Option<PathBuf>,
}

impl Config {
    /// Loads the env file (if any) then reads every key, preferring the process environment
    pub fn load(env_path: Option<PathBuf>) -> anyhow::Result<Config> {
        let env_file = match EnvFile::locate(env_path) {
            Some(path) => EnvFile::load_from(&path)
                .with_context(|| format!("Failed to load env file {path:?}"))?,
            None => {
                warn!("No env file found. Only the process environment will be used");
                EnvFile::default()
            }
        };
        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| env_file.get(key).map(str::to_owned))
        })
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let smtp_port = match non_empty(KEY_SMTP_PORT) {
            Some(port) => port
                .parse()
                .with_context(|| format!("Failed to parse {KEY_SMTP_PORT} value {port:?}"))?,
            None => DEFAULT_SMTP_PORT,
        };

        let result = Config {
            sender: non_empty(KEY_SENDER),
            credential: non_empty(KEY_CREDENTIAL).map(Credential::new),
            dry_run: non_empty(KEY_DRY_RUN).is_some_and(|v| parse_flag(&v)),
            debug_smtp: non_empty(KEY_DEBUG_SMTP).is_some_and(|v| parse_flag(&v)),
            smtp_host: non_empty(KEY_SMTP_HOST).unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port,
            participants_path: non_empty(KEY_PARTICIPANTS).map(PathBuf::from),
        };
        debug!("Config loaded: {result:?}");
        Ok(result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Print the emails, never contact the server
    DryRun,
    Live,
}

/// Everything a run needs, resolved once at startup from the command line and [`Config`]
#[derive(Debug)]
pub struct Settings {
    pub sender: String,
    pub credential: Option<Credential>,
    pub mode: Mode,
    pub confirm: bool,
    pub test_connect: bool,
    pub debug_smtp: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub participants_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
}

impl Settings {
    pub fn load(cli: &Cli) -> anyhow::Result<Settings> {
        let config = Config::load(cli.get_env_path()).context("Failed to load configuration")?;
        Ok(Self::resolve(cli, config))
    }

    /// Command line values win over the configuration source
    pub fn resolve(cli: &Cli, config: Config) -> Settings {
        let mode = if cli.dry_run || config.dry_run {
            Mode::DryRun
        } else {
            Mode::Live
        };
        Settings {
            sender: cli
                .sender
                .clone()
                .or(config.sender)
                .unwrap_or_else(|| DEFAULT_SENDER.to_string()),
            credential: config.credential,
            mode,
            confirm: cli.confirm,
            test_connect: cli.test_connect,
            debug_smtp: cli.debug_smtp || config.debug_smtp,
            smtp_host: config.smtp_host,
            smtp_port: config.smtp_port,
            participants_path: cli.get_participants_path().or(config.participants_path),
            report_path: cli.get_report_path(),
        }
    }
}

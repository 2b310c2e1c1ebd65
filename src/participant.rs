use std::{fmt::Display, fs, path::Path};

use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Name shown to whoever has to gift this participant
    pub name: String,

    /// Address the assignment is sent to
    pub email: String,
}

impl Participant {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl From<(&str, &str)> for Participant {
    fn from((name, email): (&str, &str)) -> Self {
        Self::new(name, email)
    }
}

impl Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Used when no participants file is configured
pub fn default_participants() -> Vec<Participant> {
    vec![
        ("Matias", "matias@example.com").into(),
        ("Clara", "clara@example.com").into(),
        ("Giuliana", "giuliana@example.com").into(),
    ]
}

pub fn load_from(participants_path: &Path) -> anyhow::Result<Vec<Participant>> {
    debug!("Loading participants from: {participants_path:?}");
    let file_contents = fs::read_to_string(participants_path)
        .with_context(|| format!("Failed to read contents of {participants_path:?}"))?;
    let result = serde_json::from_str(&file_contents)
        .with_context(|| format!("Failed to parse contents of {participants_path:?}"))?;
    Ok(result)
}

/// Reads the participants file if one is given otherwise uses the built in list
pub fn load_or_default(participants_path: Option<&Path>) -> anyhow::Result<Vec<Participant>> {
    match participants_path {
        Some(path) => load_from(path),
        None => {
            debug!("No participants file set. Using built in list");
            Ok(default_participants())
        }
    }
}

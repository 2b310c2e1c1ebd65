use std::{fmt::Display, fs, path::Path};

use anyhow::Context;
use chrono::Local;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{config::Mode, notification::RunSummary};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn now() -> Self {
        Self(format!("{}", Local::now().format("%F %T")))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailedDelivery {
    pub email: String,
    pub reason: String,
}

/// Record of one run, written as JSON when `--report` is given
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunReport {
    pub timestamp: Timestamp,
    pub dry_run: bool,
    pub participants: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedDelivery>,
}

impl RunReport {
    pub fn new(mode: Mode, summary: &RunSummary) -> Self {
        Self {
            timestamp: Timestamp::now(),
            dry_run: mode == Mode::DryRun,
            participants: summary.total(),
            succeeded: summary.succeeded(),
            failed: summary
                .failed()
                .map(|o| FailedDelivery {
                    email: o.email.clone(),
                    reason: o
                        .failure
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                })
                .collect(),
        }
    }

    pub fn write_to(&self, report_path: &Path) -> anyhow::Result<()> {
        debug!("Writing run report to: {report_path:?}");
        let contents =
            serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        fs::write(report_path, contents)
            .with_context(|| format!("Failed to write run report to {report_path:?}"))?;
        info!("Report for run at {} written to {report_path:?}", self.timestamp);
        Ok(())
    }
}

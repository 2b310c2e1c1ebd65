mod cli;
pub mod config;
pub mod game;
mod logging;
pub mod notification;
mod pairing;
mod participant;
mod report;
mod utils;

use std::io::{self, BufRead, Write};

use anyhow::Context;
use log::{info, warn};
use rand::Rng;

pub use cli::{Cli, LogLevel};
pub use config::{Mode, Settings};
pub use logging::{init_logging, LoggingHandle};
pub use pairing::{Assignment, Pairing};
pub use participant::Participant;
pub use report::RunReport;

use notification::{
    check_connectivity,
    confirm::{self, Confirmation},
    Dispatcher, RunSummary, SmtpRelay, Transport,
};

/// How a run of the pairing tool ended
#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// Operator answered something other than yes at the confirmation prompt
    Cancelled,
    /// Input closed at the confirmation prompt
    NoConfirmationInput,
    ConnectionChecked { ok: bool },
    /// Fewer than two participants, nothing was paired or sent
    TooFewParticipants,
}

impl RunOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Completed(_) | RunOutcome::Cancelled | RunOutcome::TooFewParticipants => 0,
            RunOutcome::ConnectionChecked { ok: true } => 0,
            RunOutcome::ConnectionChecked { ok: false } | RunOutcome::NoConfirmationInput => 1,
        }
    }
}

pub fn run(settings: &Settings) -> anyhow::Result<RunOutcome> {
    let participants = participant::load_or_default(settings.participants_path.as_deref())
        .context("Failed to load participants")?;
    let transport = SmtpRelay::from_settings(settings);
    let stdin = io::stdin();
    execute(
        settings,
        participants,
        &transport,
        &mut stdin.lock(),
        &mut io::stdout(),
        &mut rand::rng(),
    )
}

/// Runs the pairing tool against any transport and console
pub fn execute<T, R, W, G>(
    settings: &Settings,
    participants: Vec<Participant>,
    transport: &T,
    input: &mut R,
    out: &mut W,
    rng: &mut G,
) -> anyhow::Result<RunOutcome>
where
    T: Transport + ?Sized,
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    if participants.len() < 2 {
        warn!("Only {} participants, nothing to do", participants.len());
        writeln!(
            out,
            "Se necesitan al menos dos participantes para el Amigo Invisible."
        )?;
        return Ok(RunOutcome::TooFewParticipants);
    }

    let assignment =
        Assignment::generate(participants, rng).context("Unable to create the assignment")?;
    let count = assignment.participants().len();

    if settings.mode == Mode::Live && settings.confirm {
        match confirm::ask(input, out, count).context("Failed to ask for confirmation")? {
            Confirmation::Proceed => info!("Sending confirmed by operator"),
            Confirmation::Declined => {
                writeln!(out, "Cancelado por el usuario. No se envió ningún correo.")?;
                return Ok(RunOutcome::Cancelled);
            }
            Confirmation::NoInput => {
                writeln!(out, "\nNo hay entrada disponible. Envío cancelado.")?;
                return Ok(RunOutcome::NoConfirmationInput);
            }
        }
    }

    if settings.test_connect {
        info!("Testing connection as {}", settings.sender);
        let ok = check_connectivity(
            transport,
            &settings.sender,
            settings.credential.as_ref(),
            out,
        )
        .context("Failed to write to console")?;
        return Ok(RunOutcome::ConnectionChecked { ok });
    }

    let summary = Dispatcher::from_settings(transport, settings)
        .dispatch(&assignment, out)
        .context("Failed to write to console")?;
    summary
        .print_to(out)
        .context("Failed to write to console")?;

    if let Some(report_path) = settings.report_path.as_deref() {
        // Emails are already sent, report failures only warn
        if let Err(e) = RunReport::new(settings.mode, &summary).write_to(report_path) {
            warn!("{e:?}");
            writeln!(out, "ADVERTENCIA: {e:#}")?;
        }
    }

    Ok(RunOutcome::Completed(summary))
}

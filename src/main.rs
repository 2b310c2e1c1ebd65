use std::process::ExitCode;

use clap::Parser;
use log::debug;
use secret_santa::{init_logging, run, Cli, Settings};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let logging = init_logging(cli.log_level.into())?;
    let settings = Settings::load(&cli)?;
    if settings.debug_smtp {
        logging.enable_smtp_trace()?;
    }
    debug!("Running with {settings:?}");
    let outcome = run(&settings)?;
    Ok(ExitCode::from(outcome.exit_code()))
}

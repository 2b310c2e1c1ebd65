// Copied and edited based on https://github.com/estk/log4rs/pull/295

use anyhow::{anyhow, Context};
use log::LevelFilter;
use log4rs::Handle;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::{
            policy::compound::{
                roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy,
            },
            RollingFileAppender,
        },
    },
    config::{Appender, Config, Logger, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

const LOG_FILE_PATH: &str = "log/secret_santa.log";
// Pattern: https://docs.rs/log4rs/*/log4rs/append/rolling_file/policy/compound/roll/fixed_window/struct.FixedWindowRollerBuilder.html#method.build
const LOG_ARCHIVE_PATTERN: &str = "log/secret_santa_{}.log";
/// Our SMTP transport module
const SMTP_LOGGER: &str = "secret_santa::notification::smtp";
/// lettre logs every line written to and read from the server under this target
const LETTRE_SMTP_LOGGER: &str = "lettre::transport::smtp";
const SMTP_TRACE_APPENDER: &str = "smtp_stderr";

/// Keeps logging alive and allows turning on SMTP tracing once settings are known
pub struct LoggingHandle {
    handle: Handle,
    level: LevelFilter,
}

impl LoggingHandle {
    pub fn enable_smtp_trace(&self) -> anyhow::Result<()> {
        let config = build_config(self.level, true)?;
        self.handle.set_config(config);
        Ok(())
    }
}

pub fn init_logging(level: LevelFilter) -> anyhow::Result<LoggingHandle> {
    let config = build_config(level, false)?;

    // Use this to change log levels at runtime.
    let handle = log4rs::init_config(config).context("Failed to init_config")?;

    Ok(LoggingHandle { handle, level })
}

fn build_config(level: LevelFilter, smtp_trace: bool) -> anyhow::Result<Config> {
    // Build a stderr logger.
    let stderr = ConsoleAppender::builder().target(Target::Stderr).build();

    // Create a policy to use with the file logging
    let trigger = SizeTrigger::new(2_097_152); // 2mb (2 * 1024 * 1024)
    let roller = FixedWindowRoller::builder()
        .build(LOG_ARCHIVE_PATTERN, 10) // Roll based on pattern and max 10 archive files
        .map_err(|e| anyhow!("Failed to create FixedWindowRoller: {e}"))?;
    let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));

    // Logging to log file. (with rolling)
    let log_file = RollingFileAppender::builder()
        // Pattern: https://docs.rs/log4rs/*/log4rs/encode/pattern/index.html
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}\n",
        )))
        .build(LOG_FILE_PATH, Box::new(policy))
        .context("Failed to create log file appender")?;

    let mut builder = Config::builder()
        .appender(Appender::builder().build("log_file", Box::new(log_file)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(level)))
                .build("stderr", Box::new(stderr)),
        );

    if smtp_trace {
        let smtp_stderr = ConsoleAppender::builder().target(Target::Stderr).build();
        builder = builder
            .appender(Appender::builder().build(SMTP_TRACE_APPENDER, Box::new(smtp_stderr)))
            .loggers(smtp_trace_loggers());
    }

    let config = builder
        .build(
            Root::builder()
                .appender("log_file")
                .appender("stderr")
                .build(level),
        )
        .context("Failed to configure logging")?;
    Ok(config)
}

/// Trace level loggers writing the SMTP conversation to stderr and the log file
fn smtp_trace_loggers() -> Vec<Logger> {
    [SMTP_LOGGER, LETTRE_SMTP_LOGGER]
        .into_iter()
        .map(|name| {
            Logger::builder()
                .appender(SMTP_TRACE_APPENDER)
                .appender("log_file")
                .additive(false)
                .build(name, LevelFilter::Trace)
        })
        .collect()
}

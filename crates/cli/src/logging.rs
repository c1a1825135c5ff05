// Tracing subscriber setup
// The operator prompt owns stdout: logs go to a daily file, or stderr without one

use crate::config::{LogFormat, LoggingSettings};
use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "resume_match=info";
const LOG_FILE_PREFIX: &str = "resume-match.log";

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process.
pub fn init(settings: &LoggingSettings, directory: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Failed to create env filter")?;

    let (writer, guard, ansi) = match directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), None, true),
    };

    match settings.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(writer))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_ansi(ansi).with_writer(writer))
            .try_init(),
    }
    .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

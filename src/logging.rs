//! Logging configuration
//!
//! Each invocation derives a [`LoggingState`] from its global options and
//! installs it as the current `tracing` subscriber for the rest of the
//! invocation. The state is also handed to collaborators so that child
//! processes write to the same sink.

use crate::{
    cli::args::GlobalOptions,
    error::{FirError, Result},
};
use std::{
    fs::{File, OpenOptions},
    io::IsTerminal,
    path::{Path, PathBuf},
    process::Stdio,
    sync::Mutex,
};
use tracing::dispatcher::DefaultGuard;
use tracing_subscriber::{
    EnvFilter, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Destination for diagnostic output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    Stdout,
    File(PathBuf),
    Null,
}

/// Minimum severity that reaches the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    Info,
    Error,
}

impl Threshold {
    fn directive(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// Sink and threshold for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingState {
    pub sink: Sink,
    pub threshold: Threshold,
}

impl Default for LoggingState {
    fn default() -> Self {
        Self {
            sink: Sink::Stdout,
            threshold: Threshold::Info,
        }
    }
}

/// Derive the logging state from the global options.
///
/// `quiet` discards everything, even when a logfile is given. A blank
/// logfile counts as no logfile.
pub fn configure(options: &GlobalOptions) -> LoggingState {
    let logfile = options
        .logfile
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty());

    let sink = if options.quiet {
        Sink::Null
    } else if let Some(path) = logfile {
        Sink::File(PathBuf::from(path))
    } else {
        Sink::Stdout
    };

    let threshold = if options.verbose {
        Threshold::Info
    } else {
        Threshold::Error
    };

    LoggingState { sink, threshold }
}

impl LoggingState {
    /// Install this state as the subscriber for the current thread.
    ///
    /// The previous subscriber comes back when the returned guard is dropped.
    pub fn install(&self) -> Result<DefaultGuard> {
        let writer = match &self.sink {
            Sink::Stdout => BoxMakeWriter::new(std::io::stdout),
            Sink::File(path) => BoxMakeWriter::new(Mutex::new(open_append(path)?)),
            Sink::Null => BoxMakeWriter::new(std::io::sink),
        };
        let ansi = self.sink == Sink::Stdout && std::io::stdout().is_terminal();

        let subscriber = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(ansi)
                    .with_target(false)
                    .with_level(true)
                    .compact(),
            )
            .with(EnvFilter::new(self.threshold.directive()));

        Ok(subscriber.set_default())
    }

    /// Stdio for a child process writing to this sink
    pub fn child_stdio(&self) -> Result<Stdio> {
        match &self.sink {
            Sink::Stdout => Ok(Stdio::inherit()),
            Sink::File(path) => open_append(path).map(Stdio::from),
            Sink::Null => Ok(Stdio::null()),
        }
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| FirError::file_system("open logfile", path, e))
}

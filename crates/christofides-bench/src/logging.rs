//! Logger setup for the bench binary.
//!
//! The libraries only emit through the `log` facade; this module picks
//! the level and line format and installs `env_logger` on stderr.

use std::io::Write;

use clap::ValueEnum;
use env_logger::{Builder, Target, fmt::Formatter};
use log::{Level, LevelFilter};

use crate::error::{BenchError, Result};

/// Verbosity selected with `--log-level`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The `log` filter that lets through this level and everything
    /// more severe.
    pub const fn to_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

/// Install the global logger: compact `LEVEL message` lines on stderr.
pub fn init_logger(level: LogLevel, timestamp: bool) -> Result<()> {
    let mut builder = Builder::new();
    builder
        .filter_level(level.to_filter())
        .write_style(env_logger::WriteStyle::Never)
        .target(Target::Stderr)
        .format(move |buf: &mut Formatter, record| {
            if timestamp {
                write!(buf, "{} ", buf.timestamp_millis())?;
            }
            writeln!(buf, "{} {}", level_tag(record.level()), record.args())
        });

    builder
        .try_init()
        .map_err(|e| BenchError::Logger(e.to_string()))
}

const fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use clap::ValueEnum;

use crate::exit::{io_error, CliResult};

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> tracing::level_filters::LevelFilter {
        match self {
            LogLevel::Error => tracing::level_filters::LevelFilter::ERROR,
            LogLevel::Warn => tracing::level_filters::LevelFilter::WARN,
            LogLevel::Info => tracing::level_filters::LevelFilter::INFO,
            LogLevel::Debug => tracing::level_filters::LevelFilter::DEBUG,
            LogLevel::Trace => tracing::level_filters::LevelFilter::TRACE,
        }
    }
}

/// Install the global subscriber. Logs go to stderr unless `file` is set;
/// an existing log file is truncated.
pub fn init_logging(format: LogFormat, level: LogLevel, file: Option<&Path>) -> CliResult<()> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(level.as_filter())
        .with_ansi(false)
        .with_target(false);

    match file {
        Some(path) => {
            let file = File::create(path).map_err(|err| {
                io_error(&format!("failed creating log file {}", path.display()), err)
            })?;
            let builder = builder.with_writer(Mutex::new(file));
            match format {
                LogFormat::Text => {
                    let _ = builder.try_init();
                }
                LogFormat::Json => {
                    let _ = builder.json().try_init();
                }
            }
        }
        None => {
            let builder = builder.with_writer(std::io::stderr);
            match format {
                LogFormat::Text => {
                    let _ = builder.try_init();
                }
                LogFormat::Json => {
                    let _ = builder.json().try_init();
                }
            }
        }
    }
    Ok(())
}

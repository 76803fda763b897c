use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use env_logger::{Target, WriteStyle};
use log::LevelFilter;

#[derive(Clone, Copy, Debug)]
pub struct LogLevel(pub LevelFilter);
impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" | "warning" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "off" | "none" => LevelFilter::Off,
            _ => return Err(format!("Invalid log level: {}", s)),
        };
        Ok(LogLevel(level))
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        level.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogMode {
    Both,
    Path,
    Terminal,
    Discard,
}
impl std::str::FromStr for LogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s.to_lowercase().as_str() {
            "both" => LogMode::Both,
            "path" | "file" => LogMode::Path,
            "terminal" | "term" | "cli" => LogMode::Terminal,
            "discard" | "none" => LogMode::Discard,
            _ => return Err(format!("Invalid log mode: {}", s)),
        };
        Ok(mode)
    }
}

///////////////////////////////
/// Sends every log line to stderr and to the log file
struct TeeWriter {
    file: File,
}
impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stderr().flush()?;
        self.file.flush()
    }
}

fn open_log_file(log_path: &PathBuf) -> anyhow::Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {:?}: {}", log_path, e))?;
    Ok(file)
}

pub fn setup_global_logger(
    log_level: LogLevel,
    log_output: LogMode,
    log_path: PathBuf,
) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.format_timestamp_secs();

    match log_output {
        LogMode::Discard => {
            builder.filter_level(LevelFilter::Off);
        }

        LogMode::Terminal => {
            // Colors only when stderr is a terminal
            builder
                .filter_level(log_level.into())
                .target(Target::Stderr)
                .write_style(WriteStyle::Auto);
        }

        LogMode::Path => {
            let file = open_log_file(&log_path)?;
            builder
                .filter_level(log_level.into())
                .target(Target::Pipe(Box::new(file)))
                .write_style(WriteStyle::Never);
        }

        LogMode::Both => {
            let file = open_log_file(&log_path)?;
            builder
                .filter_level(log_level.into())
                .target(Target::Pipe(Box::new(TeeWriter { file })))
                .write_style(WriteStyle::Never);
        }
    };

    builder
        .try_init()
        .map_err(|e| anyhow::anyhow!("Logger already initialized: {}", e))
}

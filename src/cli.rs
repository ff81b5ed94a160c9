use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Parser, Clone, Eq, PartialEq, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "Processes DMCA takedown request config files and sends the notices by email \
                  after showing a preview and asking for confirmation, one file at a time."
)]
pub struct Cli {
    /// Request config file(s) to process, in order (JSON format)
    #[arg(value_name = "PATH", required = true)]
    pub request_files: Vec<PathBuf>,

    /// Specify mail settings file to use
    ///
    /// Holds the SMTP account and addressing used for every notice.
    /// If not specified uses `emailing_config.json` in the working directory
    #[arg(long = "mail-config", short, value_name = "PATH")]
    pub mail_config_filename: Option<String>,

    /// Set logging level to use
    #[arg(long, short, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Cli {
    pub fn mail_config_path(&self) -> PathBuf {
        match self.mail_config_filename.as_ref() {
            Some(val) => PathBuf::from(val),
            None => PathBuf::from("emailing_config.json"),
        }
    }
}

/// Exists to provide better help messages variants copied from LevelFilter as
/// that's the type that is actually needed
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum LogLevel {
    /// Nothing emitted in this mode
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

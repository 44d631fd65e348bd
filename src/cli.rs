use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Parser, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "Emails the newest webcam snapshot as a delivery notification.\n\n\
    The SMTP password is read from the DELIVERY_NOTIFY_PASSWORD environment variable."
)]
pub struct Cli {
    /// Directory the webcam writes its snapshots into
    #[arg(long, value_name = "PATH", env = "DELIVERY_NOTIFY_DIR", default_value = "/mnt/sda1/webcam")]
    pub dir: PathBuf,

    /// SMTP relay to send through
    #[arg(long, env = "DELIVERY_NOTIFY_RELAY_HOST", default_value = "smtp.gmail.com")]
    pub relay_host: String,

    /// Submission port on the relay (must offer STARTTLS)
    #[arg(long, env = "DELIVERY_NOTIFY_RELAY_PORT", default_value_t = 587)]
    pub relay_port: u16,

    /// Sender address, also used as the SMTP username
    #[arg(long, value_name = "ADDRESS", env = "DELIVERY_NOTIFY_FROM")]
    pub from: String,

    /// Recipient address
    #[arg(long, value_name = "ADDRESS", env = "DELIVERY_NOTIFY_TO")]
    pub to: String,

    /// Network timeout in seconds, 0 disables it
    #[arg(long, value_name = "SECS", env = "DELIVERY_NOTIFY_TIMEOUT", default_value_t = 60)]
    pub timeout: u16,

    /// Set logging level to use
    #[arg(long, short, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Also write the log to this file (rolled over at 2MB)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
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

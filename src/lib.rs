mod cli;
mod config;
mod error;
mod logging;
pub mod notification;
mod snapshot;
mod units;

pub use cli::{Cli, LogLevel};
pub use config::{Config, RelaySettings, PASSWORD_ENV_VAR};
pub use error::{BoxError, DeliveryStep, NotifyError};
pub use logging::init_logging;
pub use snapshot::{newest_file, DirectoryEntry};
pub(crate) use units::Seconds;

use log::info;
use notification::{
    compose, LettreRelay, MailSender, Relay, Snapshot, ATTACHMENT_NAME, BODY, SUBJECT,
};

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_cli(&cli)?;
    let sent = notify(&config, LettreRelay)?;
    info!("Sent {:?} to {}", sent.path, config.recipient);
    Ok(())
}

/// Emails the newest file of the watched directory through `relay`.
///
/// The attachment is read and the message built before the relay is
/// contacted, so a local failure never opens a connection.
pub fn notify<R: Relay>(config: &Config, relay: R) -> Result<DirectoryEntry, NotifyError> {
    let newest = newest_file(&config.watch_dir)?;
    info!(
        "Newest file is {:?}, modified {}",
        newest.path,
        newest.modified_display()
    );

    let snapshot = Snapshot::read(&newest)?;
    let message = compose(
        &config.sender,
        &config.recipient,
        SUBJECT,
        BODY,
        snapshot,
        ATTACHMENT_NAME,
    )?;

    MailSender::new(relay, &config.relay).send(&message)?;
    Ok(newest)
}

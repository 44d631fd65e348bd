use std::{env, fmt::Debug, path::PathBuf};

use anyhow::Context;
use log::debug;

use crate::{Cli, Seconds};

/// Name of the environment variable holding the SMTP password
pub const PASSWORD_ENV_VAR: &str = "DELIVERY_NOTIFY_PASSWORD";

/// Everything a run needs, resolved once up front and passed down explicitly
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory to take the newest snapshot from
    pub watch_dir: PathBuf,

    pub relay: RelaySettings,

    pub sender: String,
    pub recipient: String,
}

/// Where and how to reach the SMTP relay
#[derive(Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub timeout: Seconds,
}

impl Config {
    /// Combines the command line (with its environment fallbacks) and the
    /// password from [`PASSWORD_ENV_VAR`]
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        Self::from_cli_with(cli, |name| env::var(name).ok())
    }

    /// Same as [`Config::from_cli`] but looks the password up through `lookup`
    pub fn from_cli_with(
        cli: &Cli,
        lookup: impl FnOnce(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let password = lookup(PASSWORD_ENV_VAR)
            .with_context(|| format!("SMTP password must be set in {PASSWORD_ENV_VAR}"))?;
        let result = Self::new(cli, password);
        debug!("Resolved config: {result:?}");
        Ok(result)
    }

    pub fn new(cli: &Cli, password: String) -> Self {
        Self {
            watch_dir: cli.dir.clone(),
            relay: RelaySettings {
                host: cli.relay_host.clone(),
                port: cli.relay_port,
                username: cli.from.clone(),
                password,
                timeout: cli.timeout.into(),
            },
            sender: cli.from.clone(),
            recipient: cli.to.clone(),
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("watch_dir", &self.watch_dir)
            .field("relay", &self.relay)
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .finish()
    }
}

impl Debug for RelaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaySettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

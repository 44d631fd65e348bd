use std::{fmt::Display, path::PathBuf};

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every way a run can fail. All of them are fatal.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("filesystem error at {path:?}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no file to attach found in {dir:?}")]
    NoAttachment { dir: PathBuf },

    #[error("failed to build message: {reason}")]
    MessageBuild {
        reason: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("delivery failed during {step}")]
    Delivery {
        step: DeliveryStep,
        #[source]
        source: BoxError,
    },
}

impl NotifyError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn message_build(reason: impl Into<String>) -> Self {
        Self::MessageBuild {
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn message_build_with(
        reason: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::MessageBuild {
            reason: reason.into(),
            source: Some(source.into()),
        }
    }

    /// The SMTP step that failed, if this is a delivery error
    pub fn delivery_step(&self) -> Option<DeliveryStep> {
        match self {
            Self::Delivery { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Steps of the SMTP exchange, in the order they are performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeliveryStep {
    /// Open the plaintext connection and exchange EHLO
    Connect,
    /// Upgrade to TLS and exchange EHLO again
    StartTls,
    Authenticate,
    Submit,
    Quit,
}

impl DeliveryStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::StartTls => "starttls",
            Self::Authenticate => "authenticate",
            Self::Submit => "submit",
            Self::Quit => "quit",
        }
    }
}

impl Display for DeliveryStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

mod email;
mod message;

pub use email::{LettreRelay, LettreSession, MailSender, Relay, SmtpSession};
pub use message::{compose, Snapshot, ATTACHMENT_NAME, BODY, SUBJECT};

#[cfg(test)]
pub(crate) use email::tests as scripted;

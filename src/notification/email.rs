use lettre::transport::smtp::{
    authentication::{Credentials, Mechanism},
    client::{SmtpConnection, TlsParameters},
    extension::ClientId,
};
use lettre::Message;
use log::{debug, info, warn};

use crate::{
    config::RelaySettings,
    error::{BoxError, DeliveryStep, NotifyError},
};

/// Something that can open an SMTP session to a relay
pub trait Relay {
    type Session: SmtpSession;

    /// Opens a plaintext connection and exchanges the greeting
    fn connect(&self, settings: &RelaySettings) -> Result<Self::Session, BoxError>;
}

/// One open connection to the relay, driven step by step by [`MailSender`]
pub trait SmtpSession {
    /// Upgrades the connection to TLS and greets again
    fn start_tls(&mut self) -> Result<(), BoxError>;
    fn authenticate(&mut self, credentials: &Credentials) -> Result<(), BoxError>;
    fn submit(&mut self, message: &Message) -> Result<(), BoxError>;
    fn quit(&mut self) -> Result<(), BoxError>;

    /// Drops the connection after a failed step
    fn abort(&mut self) {}
}

/// Sends one message through the relay described by `settings`
pub struct MailSender<'a, R> {
    relay: R,
    settings: &'a RelaySettings,
}

impl<'a, R: Relay> MailSender<'a, R> {
    pub fn new(relay: R, settings: &'a RelaySettings) -> Self {
        Self { relay, settings }
    }

    /// Runs connect, STARTTLS, AUTH, submit and QUIT in that order. Stops at
    /// the first failure, nothing is retried
    pub fn send(&self, message: &Message) -> Result<(), NotifyError> {
        let RelaySettings { host, port, .. } = self.settings;
        info!("Connecting to {host}:{port}");
        let mut session = self
            .relay
            .connect(self.settings)
            .map_err(|source| NotifyError::Delivery {
                step: DeliveryStep::Connect,
                source,
            })?;

        let result = Self::drive(&mut session, self.settings, message);
        if let Err(e) = &result {
            warn!("Aborting SMTP session: {e}");
            session.abort();
        }
        result
    }

    fn drive(
        session: &mut R::Session,
        settings: &RelaySettings,
        message: &Message,
    ) -> Result<(), NotifyError> {
        let credentials = Credentials::new(settings.username.clone(), settings.password.clone());

        step(DeliveryStep::StartTls, || session.start_tls())?;
        step(DeliveryStep::Authenticate, || {
            session.authenticate(&credentials)
        })?;
        step(DeliveryStep::Submit, || session.submit(message))?;
        step(DeliveryStep::Quit, || session.quit())?;
        Ok(())
    }
}

fn step(
    step: DeliveryStep,
    f: impl FnOnce() -> Result<(), BoxError>,
) -> Result<(), NotifyError> {
    debug!("SMTP step: {step}");
    f().map_err(|source| NotifyError::Delivery { step, source })
}

/// The real relay, spoken to with lettre's low level client
#[derive(Debug, Default, Clone, Copy)]
pub struct LettreRelay;

pub struct LettreSession {
    conn: SmtpConnection,
    host: String,
    hello_name: ClientId,
}

impl Relay for LettreRelay {
    type Session = LettreSession;

    fn connect(&self, settings: &RelaySettings) -> Result<Self::Session, BoxError> {
        let hello_name = ClientId::default();
        let conn = SmtpConnection::connect(
            (settings.host.as_str(), settings.port),
            settings.timeout.as_timeout(),
            &hello_name,
            None,
            None,
        )?;
        debug!("Connected to {}, server: {}", settings.host, conn.server_info());
        Ok(LettreSession {
            conn,
            host: settings.host.clone(),
            hello_name,
        })
    }
}

impl SmtpSession for LettreSession {
    fn start_tls(&mut self) -> Result<(), BoxError> {
        if !self.conn.can_starttls() {
            return Err(format!("{} does not offer STARTTLS", self.host).into());
        }
        let tls_parameters = TlsParameters::new(self.host.clone())?;
        self.conn.starttls(&tls_parameters, &self.hello_name)?;
        if !self.conn.is_encrypted() {
            return Err("connection is not encrypted after STARTTLS".into());
        }
        Ok(())
    }

    fn authenticate(&mut self, credentials: &Credentials) -> Result<(), BoxError> {
        let response = self
            .conn
            .auth(&[Mechanism::Plain, Mechanism::Login], credentials)?;
        debug!("AUTH accepted: {:?}", response.code());
        Ok(())
    }

    fn submit(&mut self, message: &Message) -> Result<(), BoxError> {
        let response = self.conn.send(message.envelope(), &message.formatted())?;
        debug!("Message accepted: {:?}", response.message().collect::<Vec<_>>());
        Ok(())
    }

    fn quit(&mut self) -> Result<(), BoxError> {
        self.conn.quit()?;
        Ok(())
    }

    fn abort(&mut self) {
        self.conn.abort();
    }
}

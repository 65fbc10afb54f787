use std::io::Write;
use std::time::Duration;

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use sow_config::SmtpSecrets;
use tracing::info;

use crate::Notification;

/// Port on which the server expects TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;
const SMTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("NOTIFY_ADDRESS: invalid address '{address}': {reason}")]
    Address { address: String, reason: String },
    #[error("NOTIFY_BUILD: {0}")]
    Build(String),
    #[error("NOTIFY_TRANSPORT: {0}")]
    Transport(String),
    #[error("NOTIFY_IO: {0}")]
    Io(#[from] std::io::Error),
}

/// Delivers composed notifications. Failures are surfaced, never retried.
pub trait Notifier {
    fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.trim().parse::<Mailbox>().map_err(|e| NotifyError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// HTML email over SMTP (implicit TLS on 465, STARTTLS otherwise).
pub struct SmtpNotifier {
    mailer: SmtpTransport,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpNotifier {
    pub fn new(secrets: &SmtpSecrets) -> Result<Self, NotifyError> {
        let builder = if secrets.port == IMPLICIT_TLS_PORT {
            SmtpTransport::relay(&secrets.host)
        } else {
            SmtpTransport::starttls_relay(&secrets.host)
        }
        .map_err(|e| NotifyError::Transport(format!("SMTP relay error: {e}")))?;

        let mailer = builder
            .port(secrets.port)
            .credentials(Credentials::new(
                secrets.user.clone(),
                secrets.password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        let to = secrets
            .to
            .iter()
            .map(|a| parse_mailbox(a))
            .collect::<Result<Vec<_>, _>>()?;
        if to.is_empty() {
            return Err(NotifyError::Build("no recipients".to_string()));
        }

        Ok(Self {
            mailer,
            from: parse_mailbox(&secrets.from)?,
            to,
        })
    }

    fn build_message(&self, n: &Notification) -> Result<Message, NotifyError> {
        let mut builder = Message::builder().from(self.from.clone()).subject(n.subject.clone());
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        builder
            .multipart(MultiPart::alternative_plain_html(n.text.clone(), n.html.clone()))
            .map_err(|e| NotifyError::Build(format!("failed to build email: {e}")))
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, n: &Notification) -> Result<(), NotifyError> {
        let email = self.build_message(n)?;
        self.mailer
            .send(&email)
            .map_err(|e| NotifyError::Transport(format!("failed to send email: {e}")))?;
        info!(order_id = %n.order_id, action = n.action.as_str(), recipients = self.to.len(), "email sent");
        Ok(())
    }
}

/// Prints the subject and the plain-text table to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn render(n: &Notification) -> String {
        format!("[{}] {}\n{}", n.action.as_str(), n.subject, n.text)
    }
}

impl Notifier for ConsoleNotifier {
    fn send(&self, n: &Notification) -> Result<(), NotifyError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", Self::render(n))?;
        Ok(())
    }
}

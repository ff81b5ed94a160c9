use anyhow::Context;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    settings::{Addressing, MailSettings, Security},
    template::EmailContent,
};

/// Delivery failure reported by the transport. The reason is carried into
/// the batch summary verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SendError(pub String);

/// The one thing the pipeline needs from a mail backend. Injected so tests
/// never touch the network.
pub trait Mailer {
    fn send(&self, content: &EmailContent) -> Result<(), SendError>;
}

/// Sends notices over SMTP with the account and addressing from the mail
/// settings file.
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
    reply_to: Option<Mailbox>,
    cc: Option<Mailbox>,
}

impl SmtpMailer {
    /// Builds the transport and parses all addresses up front, so a bad
    /// settings file fails the run before any request file is processed.
    pub fn new(settings: &MailSettings) -> anyhow::Result<Self> {
        let smtp = &settings.smtp;
        debug!(
            "Setting up SMTP transport for {}:{} ({:?})",
            smtp.server, smtp.port, smtp.security
        );

        let builder = match smtp.security {
            Security::Ssl => SmtpTransport::relay(&smtp.server)
                .with_context(|| format!("Failed to set up TLS relay to {:?}", smtp.server))?,
            Security::Starttls => SmtpTransport::starttls_relay(&smtp.server)
                .with_context(|| format!("Failed to set up STARTTLS relay to {:?}", smtp.server))?,
            Security::None => {
                warn!("Mail transport configured without encryption; credentials go out in clear text");
                SmtpTransport::builder_dangerous(&smtp.server)
            }
        };
        let transport = builder
            .port(smtp.port)
            .credentials(Credentials::new(smtp.username.clone(), smtp.password.clone()))
            .build();

        let Addressing {
            from_email,
            from_name,
            to_email,
            reply_to,
            cc_email,
        } = &settings.addressing;

        let from = Mailbox::new(
            Some(from_name.clone()),
            from_email
                .parse()
                .with_context(|| format!("Invalid from_email address: {from_email:?}"))?,
        );
        let to = Mailbox::new(
            None,
            to_email
                .parse()
                .with_context(|| format!("Invalid to_email address: {to_email:?}"))?,
        );
        let reply_to = match reply_to.as_ref() {
            Some(addr) => Some(Mailbox::new(
                None,
                addr.parse()
                    .with_context(|| format!("Invalid reply_to address: {addr:?}"))?,
            )),
            None => None,
        };
        let cc = match cc_email.as_ref() {
            Some(addr) => Some(Mailbox::new(
                None,
                addr.parse()
                    .with_context(|| format!("Invalid cc_email address: {addr:?}"))?,
            )),
            None => None,
        };

        Ok(Self {
            transport,
            from,
            to,
            reply_to,
            cc,
        })
    }

    fn build_message(&self, content: &EmailContent) -> anyhow::Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(content.subject.clone());
        if let Some(reply_to) = self.reply_to.clone() {
            builder = builder.reply_to(reply_to);
        }
        if let Some(cc) = self.cc.clone() {
            builder = builder.cc(cc);
        }
        builder
            .header(ContentType::TEXT_PLAIN)
            .body(content.body.clone())
            .context("Failed to assemble mail message")
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, content: &EmailContent) -> Result<(), SendError> {
        let message = self
            .build_message(content)
            .map_err(|e| SendError(format!("{e:#}")))?;

        debug!("Connecting to SMTP server to deliver {:?}", content.subject);
        match self.transport.send(&message) {
            Ok(response) => {
                info!("SMTP server accepted the message ({})", response.code());
                Ok(())
            }
            Err(e) => Err(SendError(e.to_string())),
        }
    }
}

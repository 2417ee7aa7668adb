use std::fs;
use std::path::PathBuf;

use lettre::address::AddressError;
use lettre::message::header::{ContentType, ContentTypeErr};
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{FileTransport, Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::config::EmailConfig;

const PNG: &str = "image/png";

#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },
    #[error("no recipients")]
    NoRecipients,
    #[error(transparent)]
    ContentType(#[from] ContentTypeErr),
    #[error(transparent)]
    Build(#[from] lettre::error::Error),
    #[error(transparent)]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error(transparent)]
    Outbox(#[from] lettre::transport::file::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// PNG shown inline in the HTML body, referenced there as `cid:<content_id>`
#[derive(Clone, Debug)]
pub struct InlineImage {
    pub content_id: String,
    pub png: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct Email {
    pub subject: String,
    pub html: String,
    pub images: Vec<InlineImage>,
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

impl Email {
    pub fn to_message(&self, from: &Mailbox, recipients: &[String]) -> Result<Message, MailError> {
        if recipients.is_empty() {
            return Err(MailError::NoRecipients);
        }
        let mut builder = Message::builder().from(from.clone()).subject(&self.subject);
        for recipient in recipients {
            builder = builder.to(mailbox(recipient)?);
        }

        let png: ContentType = PNG.parse()?;
        let mut body = MultiPart::related().singlepart(SinglePart::html(self.html.clone()));
        for image in &self.images {
            body = body.singlepart(
                Attachment::new_inline(image.content_id.clone())
                    .body(image.png.clone(), png.clone()),
            );
        }
        Ok(builder.multipart(body)?)
    }
}

/// Outgoing mail, either over authenticated SMTP or into a local outbox directory
pub enum Mailer {
    Smtp {
        transport: SmtpTransport,
        sender: Mailbox,
        relay: String,
    },
    Outbox {
        transport: FileTransport,
        sender: Mailbox,
        dir: PathBuf,
    },
}

impl Mailer {
    pub fn from_config(config: &EmailConfig) -> Result<Self, MailError> {
        let sender = mailbox(&config.sender)?;
        if let Some(dir) = &config.outbox_dir {
            fs::create_dir_all(dir)?;
            return Ok(Mailer::Outbox {
                transport: FileTransport::new(dir),
                sender,
                dir: dir.clone(),
            });
        }

        let transport = SmtpTransport::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.sender.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Mailer::Smtp {
            transport,
            sender,
            relay: format!("{}:{}", config.smtp_host, config.smtp_port),
        })
    }

    fn sender(&self) -> &Mailbox {
        match self {
            Mailer::Smtp { sender, .. } | Mailer::Outbox { sender, .. } => sender,
        }
    }

    pub fn send(&self, email: &Email, recipients: &[String]) -> Result<(), MailError> {
        let message = email.to_message(self.sender(), recipients)?;
        match self {
            Mailer::Smtp { transport, relay, .. } => {
                log::debug!("Sending '{}' via {relay}", email.subject);
                transport.send(&message)?;
            }
            Mailer::Outbox { transport, dir, .. } => {
                let id = transport.send(&message)?;
                log::info!("Wrote '{}' to {}/{id}.eml", email.subject, dir.display());
            }
        }
        log::info!("Sent '{}' to {}", email.subject, recipients.join(", "));
        Ok(())
    }

    /// Connects and authenticates without sending anything
    pub fn test_connection(&self) -> Result<bool, MailError> {
        match self {
            Mailer::Smtp { transport, .. } => Ok(transport.test_connection()?),
            Mailer::Outbox { dir, .. } => Ok(dir.is_dir()),
        }
    }
}

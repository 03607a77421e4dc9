//! Mail submission seam.
//!
//! This module provides the digest-sending interface and its SMTP
//! implementation over an implicit-TLS submission channel.

use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::debug;

/// Errors raised while building or submitting a mail.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build mail message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Capability to submit a plain-text digest to the configured recipients.
///
/// Injected into the dispatch driver so tests can substitute a mock.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<(), MailError>;
}

/// SMTP mailer over implicit TLS (port 465 by default).
///
/// The sender address doubles as the login user; recipients are the
/// configured to-address plus the optional cc-address.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    cc: Option<Mailbox>,
}

impl SmtpMailer {
    /// Build a mailer from the SMTP configuration.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let from: Mailbox = config.from_email.parse()?;
        let to: Mailbox = config.to_email.parse()?;
        let cc: Option<Mailbox> = if config.cc_email.is_empty() {
            None
        } else {
            Some(config.cc_email.parse()?)
        };

        let credentials =
            Credentials::new(config.from_email.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.relay)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from,
            to,
            cc,
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, subject: &str, body: &str) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);

        if let Some(ref cc) = self.cc {
            builder = builder.cc(cc.clone());
        }

        let message = builder.body(body.to_string())?;

        debug!("Submitting digest mail ({} bytes)", body.len());
        self.transport.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp_config() -> SmtpConfig {
        SmtpConfig {
            from_email: "bot@example.com".to_string(),
            to_email: "manager@example.com".to_string(),
            cc_email: "lead@example.com".to_string(),
            password: "app-password".to_string(),
            ..SmtpConfig::default()
        }
    }

    #[tokio::test]
    async fn test_mailer_builds_from_config() {
        let mailer = SmtpMailer::new(&smtp_config()).unwrap();
        assert_eq!(mailer.from.email.to_string(), "bot@example.com");
        assert_eq!(mailer.to.email.to_string(), "manager@example.com");
        assert!(mailer.cc.is_some());
    }

    #[tokio::test]
    async fn test_empty_cc_is_skipped() {
        let mut config = smtp_config();
        config.cc_email = String::new();

        let mailer = SmtpMailer::new(&config).unwrap();
        assert!(mailer.cc.is_none());
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let mut config = smtp_config();
        config.to_email = "not an address".to_string();

        let result = SmtpMailer::new(&config);
        assert!(matches!(result, Err(MailError::Address(_))));
    }
}

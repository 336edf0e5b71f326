//! Outbound mail transport.
//!
//! [`SmtpMailer`] talks to an SMTP relay (SendGrid by default) through lettre.
//! The transport is built once at startup; when no API key is configured the
//! mailer stays in place but every send fails.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use uuid::Uuid;

use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};
use crate::models::{OutgoingEmail, SentEmail};

/// Delivers a rendered email
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> AppResult<SentEmail>;

    /// Whether a transport is available at all
    fn is_configured(&self) -> bool;
}

pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        let from = match &config.from_email {
            Some(email) => Some(Mailbox::new(
                config.from_name.clone(),
                parse_address(email)?,
            )),
            None => None,
        };

        let transport = match &config.api_key {
            Some(api_key) => Some(build_transport(config, api_key)?),
            None => {
                log::warn!("SendGrid API key not found. Email functionality will be disabled.");
                None
            }
        };

        Ok(Self { transport, from })
    }

    fn build_message(&self, email: &OutgoingEmail) -> AppResult<(Message, String)> {
        let from = match &email.from {
            Some(from) => from
                .parse::<Mailbox>()
                .map_err(|e| AppError::Validation(format!("Invalid sender address: {}", e)))?,
            None => self.from.clone().ok_or_else(|| {
                AppError::Internal("Sender address not configured".to_string())
            })?,
        };

        // Message-ID domain follows the sender
        let message_id = format!("<{}@{}>", Uuid::new_v4(), from.email.domain());

        let mut builder = Message::builder()
            .from(from)
            .subject(&email.subject)
            .message_id(Some(message_id.clone()));

        for recipient in &email.to {
            let mailbox = recipient.parse::<Mailbox>().map_err(|e| {
                AppError::Validation(format!("Invalid email recipient {}: {}", recipient, e))
            })?;
            builder = builder.to(mailbox);
        }

        if let Some(reply_to) = &email.reply_to {
            let mailbox = reply_to
                .parse::<Mailbox>()
                .map_err(|e| AppError::Validation(format!("Invalid reply-to address: {}", e)))?;
            builder = builder.reply_to(mailbox);
        }

        let message = match (&email.text, &email.html) {
            (Some(text), Some(html)) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.clone()),
                    ),
            ),
            (None, Some(html)) => builder.singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(html.clone()),
            ),
            (Some(text), None) => builder.singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(text.clone()),
            ),
            (None, None) => builder.body(String::new()),
        }
        .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        Ok((message, message_id))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<SentEmail> {
        let transport = self.transport.as_ref().ok_or_else(|| {
            AppError::EmailDelivery("Email transporter not configured".to_string())
        })?;

        if email.to.is_empty() {
            return Err(AppError::Validation(
                "At least one email recipient is required".to_string(),
            ));
        }

        let (message, message_id) = self.build_message(&email)?;

        match transport.send(message).await {
            Ok(_) => {
                log::info!("Email sent successfully: {}", message_id);
                Ok(SentEmail { message_id })
            }
            Err(e) => {
                log::error!("Failed to send email to {}: {}", email.to.join(", "), e);
                Err(AppError::EmailDelivery(e.to_string()))
            }
        }
    }

    fn is_configured(&self) -> bool {
        self.transport.is_some()
    }
}

fn parse_address(email: &str) -> AppResult<Address> {
    email
        .parse::<Address>()
        .map_err(|e| AppError::Validation(format!("Invalid sender address {}: {}", email, e)))
}

/// Port 465 = implicit TLS (SMTPS), anything else = STARTTLS
fn build_transport(
    config: &EmailConfig,
    api_key: &str,
) -> AppResult<AsyncSmtpTransport<Tokio1Executor>> {
    let builder = if config.smtp_port == 465 {
        let tls_params = TlsParameters::new(config.smtp_host.clone()).map_err(|e| {
            AppError::Internal(format!("Invalid TLS parameters for SMTP host: {}", e))
        })?;

        AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map(|b| b.port(config.smtp_port).tls(Tls::Wrapper(tls_params)))
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map(|b| b.port(config.smtp_port))
    }
    .map_err(|e| AppError::Internal(format!("Invalid SMTP host: {}", e)))?;

    Ok(builder
        .credentials(Credentials::new(
            config.smtp_username.clone(),
            api_key.to_string(),
        ))
        .build())
}

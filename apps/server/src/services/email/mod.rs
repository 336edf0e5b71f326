//! Transactional email flows.
//!
//! Every recipient-facing send checks the disposable-domain denylist first and
//! only then consumes rate-limit quota, so a refused domain never burns an
//! attempt. Quota is consumed before the transport is called and is not
//! refunded when delivery fails.

pub mod mailer;
pub mod templates;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use url::form_urlencoded;

use super::domain::DomainPolicy;
use super::rate_limit::EmailRateLimiter;
use crate::config::{Config, EmailConfig};
use crate::error::{AppError, AppResult};
use crate::models::{EmailCategory, EmailContent, OutgoingEmail, SentEmail};

pub use mailer::{Mailer, SmtpMailer};
pub use templates::EmailTemplate;

// =============================================================================
// Health reporting
// =============================================================================

/// Outcome of a configuration self-test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailHealth {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmailHealth {
    fn healthy() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Sender settings exposed to administrators (never the API key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpSummary {
    pub configured: bool,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
}

// =============================================================================
// Email Service
// =============================================================================

pub struct EmailService {
    mailer: Arc<dyn Mailer>,
    limiter: Arc<EmailRateLimiter>,
    domains: DomainPolicy,
    public_url: String,
    admin_email: Option<String>,
    email: EmailConfig,
}

impl EmailService {
    pub fn new(config: &Config, mailer: Arc<dyn Mailer>, limiter: Arc<EmailRateLimiter>) -> Self {
        Self {
            mailer,
            domains: DomainPolicy::with_additional(&limiter.config().blocked_domains),
            limiter,
            public_url: config.public_url.trim_end_matches('/').to_string(),
            admin_email: config.admin.notification_email.clone(),
            email: config.email.clone(),
        }
    }

    pub fn limiter(&self) -> &Arc<EmailRateLimiter> {
        &self.limiter
    }

    pub async fn send_password_reset(
        &self,
        email: &str,
        token: &str,
        user_agent: Option<&str>,
    ) -> AppResult<SentEmail> {
        self.ensure_domain_allowed(email)?;
        if !self
            .limiter
            .check_and_consume(email, EmailCategory::PasswordReset)
        {
            return Err(AppError::RateLimited(
                "Too many password reset attempts. Please try again later.".to_string(),
            ));
        }

        let template = templates::password_reset(&self.token_url("reset-password", token), None);

        log::info!(
            "Password reset requested for: {} (user agent: {})",
            email,
            user_agent.unwrap_or("unknown")
        );

        self.deliver(vec![email.to_string()], template).await
    }

    pub async fn send_email_verification(
        &self,
        email: &str,
        token: &str,
        user_agent: Option<&str>,
    ) -> AppResult<SentEmail> {
        self.ensure_domain_allowed(email)?;
        if !self
            .limiter
            .check_and_consume(email, EmailCategory::EmailVerification)
        {
            return Err(AppError::RateLimited(
                "Too many verification attempts. Please try again later.".to_string(),
            ));
        }

        let template = templates::email_verification(&self.token_url("verify-email", token), None);

        log::info!(
            "Email verification sent to: {} (user agent: {})",
            email,
            user_agent.unwrap_or("unknown")
        );

        self.deliver(vec![email.to_string()], template).await
    }

    /// All recipients are checked against the denylist before any quota is
    /// consumed. Quota taken for earlier recipients is kept when a later one
    /// is over its limit.
    pub async fn send_general_email(
        &self,
        recipients: &[String],
        subject: &str,
        content: EmailContent,
        user_agent: Option<&str>,
    ) -> AppResult<SentEmail> {
        if recipients.is_empty() {
            return Err(AppError::Validation(
                "At least one email recipient is required".to_string(),
            ));
        }

        for email in recipients {
            self.ensure_domain_allowed(email)?;
        }

        for email in recipients {
            if !self.limiter.check_and_consume(email, EmailCategory::General) {
                return Err(AppError::RateLimited(format!(
                    "Rate limit exceeded for recipient: {}",
                    email
                )));
            }
        }

        log::info!(
            "General email sent to: {} (subject: {}, user agent: {})",
            recipients.join(", "),
            subject,
            user_agent.unwrap_or("unknown")
        );

        self.mailer
            .send(OutgoingEmail {
                to: recipients.to_vec(),
                subject: subject.to_string(),
                html: content.html,
                text: content.text,
                ..Default::default()
            })
            .await
    }

    /// Returns `None` when no administrator address is configured
    pub async fn send_admin_notification(
        &self,
        subject: &str,
        message: &str,
        data: Option<&Value>,
    ) -> AppResult<Option<SentEmail>> {
        let Some(admin_email) = &self.admin_email else {
            log::warn!("Admin email not configured for notifications");
            return Ok(None);
        };

        let template = templates::admin_notification(subject, message, data, Utc::now());
        self.deliver(vec![admin_email.clone()], template)
            .await
            .map(Some)
    }

    /// Checks required settings, then sends a test message to the sender
    /// address itself.
    pub async fn test_email_config(&self) -> EmailHealth {
        if self.email.api_key.is_none() {
            return EmailHealth::unhealthy("SendGrid API key not configured");
        }

        let Some(from_email) = &self.email.from_email else {
            return EmailHealth::unhealthy("SendGrid from email not configured");
        };

        let result = self
            .mailer
            .send(OutgoingEmail {
                to: vec![from_email.clone()],
                subject: "Email Configuration Test".to_string(),
                text: Some(
                    "This is a test email to verify SendGrid configuration.".to_string(),
                ),
                html: Some(
                    "<p>This is a test email to verify SendGrid configuration.</p>".to_string(),
                ),
                ..Default::default()
            })
            .await;

        match result {
            Ok(_) => EmailHealth::healthy(),
            Err(AppError::EmailDelivery(message)) => EmailHealth::unhealthy(message),
            Err(e) => EmailHealth::unhealthy(e.to_string()),
        }
    }

    pub fn smtp_summary(&self) -> SmtpSummary {
        SmtpSummary {
            configured: self.mailer.is_configured(),
            from_email: self.email.from_email.clone(),
            from_name: self.email.from_name.clone(),
        }
    }

    fn ensure_domain_allowed(&self, email: &str) -> AppResult<()> {
        if self.domains.is_allowed(email) {
            Ok(())
        } else {
            log::warn!("Refused email to blocked domain: {}", email);
            Err(AppError::DomainNotAllowed(email.to_string()))
        }
    }

    fn token_url(&self, page: &str, token: &str) -> String {
        let token: String = form_urlencoded::byte_serialize(token.as_bytes()).collect();
        format!("{}/admin/{}?token={}", self.public_url, page, token)
    }

    async fn deliver(&self, to: Vec<String>, template: EmailTemplate) -> AppResult<SentEmail> {
        self.mailer
            .send(OutgoingEmail {
                to,
                subject: template.subject,
                html: Some(template.html),
                text: Some(template.text),
                ..Default::default()
            })
            .await
    }
}

//! Unit tests for the transactional email flows
//!
//! Uses an in-memory mailer; no SMTP connection is made.

use billboard::config::Config;
use billboard::error::AppError;
use billboard::models::{EmailCategory, EmailContent};
use billboard::services::{EmailRateLimiter, EmailService, Mailer};
use serde_json::json;
use std::sync::Arc;

use crate::common::{test_config, FailingMailer, RecordingMailer};

fn service_with(config: &Config, mailer: Arc<dyn Mailer>) -> EmailService {
    let limiter = Arc::new(EmailRateLimiter::new(config.rate_limit.clone()));
    EmailService::new(config, mailer, limiter)
}

fn recording() -> (EmailService, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    (service_with(&test_config(), mailer.clone()), mailer)
}

// =============================================================================
// Password Reset
// =============================================================================

#[tokio::test]
async fn test_password_reset_sends_link() {
    let (service, mailer) = recording();

    let sent = service
        .send_password_reset("user@example.com", "tok en/1", Some("Mozilla/5.0"))
        .await
        .unwrap();

    assert!(sent.message_id.starts_with("<test-"));
    let emails = mailer.sent();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, vec!["user@example.com".to_string()]);
    assert_eq!(emails[0].subject, "Reset Your Password");
    assert!(emails[0]
        .text
        .as_deref()
        .unwrap()
        .contains("https://site.test/admin/reset-password?token=tok+en%2F1"));
}

#[tokio::test]
async fn test_fourth_password_reset_is_rate_limited() {
    let (service, mailer) = recording();

    for _ in 0..3 {
        service
            .send_password_reset("user@example.com", "t", None)
            .await
            .unwrap();
    }
    let err = service
        .send_password_reset("user@example.com", "t", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::RateLimited(_)));
    assert_eq!(
        err.to_string(),
        "Too many password reset attempts. Please try again later."
    );
    assert_eq!(mailer.sent().len(), 3);
}

#[tokio::test]
async fn test_blocked_domain_consumes_no_quota() {
    let (service, mailer) = recording();

    let err = service
        .send_password_reset("user@mailinator.com", "t", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DomainNotAllowed(_)));
    assert!(mailer.sent().is_empty());
    assert!(service.limiter().is_empty());
}

#[tokio::test]
async fn test_failed_delivery_keeps_consumed_quota() {
    let config = test_config();
    let service = service_with(&config, Arc::new(FailingMailer));

    let err = service
        .send_password_reset("user@example.com", "t", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::EmailDelivery(_)));
    let status = service.limiter().status("user@example.com");
    assert_eq!(status[EmailCategory::PasswordReset.key_prefix()].count, 1);
}

// =============================================================================
// Verification
// =============================================================================

#[tokio::test]
async fn test_verification_uses_its_own_limit() {
    let (service, mailer) = recording();

    for _ in 0..5 {
        service
            .send_email_verification("user@example.com", "v", None)
            .await
            .unwrap();
    }
    let err = service
        .send_email_verification("user@example.com", "v", None)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Too many verification attempts. Please try again later."
    );

    // Password reset quota is untouched
    service
        .send_password_reset("user@example.com", "t", None)
        .await
        .unwrap();

    let emails = mailer.sent();
    assert_eq!(emails.len(), 6);
    assert!(emails[0]
        .html
        .as_deref()
        .unwrap()
        .contains("https://site.test/admin/verify-email?token=v"));
}

// =============================================================================
// General Email
// =============================================================================

#[tokio::test]
async fn test_general_email_to_many_recipients() {
    let (service, mailer) = recording();
    let recipients = vec!["a@example.com".to_string(), "b@example.com".to_string()];

    service
        .send_general_email(
            &recipients,
            "Newsletter",
            EmailContent {
                html: Some("<p>Hi</p>".to_string()),
                text: None,
            },
            None,
        )
        .await
        .unwrap();

    let emails = mailer.sent();
    assert_eq!(emails[0].to, recipients);
    assert_eq!(emails[0].text, None);
    assert_eq!(
        service.limiter().status("b@example.com")["general"].count,
        1
    );
}

#[tokio::test]
async fn test_general_email_checks_every_domain_first() {
    let (service, mailer) = recording();
    let recipients = vec![
        "a@example.com".to_string(),
        "b@guerrillamail.com".to_string(),
    ];

    let err = service
        .send_general_email(&recipients, "Hi", EmailContent::default(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DomainNotAllowed(_)));
    assert!(service.limiter().is_empty());
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_general_email_names_limited_recipient() {
    let mut config = test_config();
    config.rate_limit.general.max_attempts = 1;
    let mailer = Arc::new(RecordingMailer::default());
    let service = service_with(&config, mailer.clone());

    service
        .send_general_email(&["b@example.com".to_string()], "First", EmailContent::default(), None)
        .await
        .unwrap();

    let err = service
        .send_general_email(
            &["a@example.com".to_string(), "b@example.com".to_string()],
            "Second",
            EmailContent::default(),
            None,
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Rate limit exceeded for recipient: b@example.com");
    assert_eq!(mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_general_email_requires_recipients() {
    let (service, _) = recording();
    let err = service
        .send_general_email(&[], "Hi", EmailContent::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_configured_blocked_domains_apply() {
    let mut config = test_config();
    config.rate_limit.blocked_domains = vec!["spam.example".to_string()];
    let service = service_with(&config, Arc::new(RecordingMailer::default()));

    let err = service
        .send_email_verification("x@SPAM.example", "v", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DomainNotAllowed(_)));
}

// =============================================================================
// Admin Notification & Health
// =============================================================================

#[tokio::test]
async fn test_admin_notification_goes_to_admin() {
    let (service, mailer) = recording();

    let sent = service
        .send_admin_notification("Login storm", "50 failures", Some(&json!({ "ip": "10.1.1.1" })))
        .await
        .unwrap();

    assert!(sent.is_some());
    let emails = mailer.sent();
    assert_eq!(emails[0].to, vec!["admin@site.test".to_string()]);
    assert_eq!(emails[0].subject, "[SECURITY ALERT] Login storm");
}

#[tokio::test]
async fn test_admin_notification_skipped_without_admin_email() {
    let mut config = test_config();
    config.admin.notification_email = None;
    let mailer = Arc::new(RecordingMailer::default());
    let service = service_with(&config, mailer.clone());

    let sent = service
        .send_admin_notification("Login storm", "50 failures", None)
        .await
        .unwrap();

    assert!(sent.is_none());
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_health_reports_missing_configuration() {
    let mut config = test_config();
    config.email.api_key = None;
    let health = service_with(&config, Arc::new(RecordingMailer::default()))
        .test_email_config()
        .await;
    assert!(!health.success);
    assert_eq!(health.error.as_deref(), Some("SendGrid API key not configured"));

    let mut config = test_config();
    config.email.from_email = None;
    let health = service_with(&config, Arc::new(RecordingMailer::default()))
        .test_email_config()
        .await;
    assert_eq!(health.error.as_deref(), Some("SendGrid from email not configured"));
}

#[tokio::test]
async fn test_health_self_send() {
    let (service, mailer) = recording();
    let health = service.test_email_config().await;

    assert!(health.success);
    let emails = mailer.sent();
    assert_eq!(emails[0].to, vec!["noreply@site.test".to_string()]);
    assert_eq!(emails[0].subject, "Email Configuration Test");

    let failing = service_with(&test_config(), Arc::new(FailingMailer));
    let health = failing.test_email_config().await;
    assert!(!health.success);
    assert_eq!(health.error.as_deref(), Some("Connection refused"));
}

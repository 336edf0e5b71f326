//! HTML and plain-text bodies for the transactional emails.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Rendered subject and bodies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplate {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Simple HTML escaping for email content
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn greeting(user_name: Option<&str>) -> String {
    match user_name {
        Some(name) if !name.is_empty() => format!("Hello {},", name),
        _ => "Hello,".to_string(),
    }
}

pub fn password_reset(reset_url: &str, user_name: Option<&str>) -> EmailTemplate {
    let greeting = greeting(user_name);

    EmailTemplate {
        subject: "Reset Your Password".to_string(),
        html: format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <h2>Password Reset Request</h2>
    <p>{greeting}</p>
    <p>You requested a password reset for your account. Click the button below to reset your password:</p>
    <div style="text-align: center; margin: 30px 0;">
        <a href="{url}" style="background-color: #007cba; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; display: inline-block;">
            Reset Password
        </a>
    </div>
    <p>If you didn't request this password reset, please ignore this email.</p>
    <p>This link will expire in 1 hour for security reasons.</p>
    <hr style="margin: 30px 0; border: none; border-top: 1px solid #eee;">
    <p style="color: #666; font-size: 12px;">
        If the button doesn't work, copy and paste this link into your browser:<br>
        <a href="{url}">{url}</a>
    </p>
</div>"#,
            greeting = html_escape(&greeting),
            url = html_escape(reset_url),
        ),
        text: format!(
            r#"Password Reset Request

{greeting}

You requested a password reset for your account.
Please visit the following link to reset your password:

{url}

If you didn't request this password reset, please ignore this email.
This link will expire in 1 hour for security reasons."#,
            greeting = greeting,
            url = reset_url,
        ),
    }
}

pub fn email_verification(verify_url: &str, user_name: Option<&str>) -> EmailTemplate {
    let greeting = greeting(user_name);

    EmailTemplate {
        subject: "Verify Your Email Address".to_string(),
        html: format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <h2>Verify Your Email Address</h2>
    <p>{greeting}</p>
    <p>Please verify your email address by clicking the button below:</p>
    <div style="text-align: center; margin: 30px 0;">
        <a href="{url}" style="background-color: #28a745; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; display: inline-block;">
            Verify Email
        </a>
    </div>
    <p>If you didn't create this account, please ignore this email.</p>
    <hr style="margin: 30px 0; border: none; border-top: 1px solid #eee;">
    <p style="color: #666; font-size: 12px;">
        If the button doesn't work, copy and paste this link into your browser:<br>
        <a href="{url}">{url}</a>
    </p>
</div>"#,
            greeting = html_escape(&greeting),
            url = html_escape(verify_url),
        ),
        text: format!(
            r#"Verify Your Email Address

{greeting}

Please verify your email address by visiting the following link:

{url}

If you didn't create this account, please ignore this email."#,
            greeting = greeting,
            url = verify_url,
        ),
    }
}

/// Security alert sent to the site administrator
pub fn admin_notification(
    subject: &str,
    message: &str,
    data: Option<&Value>,
    timestamp: DateTime<Utc>,
) -> EmailTemplate {
    let timestamp = timestamp.to_rfc3339();

    let details = data
        .and_then(|d| serde_json::to_string_pretty(d).ok())
        .map(|json| {
            format!(
                r#"
    <h3>Additional Information:</h3>
    <pre style="background: #f8f9fa; padding: 15px; border-radius: 4px; overflow-x: auto;">{}</pre>"#,
                html_escape(&json)
            )
        })
        .unwrap_or_default();

    EmailTemplate {
        subject: format!("[SECURITY ALERT] {}", subject),
        html: format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px;">
    <h2 style="color: #dc3545;">Security Alert</h2>
    <p><strong>Subject:</strong> {subject}</p>
    <p><strong>Message:</strong> {message}</p>{details}
    <p><strong>Timestamp:</strong> {timestamp}</p>
</div>"#,
            subject = html_escape(subject),
            message = html_escape(message),
            details = details,
            timestamp = timestamp,
        ),
        text: format!(
            "Security Alert: {}\n\n{}\n\nTimestamp: {}",
            subject, message, timestamp
        ),
    }
}

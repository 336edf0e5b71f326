use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Email flows with independent per-recipient rate limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmailCategory {
    #[serde(rename = "pwd_reset", alias = "password-reset")]
    PasswordReset,
    #[serde(rename = "email_verify", alias = "email-verification")]
    EmailVerification,
    #[serde(rename = "general")]
    General,
}

impl EmailCategory {
    pub const ALL: [EmailCategory; 3] = [
        EmailCategory::PasswordReset,
        EmailCategory::EmailVerification,
        EmailCategory::General,
    ];

    /// Prefix of the rate-limit key, `{prefix}:{email}`
    pub fn key_prefix(&self) -> &'static str {
        match self {
            EmailCategory::PasswordReset => "pwd_reset",
            EmailCategory::EmailVerification => "email_verify",
            EmailCategory::General => "general",
        }
    }

    /// Key for `email`, trimmed and lowercased so case variants share a quota
    pub fn rate_limit_key(&self, email: &str) -> String {
        format!("{}:{}", self.key_prefix(), email.trim().to_lowercase())
    }
}

impl std::fmt::Display for EmailCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key_prefix())
    }
}

/// Fixed-window counter for one `{category}:{email}` key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub count: u32,
    pub reset_time: DateTime<Utc>,
}

/// Rate-limit state reported to administrators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    pub count: u32,
    pub reset_time: Option<DateTime<Utc>>,
    pub remaining: u32,
}

/// A message handed to the mail transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
    /// Overrides the configured sender address
    pub from: Option<String>,
    pub reply_to: Option<String>,
}

/// Transport acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentEmail {
    pub message_id: String,
}

/// Body of a general email
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailContent {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// DTO for clearing a recipient's rate limits
#[derive(Debug, Deserialize)]
pub struct ClearRateLimit {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "type", default)]
    pub category: Option<EmailCategory>,
}

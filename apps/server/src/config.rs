use std::env;
use std::time::Duration;

use crate::models::EmailCategory;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Public base URL of the site, used for reset/verification links
    pub public_url: String,
    pub admin: AdminConfig,
    pub email: EmailConfig,
    pub rate_limit: EmailRateLimitConfig,
}

/// Administrative surface configuration
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Bearer token for the admin endpoints. When unset every admin request is rejected.
    pub api_token: Option<String>,
    /// Recipient for security alert notifications
    pub notification_email: Option<String>,
}

/// Outbound mail transport configuration (SendGrid SMTP relay by default)
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// SendGrid authenticates with the literal username "apikey"
    pub smtp_username: String,
    pub api_key: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
}

/// A fixed-window limit for one email category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimit {
    pub max_attempts: u32,
    pub window: Duration,
}

/// Per-recipient email rate limits
#[derive(Debug, Clone)]
pub struct EmailRateLimitConfig {
    pub password_reset: WindowLimit,
    pub email_verification: WindowLimit,
    pub general: WindowLimit,
    /// Extra disposable domains blocked on top of the built-in list
    pub blocked_domains: Vec<String>,
    /// How often expired rate-limit records are swept from memory
    pub purge_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let public_url = env::var("PUBLIC_SERVER_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        url::Url::parse(&public_url).map_err(|_| ConfigError::InvalidPublicUrl)?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            public_url,
            admin: AdminConfig::from_env(),
            email: EmailConfig::from_env()?,
            rate_limit: EmailRateLimitConfig::from_env(),
        })
    }
}

impl AdminConfig {
    pub fn from_env() -> Self {
        Self {
            api_token: non_empty_var("ADMIN_API_TOKEN"),
            notification_email: non_empty_var("ADMIN_EMAIL"),
        }
    }
}

impl EmailConfig {
    /// Load mail transport configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.sendgrid.net".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidSmtpPort)?,
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_else(|_| "apikey".to_string()),
            api_key: non_empty_var("SENDGRID_API_KEY"),
            from_email: non_empty_var("SENDGRID_FROM_EMAIL"),
            from_name: non_empty_var("SENDGRID_FROM_NAME"),
        })
    }

    /// Names of required variables that are not set
    pub fn missing_vars(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_key.is_none() {
            missing.push("SENDGRID_API_KEY");
        }
        if self.from_email.is_none() {
            missing.push("SENDGRID_FROM_EMAIL");
        }
        missing
    }
}

impl Default for EmailRateLimitConfig {
    fn default() -> Self {
        Self {
            password_reset: WindowLimit {
                max_attempts: 3,
                window: Duration::from_secs(15 * 60),
            },
            email_verification: WindowLimit {
                max_attempts: 5,
                window: Duration::from_secs(60 * 60),
            },
            general: WindowLimit {
                max_attempts: 10,
                window: Duration::from_secs(60 * 60),
            },
            blocked_domains: Vec::new(),
            purge_interval: Duration::from_secs(5 * 60),
        }
    }
}

impl EmailRateLimitConfig {
    /// Load rate limit configuration from environment variables.
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            password_reset: window_limit_from_env("PASSWORD_RESET", defaults.password_reset),
            email_verification: window_limit_from_env(
                "EMAIL_VERIFICATION",
                defaults.email_verification,
            ),
            general: window_limit_from_env("GENERAL", defaults.general),
            blocked_domains: env::var("DISPOSABLE_EMAIL_DOMAINS")
                .map(|v| {
                    v.split(',')
                        .map(|d| d.trim().to_lowercase())
                        .filter(|d| !d.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            purge_interval: Duration::from_secs(
                env::var("RATE_LIMIT_PURGE_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.purge_interval.as_secs()),
            ),
        }
    }

    pub fn limit_for(&self, category: EmailCategory) -> WindowLimit {
        match category {
            EmailCategory::PasswordReset => self.password_reset,
            EmailCategory::EmailVerification => self.email_verification,
            EmailCategory::General => self.general,
        }
    }
}

fn window_limit_from_env(prefix: &str, default: WindowLimit) -> WindowLimit {
    let max_attempts = env::var(format!("EMAIL_RATE_LIMIT_{}_MAX", prefix))
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default.max_attempts);

    let window = env::var(format!("EMAIL_RATE_LIMIT_{}_WINDOW_SECS", prefix))
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default.window);

    WindowLimit {
        max_attempts,
        window,
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidSmtpPort,
    InvalidPublicUrl,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "PORT must be a valid number"),
            ConfigError::InvalidSmtpPort => write!(f, "SMTP_PORT must be a valid number"),
            ConfigError::InvalidPublicUrl => {
                write!(f, "PUBLIC_SERVER_URL must be an absolute URL")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

pub mod domain;
pub mod email;
pub mod rate_limit;

pub use domain::DomainPolicy;
pub use email::{EmailHealth, EmailService, Mailer, SmtpMailer, SmtpSummary};
pub use rate_limit::EmailRateLimiter;

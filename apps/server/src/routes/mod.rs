pub mod email_health;
pub mod health;

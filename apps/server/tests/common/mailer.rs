//! In-memory mail transports

use async_trait::async_trait;
use billboard::error::{AppError, AppResult};
use billboard::models::{OutgoingEmail, SentEmail};
use billboard::services::Mailer;
use std::sync::Mutex;

/// Accepts every message and keeps a copy
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<SentEmail> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(email);
        Ok(SentEmail {
            message_id: format!("<test-{}@site.test>", sent.len()),
        })
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Transport that is configured but whose relay always refuses
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: OutgoingEmail) -> AppResult<SentEmail> {
        Err(AppError::EmailDelivery("Connection refused".to_string()))
    }

    fn is_configured(&self) -> bool {
        true
    }
}

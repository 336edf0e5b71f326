use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use crate::config::{EmailRateLimitConfig, WindowLimit};
use crate::models::{EmailCategory, RateLimitRecord, RateLimitStatus};

/// Per-recipient fixed-window limiter for outbound email.
///
/// Records live in process memory only and are keyed `{category}:{email}`.
/// Quota consumed by an attempt is never given back, even when the send that
/// follows fails.
pub struct EmailRateLimiter {
    config: EmailRateLimitConfig,
    records: Mutex<HashMap<String, RateLimitRecord>>,
}

impl EmailRateLimiter {
    pub fn new(config: EmailRateLimitConfig) -> Self {
        Self {
            config,
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EmailRateLimitConfig {
        &self.config
    }

    /// Returns true and records the attempt when the recipient is under quota
    pub fn check_and_consume(&self, email: &str, category: EmailCategory) -> bool {
        self.check_and_consume_at(email, category, Utc::now())
    }

    pub fn check_and_consume_at(
        &self,
        email: &str,
        category: EmailCategory,
        now: DateTime<Utc>,
    ) -> bool {
        let limit = self.config.limit_for(category);
        let key = category.rate_limit_key(email);
        let mut records = self.records();

        match records.get_mut(&key) {
            Some(record) if now <= record.reset_time => {
                if record.count >= limit.max_attempts {
                    log::warn!("Email rate limit hit for {}", key);
                    return false;
                }
                record.count += 1;
                true
            }
            _ => {
                records.insert(
                    key,
                    RateLimitRecord {
                        count: 1,
                        reset_time: window_end(now, limit),
                    },
                );
                true
            }
        }
    }

    /// Drops one category, or every category when `category` is `None`.
    /// Returns how many records were removed.
    pub fn clear(&self, email: &str, category: Option<EmailCategory>) -> usize {
        let categories = match category {
            Some(category) => vec![category],
            None => EmailCategory::ALL.to_vec(),
        };

        let mut records = self.records();
        categories
            .iter()
            .filter(|category| records.remove(&category.rate_limit_key(email)).is_some())
            .count()
    }

    pub fn status(&self, email: &str) -> BTreeMap<&'static str, RateLimitStatus> {
        self.status_at(email, Utc::now())
    }

    /// Current window for each category; expired or absent records read as unused
    pub fn status_at(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> BTreeMap<&'static str, RateLimitStatus> {
        let records = self.records();

        EmailCategory::ALL
            .iter()
            .map(|category| {
                let limit = self.config.limit_for(*category);
                let status = match records.get(&category.rate_limit_key(email)) {
                    Some(record) if now <= record.reset_time => RateLimitStatus {
                        count: record.count,
                        reset_time: Some(record.reset_time),
                        remaining: limit.max_attempts.saturating_sub(record.count),
                    },
                    _ => RateLimitStatus {
                        count: 0,
                        reset_time: None,
                        remaining: limit.max_attempts,
                    },
                };
                (category.key_prefix(), status)
            })
            .collect()
    }

    /// Removes records whose window has closed. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut records = self.records();
        let before = records.len();
        records.retain(|_, record| now <= record.reset_time);
        before - records.len()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, RateLimitRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn window_end(now: DateTime<Utc>, limit: WindowLimit) -> DateTime<Utc> {
    chrono::Duration::from_std(limit.window)
        .ok()
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

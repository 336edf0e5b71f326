//! Test fixtures for CMS content and configuration

use billboard::config::{AdminConfig, Config, EmailConfig, EmailRateLimitConfig};
use billboard::models::{Ad, RotatorConfig};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Fully configured server settings pointing at a fake site
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        public_url: "https://site.test".to_string(),
        admin: AdminConfig {
            api_token: Some(ADMIN_TOKEN.to_string()),
            notification_email: Some("admin@site.test".to_string()),
        },
        email: EmailConfig {
            smtp_host: "smtp.sendgrid.net".to_string(),
            smtp_port: 587,
            smtp_username: "apikey".to_string(),
            api_key: Some("SG.test".to_string()),
            from_email: Some("noreply@site.test".to_string()),
            from_name: Some("Site".to_string()),
        },
        rate_limit: EmailRateLimitConfig::default(),
    }
}

/// Builder for ad documents in the shape the CMS emits
pub struct AdBuilder {
    doc: Map<String, Value>,
    campaign: Map<String, Value>,
}

impl AdBuilder {
    pub fn new(id: i64, title: &str) -> Self {
        let mut doc = Map::new();
        doc.insert("id".to_string(), json!(id));
        doc.insert("title".to_string(), json!(title));
        Self {
            doc,
            campaign: Map::new(),
        }
    }

    pub fn inactive(mut self) -> Self {
        self.doc.insert("active".to_string(), json!(false));
        self
    }

    pub fn starts(mut self, at: DateTime<Utc>) -> Self {
        self.doc.insert("startDate".to_string(), json!(at.to_rfc3339()));
        self
    }

    pub fn ends(mut self, at: DateTime<Utc>) -> Self {
        self.doc.insert("endDate".to_string(), json!(at.to_rfc3339()));
        self
    }

    pub fn custom_link(mut self, url: &str) -> Self {
        self.doc
            .insert("link".to_string(), json!({ "type": "custom", "url": url }));
        self
    }

    pub fn campaign(mut self, key: &str, value: Value) -> Self {
        self.campaign.insert(key.to_string(), value);
        self
    }

    pub fn to_value(&self) -> Value {
        let mut doc = self.doc.clone();
        if !self.campaign.is_empty() {
            doc.insert("campaign".to_string(), Value::Object(self.campaign.clone()));
        }
        Value::Object(doc)
    }

    pub fn build(self) -> Ad {
        serde_json::from_value(self.to_value()).expect("ad fixture should deserialize")
    }
}

/// Rotator block holding the given ads, with optional extra settings
pub fn rotator_config(ads: &[AdBuilder], settings: Value) -> RotatorConfig {
    let mut value = settings;
    let ads: Vec<Value> = ads.iter().map(AdBuilder::to_value).collect();
    value["ads"] = Value::Array(ads);
    serde_json::from_value(value).expect("rotator fixture should deserialize")
}

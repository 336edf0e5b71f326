//! Impression, click and conversion events for third-party analytics.
//!
//! The tracker holds a capability list: one entry per analytics client that is
//! actually available. Each event is translated into provider-specific calls
//! and handed to every present client. A client that fails is logged and
//! skipped so the remaining clients still receive the event.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::TrackingError;
use crate::models::{effective_provider, non_empty, Ad, GlobalTracking};

/// Analytics globals a page may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsTarget {
    /// Google tag (`gtag`)
    Gtag,
    /// Facebook pixel (`fbq`)
    FacebookPixel,
    /// HubSpot tracking queue (`_hsq`)
    HubSpot,
}

impl AnalyticsTarget {
    pub fn global_name(&self) -> &'static str {
        match self {
            AnalyticsTarget::Gtag => "gtag",
            AnalyticsTarget::FacebookPixel => "fbq",
            AnalyticsTarget::HubSpot => "_hsq",
        }
    }
}

impl std::fmt::Display for AnalyticsTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.global_name())
    }
}

/// One call against an analytics global, e.g. `gtag('event', 'ad_click', {...})`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsCall {
    pub target: AnalyticsTarget,
    pub command: &'static str,
    pub name: String,
    pub params: Value,
}

impl AnalyticsCall {
    fn new(target: AnalyticsTarget, command: &'static str, name: &str, params: Value) -> Self {
        Self {
            target,
            command,
            name: name.to_string(),
            params,
        }
    }
}

/// Handle to an analytics client
pub trait AnalyticsClient: Send + Sync {
    fn dispatch(&self, call: &AnalyticsCall) -> Result<(), TrackingError>;
}

/// Client that records calls in the application log
pub struct LoggingClient;

impl AnalyticsClient for LoggingClient {
    fn dispatch(&self, call: &AnalyticsCall) -> Result<(), TrackingError> {
        log::info!(
            "{}('{}', '{}', {})",
            call.target.global_name(),
            call.command,
            call.name,
            call.params
        );
        Ok(())
    }
}

/// Fans events out to the analytics clients that are present
#[derive(Clone, Default)]
pub struct EventTracker {
    clients: Vec<(AnalyticsTarget, Arc<dyn AnalyticsClient>)>,
}

impl EventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(mut self, target: AnalyticsTarget, client: Arc<dyn AnalyticsClient>) -> Self {
        self.clients.push((target, client));
        self
    }

    pub fn targets(&self) -> Vec<AnalyticsTarget> {
        self.clients.iter().map(|(target, _)| *target).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn track_impression(&self, ad: &Ad, global: Option<&GlobalTracking>) {
        for (target, client) in &self.clients {
            Self::deliver(client.as_ref(), impression_calls(*target, ad, global));
        }
    }

    pub fn track_click(&self, ad: &Ad, global: Option<&GlobalTracking>) {
        for (target, client) in &self.clients {
            Self::deliver(client.as_ref(), click_calls(*target, ad, global));
        }
    }

    fn deliver(client: &dyn AnalyticsClient, calls: Vec<AnalyticsCall>) {
        for call in calls {
            if let Err(e) = client.dispatch(&call) {
                log::warn!("Dropped {} '{}' event: {}", call.target, call.name, e);
                // Later calls would hit the same broken client
                break;
            }
        }
    }
}

/// Calls fired when an ad is displayed
pub fn impression_calls(
    target: AnalyticsTarget,
    ad: &Ad,
    global: Option<&GlobalTracking>,
) -> Vec<AnalyticsCall> {
    match target {
        AnalyticsTarget::Gtag => vec![AnalyticsCall::new(
            target,
            "event",
            "ad_impression",
            gtag_params(ad, global),
        )],
        AnalyticsTarget::FacebookPixel => vec![AnalyticsCall::new(
            target,
            "track",
            "ViewContent",
            fbq_params(ad),
        )],
        AnalyticsTarget::HubSpot => {
            let mut value = Map::new();
            value.insert("ad_title".to_string(), json!(ad.title));
            insert_opt(&mut value, "campaign_id", ad.campaign_value(|c| &c.campaign_id));
            insert_opt(&mut value, "ad_id", ad.campaign_value(|c| &c.ad_id));

            vec![AnalyticsCall::new(
                target,
                "trackEvent",
                "ad_impression",
                json!({ "id": "ad_impression", "value": value }),
            )]
        }
    }
}

/// Calls fired when an ad is clicked, including one conversion per goal
pub fn click_calls(
    target: AnalyticsTarget,
    ad: &Ad,
    global: Option<&GlobalTracking>,
) -> Vec<AnalyticsCall> {
    match target {
        AnalyticsTarget::Gtag => {
            let mut calls = vec![AnalyticsCall::new(
                target,
                "event",
                "ad_click",
                gtag_params(ad, global),
            )];

            let campaign_id = campaign_id(ad, global);
            calls.extend(ad.goals().iter().map(|goal| {
                let send_to = match campaign_id {
                    Some(id) => format!("{}/{}", id, goal.goal),
                    None => goal.goal.clone(),
                };
                AnalyticsCall::new(
                    target,
                    "event",
                    "conversion",
                    json!({ "send_to": send_to, "value": goal.value.unwrap_or(1.0) }),
                )
            }));
            calls
        }
        AnalyticsTarget::FacebookPixel => {
            vec![AnalyticsCall::new(target, "track", "Lead", fbq_params(ad))]
        }
        AnalyticsTarget::HubSpot => Vec::new(),
    }
}

fn campaign_id<'a>(ad: &'a Ad, global: Option<&'a GlobalTracking>) -> Option<&'a str> {
    ad.campaign_value(|c| &c.campaign_id)
        .or_else(|| global.and_then(|g| non_empty(&g.campaign_id)))
}

fn provider<'a>(ad: &'a Ad, global: Option<&'a GlobalTracking>) -> Option<&'a str> {
    ad.campaign
        .as_ref()
        .and_then(|c| effective_provider(non_empty(&c.provider), non_empty(&c.custom_provider)))
        .or_else(|| global.and_then(|g| non_empty(&g.provider)))
}

fn gtag_params(ad: &Ad, global: Option<&GlobalTracking>) -> Value {
    let mut params = Map::new();
    insert_opt(&mut params, "campaign_id", campaign_id(ad, global));
    insert_opt(&mut params, "ad_id", ad.campaign_value(|c| &c.ad_id));
    params.insert("ad_title".to_string(), json!(ad.title));
    insert_opt(&mut params, "provider", provider(ad, global));
    Value::Object(params)
}

fn fbq_params(ad: &Ad) -> Value {
    json!({
        "content_name": ad.title,
        "content_category": "advertisement",
        "content_ids": [ad.content_id()],
    })
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        map.insert(key.to_string(), json!(value));
    }
}

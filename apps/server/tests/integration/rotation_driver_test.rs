//! Integration tests for the tokio-hosted rotation driver
//!
//! Runs on a paused clock so timer-driven rotation is deterministic.

use billboard::rotation::{AdRotator, RotationDriver, RotationState};
use billboard::tracking::{AnalyticsCall, AnalyticsClient, AnalyticsTarget, EventTracker, TrackingError};
use chrono::Utc;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::common::fixtures::{rotator_config, AdBuilder};

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<AnalyticsCall>>,
}

impl Recorder {
    /// Titles of the ads that produced impressions, in order
    fn impressions(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.name == "ad_impression")
            .map(|c| c.params["ad_title"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    fn names(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.name.clone()).collect()
    }
}

impl AnalyticsClient for Recorder {
    fn dispatch(&self, call: &AnalyticsCall) -> Result<(), TrackingError> {
        self.calls.lock().unwrap().push(call.clone());
        Ok(())
    }
}

fn start(count: i64, settings: serde_json::Value) -> (RotationDriver, Arc<Recorder>) {
    let ads: Vec<_> = (1..=count)
        .map(|i| AdBuilder::new(i, &format!("Ad {}", i)))
        .collect();
    let rotator = AdRotator::mount(&rotator_config(&ads, settings), Utc::now());

    let recorder = Arc::new(Recorder::default());
    let tracker = EventTracker::new().with_client(AnalyticsTarget::Gtag, recorder.clone());
    (RotationDriver::start(rotator, Arc::new(tracker)), recorder)
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_rotates_on_interval() {
    let (driver, recorder) = start(3, json!({ "rotationInterval": 2000 }));
    assert_eq!(recorder.impressions(), vec!["Ad 1"]);

    advance(2100).await;
    assert_eq!(driver.current_index(), Some(1));

    advance(2000).await;
    advance(2000).await;
    assert_eq!(driver.current_index(), Some(0));
    assert_eq!(recorder.impressions(), vec!["Ad 1", "Ad 2", "Ad 3", "Ad 1"]);
}

#[tokio::test(start_paused = true)]
async fn test_single_ad_never_rotates() {
    let (driver, recorder) = start(1, json!({}));

    advance(60_000).await;

    assert_eq!(driver.state(), RotationState::Displaying(0));
    assert_eq!(recorder.impressions(), vec!["Ad 1"]);
}

#[tokio::test(start_paused = true)]
async fn test_hover_freezes_rotation() {
    let (driver, recorder) = start(3, json!({ "rotationInterval": 1000 }));

    assert!(driver.pointer_enter());
    advance(10_000).await;
    assert_eq!(driver.state(), RotationState::Paused(0));
    assert_eq!(recorder.impressions().len(), 1);

    assert_eq!(driver.pointer_leave(), Some(0));
    assert_eq!(recorder.impressions(), vec!["Ad 1", "Ad 1"]);

    advance(1100).await;
    assert_eq!(driver.current_index(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_navigation_restarts_the_countdown() {
    let (driver, recorder) = start(3, json!({ "rotationInterval": 5000 }));

    advance(4000).await;
    assert_eq!(driver.navigate(2), Ok(2));

    // The old countdown would have fired at 5000ms
    advance(2000).await;
    assert_eq!(driver.current_index(), Some(2));

    advance(3100).await;
    assert_eq!(driver.current_index(), Some(0));
    assert_eq!(recorder.impressions(), vec!["Ad 1", "Ad 3", "Ad 1"]);
}

#[tokio::test(start_paused = true)]
async fn test_replacing_ads_restarts_at_first() {
    let (driver, recorder) = start(3, json!({ "rotationInterval": 1000 }));
    advance(1100).await;

    let replacement = vec![
        AdBuilder::new(10, "New A").build(),
        AdBuilder::new(11, "New B").build(),
    ];
    assert_eq!(driver.set_ads(&replacement, Utc::now()), Some(0));
    assert_eq!(driver.current_ad().map(|a| a.title), Some("New A".to_string()));

    advance(1100).await;
    assert_eq!(
        recorder.impressions(),
        vec!["Ad 1", "Ad 2", "New A", "New B"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_click_reports_current_ad() {
    let (driver, recorder) = start(2, json!({}));

    assert!(driver.click());

    assert_eq!(recorder.names(), vec!["ad_impression", "ad_click"]);
}

#[tokio::test(start_paused = true)]
async fn test_drop_stops_the_timer() {
    let (driver, recorder) = start(2, json!({ "rotationInterval": 1000 }));
    advance(1100).await;
    assert_eq!(recorder.impressions().len(), 2);

    drop(driver);
    advance(10_000).await;

    assert_eq!(recorder.impressions().len(), 2);
}

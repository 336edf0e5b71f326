//! Campaign tracking: UTM parameters, provider pixels and analytics events.

pub mod events;
pub mod pixel;
pub mod utm;

pub use events::{
    click_calls, impression_calls, AnalyticsCall, AnalyticsClient, AnalyticsTarget, EventTracker,
    LoggingClient,
};
pub use pixel::{PixelRegistry, PixelSnippet, PixelTemplate};
pub use utm::{build_tracking_url, build_utm_parameters, resolve_ad_href, UtmParameters};

/// Tracking layer errors
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Analytics client {target} failed: {message}")]
    Client { target: String, message: String },
}

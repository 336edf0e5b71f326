use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

use super::ad::{Ad, AdId};
use super::{non_empty, null_as_default};
use super::provider::effective_provider;

pub const DEFAULT_ROTATION_INTERVAL: Duration = Duration::from_millis(5000);
pub const MIN_ROTATION_INTERVAL: Duration = Duration::from_millis(1000);

/// Layout zone a rotator block is placed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutZone {
    Header,
    Sidebar,
    #[default]
    Content,
    Footer,
}

/// Position inside the layout zone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Ad rotator block configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotatorConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub layout_zone: Option<LayoutZone>,
    #[serde(default)]
    pub placement: Option<Placement>,
    /// Milliseconds between rotations
    #[serde(default)]
    pub rotation_interval: Option<u64>,
    #[serde(default)]
    pub pause_on_hover: Option<bool>,
    #[serde(default)]
    pub show_navigation: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ads: Vec<AdRef>,
    #[serde(default)]
    pub tracking: Option<RotatorTracking>,
}

/// Relationship entry: populated ad document or bare id. Documents that do
/// not decode as an [`Ad`] are kept raw so the rest of the block survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdRef {
    Populated(Box<Ad>),
    Id(AdId),
    Unparsed(serde_json::Value),
}

impl RotatorConfig {
    /// Rotation interval; zero or missing uses the default, anything below the
    /// minimum is raised to it.
    pub fn rotation_interval(&self) -> Duration {
        match self.rotation_interval {
            None | Some(0) => DEFAULT_ROTATION_INTERVAL,
            Some(ms) => Duration::from_millis(ms).max(MIN_ROTATION_INTERVAL),
        }
    }

    pub fn pause_on_hover(&self) -> bool {
        self.pause_on_hover.unwrap_or(true)
    }

    pub fn show_navigation(&self) -> bool {
        self.show_navigation.unwrap_or(true)
    }

    pub fn layout_zone(&self) -> LayoutZone {
        self.layout_zone.unwrap_or_default()
    }

    pub fn placement(&self) -> Placement {
        self.placement.unwrap_or_default()
    }

    /// Ads that were populated by the CMS; bare ids and undecodable
    /// documents are skipped
    pub fn populated_ads(&self) -> impl Iterator<Item = &Ad> {
        self.ads.iter().filter_map(|entry| match entry {
            AdRef::Populated(ad) => Some(ad.as_ref()),
            AdRef::Id(_) => None,
            AdRef::Unparsed(raw) => {
                log::warn!("Skipping malformed ad document (id {})", raw["id"]);
                None
            }
        })
    }

    /// Rotator-level tracking fallback, only when tracking is enabled
    pub fn global_tracking(&self) -> Option<GlobalTracking> {
        self.tracking
            .as_ref()
            .filter(|t| t.enabled)
            .map(RotatorTracking::to_global)
    }
}

/// Tracking settings applied to every ad in a rotator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotatorTracking {
    /// Stored by the CMS as the text "true"/"false"; booleans are accepted too
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub enabled: bool,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub custom_provider: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub utm_source: Option<String>,
    #[serde(default)]
    pub utm_medium: Option<String>,
    #[serde(default)]
    pub custom_code: Option<String>,
}

impl RotatorTracking {
    fn to_global(&self) -> GlobalTracking {
        GlobalTracking {
            provider: effective_provider(
                non_empty(&self.provider),
                non_empty(&self.custom_provider),
            )
            .map(str::to_string),
            campaign_id: non_empty(&self.campaign_id).map(str::to_string),
            utm_source: non_empty(&self.utm_source).map(str::to_string),
            utm_medium: non_empty(&self.utm_medium).map(str::to_string),
            custom_code: non_empty(&self.custom_code).map(str::to_string),
        }
    }
}

/// Fallback tracking values used when an ad lacks its own
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalTracking {
    pub provider: Option<String>,
    pub campaign_id: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub custom_code: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Text(s)) => s.trim().eq_ignore_ascii_case("true"),
        None => false,
    })
}

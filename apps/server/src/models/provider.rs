use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Advertising platforms and tracking providers selectable in the CMS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdProvider {
    GoogleAds,
    Ga4,
    FacebookAds,
    FacebookPixel,
    LinkedinAds,
    MicrosoftAds,
    Hubspot,
    TwitterAds,
    TiktokAds,
    SnapchatAds,
    PinterestAds,
    AmazonDsp,
    AdobeAdvertising,
    Custom,
}

impl AdProvider {
    pub const ALL: [AdProvider; 14] = [
        AdProvider::GoogleAds,
        AdProvider::Ga4,
        AdProvider::FacebookAds,
        AdProvider::FacebookPixel,
        AdProvider::LinkedinAds,
        AdProvider::MicrosoftAds,
        AdProvider::Hubspot,
        AdProvider::TwitterAds,
        AdProvider::TiktokAds,
        AdProvider::SnapchatAds,
        AdProvider::PinterestAds,
        AdProvider::AmazonDsp,
        AdProvider::AdobeAdvertising,
        AdProvider::Custom,
    ];

    /// Value stored by the CMS
    pub fn as_str(&self) -> &'static str {
        match self {
            AdProvider::GoogleAds => "google-ads",
            AdProvider::Ga4 => "ga4",
            AdProvider::FacebookAds => "facebook-ads",
            AdProvider::FacebookPixel => "facebook-pixel",
            AdProvider::LinkedinAds => "linkedin-ads",
            AdProvider::MicrosoftAds => "microsoft-ads",
            AdProvider::Hubspot => "hubspot",
            AdProvider::TwitterAds => "twitter-ads",
            AdProvider::TiktokAds => "tiktok-ads",
            AdProvider::SnapchatAds => "snapchat-ads",
            AdProvider::PinterestAds => "pinterest-ads",
            AdProvider::AmazonDsp => "amazon-dsp",
            AdProvider::AdobeAdvertising => "adobe-advertising",
            AdProvider::Custom => "custom",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            AdProvider::GoogleAds => "Google Ads",
            AdProvider::Ga4 => "Google Analytics 4",
            AdProvider::FacebookAds => "Facebook Ads",
            AdProvider::FacebookPixel => "Facebook Pixel",
            AdProvider::LinkedinAds => "LinkedIn Ads",
            AdProvider::MicrosoftAds => "Microsoft Ads (Bing)",
            AdProvider::Hubspot => "HubSpot",
            AdProvider::TwitterAds => "Twitter Ads",
            AdProvider::TiktokAds => "TikTok Ads",
            AdProvider::SnapchatAds => "Snapchat Ads",
            AdProvider::PinterestAds => "Pinterest Ads",
            AdProvider::AmazonDsp => "Amazon DSP",
            AdProvider::AdobeAdvertising => "Adobe Advertising Cloud",
            AdProvider::Custom => "Custom/Other",
        }
    }
}

impl std::fmt::Display for AdProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown ad provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for AdProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdProvider::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

/// Label for a stored provider value, falling back to the value itself
pub fn provider_display_name(value: &str) -> String {
    value
        .parse::<AdProvider>()
        .map(|p| p.label().to_string())
        .unwrap_or_else(|_| value.to_string())
}

/// Resolves the provider name to use, substituting the custom name when
/// "custom" is selected and one was entered.
pub fn effective_provider<'a>(
    provider: Option<&'a str>,
    custom_provider: Option<&'a str>,
) -> Option<&'a str> {
    let provider = provider.filter(|p| !p.is_empty())?;
    match custom_provider.filter(|c| !c.is_empty()) {
        Some(custom) if provider == AdProvider::Custom.as_str() => Some(custom),
        _ => Some(provider),
    }
}

//! Unit tests for campaign tracking
//!
//! UTM resolution, tracking URLs, provider pixels and provider names.

use billboard::models::{provider_display_name, AdProvider, GlobalTracking};
use billboard::tracking::{build_tracking_url, build_utm_parameters, resolve_ad_href, PixelRegistry};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use url::Url;

use crate::common::AdBuilder;

fn rotator_tracking() -> GlobalTracking {
    GlobalTracking {
        provider: Some("ga4".to_string()),
        campaign_id: Some("rotator-campaign".to_string()),
        utm_source: Some("site".to_string()),
        utm_medium: Some("banner".to_string()),
        custom_code: None,
    }
}

// =============================================================================
// UTM Tests
// =============================================================================

#[test]
fn test_ad_without_campaign_uses_rotator_values() {
    let ad = AdBuilder::new(1, "Plain").build();
    let params = build_utm_parameters(&ad, Some(&rotator_tracking()));

    assert_eq!(
        params.to_query_string(),
        "utm_source=site&utm_medium=banner&utm_campaign=rotator-campaign"
    );
}

#[test]
fn test_no_values_anywhere_yields_no_parameters() {
    let ad = AdBuilder::new(1, "Plain").build();
    assert!(build_utm_parameters(&ad, None).is_empty());
}

#[test]
fn test_values_are_form_encoded() {
    let ad = AdBuilder::new(1, "Promo")
        .campaign("utmCampaign", json!("summer sale & more"))
        .build();
    let params = build_utm_parameters(&ad, None);

    assert_eq!(params.to_query_string(), "utm_campaign=summer+sale+%26+more");
}

#[test]
fn test_tracking_url_keeps_fragment_and_other_params() {
    let ad = AdBuilder::new(1, "Promo")
        .campaign("utmSource", json!("google"))
        .campaign("utmTerm", json!("shoes"))
        .build();

    let url = build_tracking_url("https://shop.example.com/p?id=7#top", &ad, None).unwrap();

    assert_eq!(
        url.as_str(),
        "https://shop.example.com/p?id=7&utm_source=google&utm_term=shoes#top"
    );
}

#[test]
fn test_href_for_absolute_custom_link() {
    let site = Url::parse("https://www.example.com").unwrap();
    let ad = AdBuilder::new(1, "Partner")
        .custom_link("https://partner.example.org/landing")
        .build();

    assert_eq!(
        resolve_ad_href(&ad, &site, Some(&rotator_tracking())),
        "https://partner.example.org/landing?utm_source=site&utm_medium=banner&utm_campaign=rotator-campaign"
    );
}

// =============================================================================
// Pixel Tests
// =============================================================================

#[rstest]
#[case("google-ads", "555", "gtag('config', 'AW-555')")]
#[case("ga4", "G-555", "gtag/js?id=G-555")]
#[case("facebook-pixel", "555", "fbq('init', '555')")]
#[case("hubspot", "555", "js.hs-scripts.com/555.js")]
fn test_registered_pixels(
    #[case] provider: &str,
    #[case] campaign_id: &str,
    #[case] expected: &str,
) {
    let snippet = PixelRegistry::default().generate(provider, Some(campaign_id));
    assert!(snippet.as_unsanitized().contains(expected));
}

#[rstest]
#[case("linkedin-ads")]
#[case("custom")]
#[case("not-a-provider")]
#[case("")]
fn test_unregistered_pixels_are_empty(#[case] provider: &str) {
    assert!(PixelRegistry::default()
        .generate(provider, Some("123"))
        .is_empty());
}

// =============================================================================
// Provider Tests
// =============================================================================

#[test]
fn test_provider_round_trips_through_cms_value() {
    for provider in AdProvider::ALL {
        assert_eq!(provider.as_str().parse::<AdProvider>(), Ok(provider));
    }
}

#[test]
fn test_provider_display_names() {
    assert_eq!(provider_display_name("microsoft-ads"), "Microsoft Ads (Bing)");
    assert_eq!(provider_display_name("acme-analytics"), "acme-analytics");
}

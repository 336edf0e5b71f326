pub mod ad;
pub mod email;
pub mod provider;
pub mod rotator;

pub use ad::{
    Ad, AdId, AdLink, AdSeo, CallToAction, Campaign, ConversionGoal, LinkReference, LinkType,
    ReferenceValue, RelationTo, SeoAttributes,
};
pub use email::{
    ClearRateLimit, EmailCategory, EmailContent, OutgoingEmail, RateLimitRecord, RateLimitStatus,
    SentEmail,
};
pub use provider::{effective_provider, provider_display_name, AdProvider, UnknownProvider};
pub use rotator::{AdRef, GlobalTracking, RotatorConfig, RotatorTracking};

/// Optional CMS text, treating empty strings as missing
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Reads `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    use serde::Deserialize;
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

//! Advertisement documents as delivered by the CMS.
//!
//! Most fields are optional and nullable because the CMS only emits what an
//! editor filled in. Empty strings are treated the same as missing values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{non_empty, null_as_default};

/// CMS document id (numeric for SQL adapters, string for document stores)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for AdId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdId::Number(n) => write!(f, "{}", n),
            AdId::Text(s) => write!(f, "{}", s),
        }
    }
}

// =============================================================================
// Ad
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub id: AdId,
    pub title: String,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub image: Option<MediaRef>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: AdLink,
    #[serde(default)]
    pub cta: Option<CallToAction>,
    /// Display weight 1-10. Stored by the CMS but not used for selection.
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Option<Vec<AdTag>>,
    #[serde(default)]
    pub seo: Option<AdSeo>,
    #[serde(default)]
    pub campaign: Option<Campaign>,
}

impl Ad {
    /// An ad is active unless explicitly switched off
    pub fn is_active(&self) -> bool {
        self.active != Some(false)
    }

    /// Whether the ad may be shown at `now`: active and inside its date range
    pub fn is_eligible_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active() {
            return false;
        }
        if matches!(self.start_date, Some(start) if now < start) {
            return false;
        }
        if matches!(self.end_date, Some(end) if now > end) {
            return false;
        }
        true
    }

    pub fn weight(&self) -> u8 {
        self.weight
            .map(|w| w.round().clamp(1.0, 10.0) as u8)
            .unwrap_or(1)
    }

    pub fn image_url(&self) -> Option<&str> {
        match &self.image {
            Some(MediaRef::Populated(media)) => non_empty(&media.url),
            _ => None,
        }
    }

    pub fn tag_names(&self) -> Vec<&str> {
        self.tags
            .iter()
            .flatten()
            .map(|t| t.tag.as_str())
            .collect()
    }

    /// Campaign id, ad id and UTM values live under `campaign`
    pub fn campaign_value<F>(&self, field: F) -> Option<&str>
    where
        F: FnOnce(&Campaign) -> &Option<String>,
    {
        self.campaign.as_ref().and_then(|c| non_empty(field(c)))
    }

    /// Identifier reported to analytics: the platform ad id, else the CMS id
    pub fn content_id(&self) -> String {
        self.campaign_value(|c| &c.ad_id)
            .map(str::to_string)
            .unwrap_or_else(|| self.id.to_string())
    }

    pub fn goals(&self) -> &[ConversionGoal] {
        self.campaign
            .as_ref()
            .and_then(|c| c.goals.as_deref())
            .unwrap_or(&[])
    }

    /// Accessibility and SEO attributes for the ad image
    pub fn seo_attributes(&self) -> SeoAttributes {
        let seo = self.seo.as_ref();
        let title = non_empty_str(&self.title);

        SeoAttributes {
            alt: seo
                .and_then(|s| non_empty(&s.alt_text))
                .or(title)
                .unwrap_or("Advertisement")
                .to_string(),
            title: seo
                .and_then(|s| non_empty(&s.title))
                .or(title)
                .map(str::to_string),
            aria_label: format!("Advertisement: {}", self.title),
        }
    }
}

fn non_empty_str(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoAttributes {
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "aria-label")]
    pub aria_label: String,
}

// =============================================================================
// Media, Tags, SEO
// =============================================================================

/// Upload relation: either the populated media document or its id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaRef {
    Populated(Media),
    Id(AdId),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdTag {
    pub tag: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdSeo {
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// =============================================================================
// Link target
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Custom,
    Reference,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdLink {
    #[serde(rename = "type", default)]
    pub link_type: Option<LinkType>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub reference: Option<LinkReference>,
    #[serde(default)]
    pub new_tab: Option<bool>,
    #[serde(default)]
    pub label: Option<String>,
}

impl AdLink {
    pub fn opens_new_tab(&self) -> bool {
        self.new_tab.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationTo {
    Pages,
    Posts,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkReference {
    pub relation_to: RelationTo,
    pub value: ReferenceValue,
}

/// Relationship value: populated document or bare id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceValue {
    Document {
        #[serde(default)]
        slug: Option<String>,
    },
    Id(AdId),
}

// =============================================================================
// Call to action
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToAction {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub style: Option<CtaStyle>,
    #[serde(default)]
    pub size: Option<CtaSize>,
    #[serde(default)]
    pub position: Option<CtaPosition>,
    #[serde(default)]
    pub custom_colors: Option<CustomColors>,
}

impl CallToAction {
    /// A CTA is shown only when enabled and given text
    pub fn is_visible(&self) -> bool {
        self.enabled.unwrap_or(false) && non_empty(&self.text).is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CtaStyle {
    #[default]
    PrimaryButton,
    SecondaryButton,
    OutlineButton,
    TextLink,
    UnderlinedLink,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaSize {
    Sm,
    #[default]
    Md,
    Lg,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CtaPosition {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    #[default]
    BottomCenter,
    BottomRight,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomColors {
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub border: Option<String>,
}

// =============================================================================
// Campaign metadata
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub custom_provider: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub ad_group_id: Option<String>,
    #[serde(default)]
    pub ad_id: Option<String>,
    #[serde(default)]
    pub utm_source: Option<String>,
    #[serde(default)]
    pub utm_medium: Option<String>,
    #[serde(default)]
    pub utm_campaign: Option<String>,
    #[serde(default)]
    pub utm_term: Option<String>,
    #[serde(default)]
    pub utm_content: Option<String>,
    #[serde(default)]
    pub custom_code: Option<String>,
    #[serde(default)]
    pub goals: Option<Vec<ConversionGoal>>,
}

/// Named conversion goal fired on click
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionGoal {
    pub goal: String,
    #[serde(default)]
    pub value: Option<f64>,
}

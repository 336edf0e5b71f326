use url::Url;

use super::TrackingError;
use crate::models::{non_empty, Ad, GlobalTracking, LinkType, ReferenceValue, RelationTo};

pub const UTM_SOURCE: &str = "utm_source";
pub const UTM_MEDIUM: &str = "utm_medium";
pub const UTM_CAMPAIGN: &str = "utm_campaign";
pub const UTM_TERM: &str = "utm_term";
pub const UTM_CONTENT: &str = "utm_content";

/// Ordered UTM key/value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtmParameters {
    pairs: Vec<(&'static str, String)>,
}

impl UtmParameters {
    fn push(&mut self, key: &'static str, value: Option<&str>) {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.pairs.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.pairs.iter().map(|(k, _)| *k).collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `application/x-www-form-urlencoded` query string
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

/// Resolves UTM parameters for an ad. Ad values win; source, medium and
/// campaign fall back to the rotator settings. Term and content never do.
pub fn build_utm_parameters(ad: &Ad, global: Option<&GlobalTracking>) -> UtmParameters {
    let mut params = UtmParameters::default();
    params.push(
        UTM_SOURCE,
        ad.campaign_value(|c| &c.utm_source)
            .or_else(|| fallback(global, |g| &g.utm_source)),
    );
    params.push(
        UTM_MEDIUM,
        ad.campaign_value(|c| &c.utm_medium)
            .or_else(|| fallback(global, |g| &g.utm_medium)),
    );
    params.push(
        UTM_CAMPAIGN,
        ad.campaign_value(|c| &c.utm_campaign)
            .or_else(|| fallback(global, |g| &g.campaign_id)),
    );
    params.push(UTM_TERM, ad.campaign_value(|c| &c.utm_term));
    params.push(UTM_CONTENT, ad.campaign_value(|c| &c.utm_content));
    params
}

fn fallback<'a>(
    global: Option<&'a GlobalTracking>,
    field: fn(&GlobalTracking) -> &Option<String>,
) -> Option<&'a str> {
    global.and_then(|g| non_empty(field(g)))
}

/// Appends the ad's UTM parameters to an absolute URL, replacing any
/// existing parameter with the same name.
pub fn build_tracking_url(
    base_url: &str,
    ad: &Ad,
    global: Option<&GlobalTracking>,
) -> Result<Url, TrackingError> {
    let mut url = Url::parse(base_url)?;
    let params = build_utm_parameters(ad, global);
    if params.is_empty() {
        return Ok(url);
    }

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| params.get(key).is_none())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .extend_pairs(params.iter());

    Ok(url)
}

/// Link target of an ad before tracking parameters are applied.
///
/// Custom links may be relative to the site; page and post references map
/// to `/page/{slug}` and `/blog/{slug}`.
pub fn link_target(ad: &Ad, site_url: &Url) -> Option<Url> {
    let link = &ad.link;
    match link.link_type {
        Some(LinkType::Custom) => {
            let raw = non_empty(&link.url)?;
            Url::parse(raw).or_else(|_| site_url.join(raw)).ok()
        }
        Some(LinkType::Reference) => {
            let reference = link.reference.as_ref()?;
            let slug = match &reference.value {
                ReferenceValue::Document { slug } => non_empty(slug).unwrap_or_default(),
                ReferenceValue::Id(_) => return None,
            };
            let path = match reference.relation_to {
                RelationTo::Pages => format!("/page/{}", slug),
                RelationTo::Posts => format!("/blog/{}", slug),
                RelationTo::Other => return None,
            };
            site_url.join(&path).ok()
        }
        Some(LinkType::Other) | None => None,
    }
}

/// Final href for an ad: link target plus UTM parameters, or `#` when the
/// ad has nowhere to go.
pub fn resolve_ad_href(ad: &Ad, site_url: &Url, global: Option<&GlobalTracking>) -> String {
    let Some(target) = link_target(ad, site_url) else {
        return "#".to_string();
    };

    match build_tracking_url(target.as_str(), ad, global) {
        Ok(url) => url.to_string(),
        Err(e) => {
            log::warn!("Could not apply tracking parameters to {}: {}", target, e);
            target.to_string()
        }
    }
}

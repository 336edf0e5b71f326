//! Provider tracking pixels.
//!
//! Each provider maps to a pure template function that interpolates the
//! campaign id into the vendor's snippet. Nothing here escapes or validates
//! the campaign id: the snippet is untrusted markup and must be sanitized by
//! whoever embeds it in a page.

use std::collections::HashMap;

use crate::models::{effective_provider, AdProvider};

/// Renders a provider snippet for a campaign id
pub type PixelTemplate = fn(&str) -> String;

/// Generated tracking markup. Empty when no pixel applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelSnippet(String);

impl PixelSnippet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw markup as rendered; not escaped.
    pub fn as_unsanitized(&self) -> &str {
        &self.0
    }

    pub fn into_unsanitized(self) -> String {
        self.0
    }
}

/// Registry of pixel templates keyed by provider
#[derive(Clone)]
pub struct PixelRegistry {
    templates: HashMap<AdProvider, PixelTemplate>,
}

impl Default for PixelRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(AdProvider::GoogleAds, google_ads)
            .register(AdProvider::FacebookPixel, facebook_pixel)
            .register(AdProvider::Ga4, ga4)
            .register(AdProvider::Hubspot, hubspot);
        registry
    }
}

impl PixelRegistry {
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Adds or replaces the template for a provider
    pub fn register(&mut self, provider: AdProvider, template: PixelTemplate) -> &mut Self {
        self.templates.insert(provider, template);
        self
    }

    pub fn supports(&self, provider: AdProvider) -> bool {
        self.templates.contains_key(&provider)
    }

    /// Snippet for `provider`, or empty when the provider is unknown, has no
    /// template, or the campaign id is missing.
    pub fn generate(&self, provider: &str, campaign_id: Option<&str>) -> PixelSnippet {
        let Some(campaign_id) = campaign_id.filter(|id| !id.is_empty()) else {
            return PixelSnippet::default();
        };

        let template = provider
            .parse::<AdProvider>()
            .ok()
            .and_then(|p| self.templates.get(&p));

        match template {
            Some(render) => PixelSnippet(render(campaign_id)),
            None => {
                log::debug!("No tracking pixel for provider {:?}", provider);
                PixelSnippet::default()
            }
        }
    }

    /// Like [`generate`](Self::generate), resolving "custom" through the
    /// separately stored custom provider name first.
    pub fn generate_with_custom(
        &self,
        provider: Option<&str>,
        custom_provider: Option<&str>,
        campaign_id: Option<&str>,
    ) -> PixelSnippet {
        match effective_provider(provider, custom_provider) {
            Some(provider) => self.generate(provider, campaign_id),
            None => PixelSnippet::default(),
        }
    }
}

fn google_ads(campaign_id: &str) -> String {
    format!(
        r#"<!-- Google Ads Conversion Tracking -->
<script async src="https://www.googletagmanager.com/gtag/js?id=AW-{id}"></script>
<script>
  window.dataLayer = window.dataLayer || [];
  function gtag(){{dataLayer.push(arguments);}}
  gtag('js', new Date());
  gtag('config', 'AW-{id}');
</script>"#,
        id = campaign_id
    )
}

fn facebook_pixel(campaign_id: &str) -> String {
    format!(
        r#"<!-- Facebook Pixel -->
<script>
!function(f,b,e,v,n,t,s)
{{if(f.fbq)return;n=f.fbq=function(){{n.callMethod?
n.callMethod.apply(n,arguments):n.queue.push(arguments)}};
if(!f._fbq)f._fbq=n;n.push=n;n.loaded=!0;n.version='2.0';
n.queue=[];t=b.createElement(e);t.async=!0;
t.src=v;s=b.getElementsByTagName(e)[0];
s.parentNode.insertBefore(t,s)}}(window, document,'script',
'https://connect.facebook.net/en_US/fbevents.js');
fbq('init', '{id}');
fbq('track', 'PageView');
</script>
<noscript><img height="1" width="1" style="display:none"
src="https://www.facebook.com/tr?id={id}&ev=PageView&noscript=1"
/></noscript>"#,
        id = campaign_id
    )
}

fn ga4(campaign_id: &str) -> String {
    format!(
        r#"<!-- Google Analytics 4 -->
<script async src="https://www.googletagmanager.com/gtag/js?id={id}"></script>
<script>
  window.dataLayer = window.dataLayer || [];
  function gtag(){{dataLayer.push(arguments);}}
  gtag('js', new Date());
  gtag('config', '{id}');
</script>"#,
        id = campaign_id
    )
}

fn hubspot(campaign_id: &str) -> String {
    format!(
        r#"<!-- HubSpot Tracking -->
<script type="text/javascript" id="hs-script-loader" async defer src="//js.hs-scripts.com/{id}.js"></script>"#,
        id = campaign_id
    )
}

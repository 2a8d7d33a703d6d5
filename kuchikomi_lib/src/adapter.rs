//! Site adapters: the selectors and patterns needed to pull reviews out of
//! one site's markup.
//!
//! These are coupled to each site's current HTML. When a site changes its
//! markup the selectors keep matching nothing and fields silently come back
//! empty, so every run logs the selector set it used. To re-calibrate, capture
//! a page, fix the selectors here (or in an adapter file), and add a fixture.

use std::path::Path;

use kuchikomi_http::{parse_url, Url};
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::KuchikomiError;
use crate::export::{Column, TextEncoding};
use crate::fields::{Classifier, CompiledClassifier};

/// Declarative description of one review site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteAdapter {
    /// Short identifier used on the command line.
    pub name: String,
    /// Human-readable site name.
    pub label: String,
    /// Scheme and host, e.g. `https://www.cosme.net`.
    pub base_url: String,
    /// Path and query with `{product_id}` and `{page}` placeholders.
    pub listing_path: String,
    /// One match per review on a listing page.
    pub listing_selector: String,
    /// Review text; when absent the container's own text is the body.
    #[serde(default)]
    pub review_body_selector: Option<String>,
    #[serde(default)]
    pub rating_selector: Option<String>,
    #[serde(default)]
    pub reviewer_info_selector: Option<String>,
    /// Element present only while more pages exist. Without one, only an
    /// empty page ends the run.
    #[serde(default)]
    pub pagination_marker_selector: Option<String>,
    /// Present when review fields live on a per-review detail page.
    #[serde(default)]
    pub detail: Option<DetailLink>,
    #[serde(default)]
    pub skin_type: Option<Classifier>,
    #[serde(default)]
    pub gender: Option<Classifier>,
    /// The site blocks requests without a browser user agent.
    #[serde(default)]
    pub requires_user_agent: bool,
    #[serde(default)]
    pub export_encoding: TextEncoding,
    #[serde(default)]
    pub max_pages_cap: Option<u32>,
}

/// Where the detail link lives inside a listing container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailLink {
    /// Descendant anchor holding the `href`; absent means the container
    /// itself carries it.
    #[serde(default)]
    pub link_selector: Option<String>,
}

impl SiteAdapter {
    /// @cosme: listing pages link to one detail page per review.
    pub fn cosme() -> Self {
        Self {
            name: "cosme".into(),
            label: "@cosme".into(),
            base_url: "https://www.cosme.net".into(),
            listing_path: "/products/{product_id}/review/?page={page}".into(),
            listing_selector: "span.read-more a.cmn-viewmore".into(),
            review_body_selector: Some("p.read".into()),
            rating_selector: Some("div.rating.clearfix p.reviewer-rating".into()),
            reviewer_info_selector: Some("p.reviewer-info".into()),
            pagination_marker_selector: None,
            detail: Some(DetailLink::default()),
            skin_type: Some(Classifier::pattern(r"[/／]\s*([^/／\s]*肌)")),
            gender: None,
            requires_user_agent: false,
            export_encoding: TextEncoding::ShiftJis,
            max_pages_cap: Some(1000),
        }
    }

    /// Qoo10: review text only, paging block marks further pages.
    pub fn qoo10() -> Self {
        Self {
            name: "qoo10".into(),
            label: "Qoo10".into(),
            base_url: "https://www.qoo10.jp".into(),
            listing_path: "/g/{product_id}/?page={page}".into(),
            listing_selector: "p.review_txt".into(),
            review_body_selector: None,
            rating_selector: None,
            reviewer_info_selector: None,
            pagination_marker_selector: Some("div#pagingQA".into()),
            detail: None,
            skin_type: None,
            gender: None,
            requires_user_agent: true,
            export_encoding: TextEncoding::Utf8Bom,
            max_pages_cap: None,
        }
    }

    /// Rakuten Ichiba review pages.
    pub fn rakuten() -> Self {
        Self {
            name: "rakuten".into(),
            label: "楽天市場".into(),
            base_url: "https://review.rakuten.co.jp".into(),
            listing_path: "/item/1/{product_id}?p={page}".into(),
            listing_selector: "div[class*='review-detail']".into(),
            review_body_selector: Some("div[class*='review-body']".into()),
            rating_selector: Some("div[class*='review-rating'] span".into()),
            reviewer_info_selector: Some("div[class*='reviewer-info']".into()),
            pagination_marker_selector: None,
            detail: None,
            skin_type: None,
            gender: Some(Classifier::vocabulary(["女性", "男性"])),
            requires_user_agent: false,
            export_encoding: TextEncoding::ShiftJis,
            max_pages_cap: Some(100),
        }
    }

    /// Same adapter pointed at another host (mirrors, test servers).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Validates selectors, patterns, and the URL template.
    pub fn compile(&self) -> Result<CompiledAdapter, KuchikomiError> {
        for placeholder in ["{product_id}", "{page}"] {
            if !self.listing_path.contains(placeholder) {
                return Err(KuchikomiError::Adapter(format!(
                    "adapter '{}': listing_path must contain {}",
                    self.name, placeholder
                )));
            }
        }
        parse_url(&self.base_url).map_err(|e| {
            KuchikomiError::Adapter(format!("adapter '{}': {}", self.name, e))
        })?;

        let source = match &self.detail {
            None => ReviewSource::Inline,
            Some(detail) => ReviewSource::Detail {
                link: self.optional_selector(detail.link_selector.as_deref())?,
            },
        };

        Ok(CompiledAdapter {
            listing: self.selector(&self.listing_selector)?,
            body: self.optional_selector(self.review_body_selector.as_deref())?,
            rating: self.optional_selector(self.rating_selector.as_deref())?,
            reviewer_info: self.optional_selector(self.reviewer_info_selector.as_deref())?,
            pagination_marker: self
                .optional_selector(self.pagination_marker_selector.as_deref())?,
            source,
            skin_type: self.skin_type.as_ref().map(Classifier::compile).transpose()?,
            gender: self.gender.as_ref().map(Classifier::compile).transpose()?,
            site: self.clone(),
        })
    }

    fn selector(&self, css: &str) -> Result<Selector, KuchikomiError> {
        Selector::parse(css).map_err(|e| {
            KuchikomiError::Adapter(format!(
                "adapter '{}': invalid selector '{}': {:?}",
                self.name, css, e
            ))
        })
    }

    fn optional_selector(&self, css: Option<&str>) -> Result<Option<Selector>, KuchikomiError> {
        css.map(|c| self.selector(c)).transpose()
    }

    /// Columns this adapter can populate, in export order.
    pub fn columns(&self) -> Vec<Column> {
        let has_info = self.reviewer_info_selector.is_some();
        let mut cols = Vec::new();
        if self.rating_selector.is_some() {
            cols.push(Column::Score);
        }
        if has_info {
            cols.push(Column::Age);
        }
        if has_info && self.skin_type.is_some() {
            cols.push(Column::SkinType);
        }
        if has_info && self.gender.is_some() {
            cols.push(Column::Gender);
        }
        cols.push(Column::Comment);
        cols
    }

    /// One-line summary of the selectors, for logs and `sites` output.
    pub fn describe_selectors(&self) -> String {
        let mut parts = vec![format!("listing={}", self.listing_selector)];
        let optional = [
            ("body", &self.review_body_selector),
            ("rating", &self.rating_selector),
            ("info", &self.reviewer_info_selector),
            ("more", &self.pagination_marker_selector),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                parts.push(format!("{}={}", key, v));
            }
        }
        if let Some(detail) = &self.detail {
            parts.push(format!(
                "detail_link={}",
                detail.link_selector.as_deref().unwrap_or("<container>")
            ));
        }
        parts.join(" | ")
    }
}

/// Where a listing container's fields are read from.
#[derive(Debug)]
pub(crate) enum ReviewSource {
    Inline,
    Detail { link: Option<Selector> },
}

/// A [`SiteAdapter`] with its selectors and patterns compiled.
#[derive(Debug)]
pub struct CompiledAdapter {
    site: SiteAdapter,
    pub(crate) listing: Selector,
    pub(crate) body: Option<Selector>,
    pub(crate) rating: Option<Selector>,
    pub(crate) reviewer_info: Option<Selector>,
    pub(crate) pagination_marker: Option<Selector>,
    pub(crate) source: ReviewSource,
    pub(crate) skin_type: Option<CompiledClassifier>,
    pub(crate) gender: Option<CompiledClassifier>,
}

impl CompiledAdapter {
    pub fn site(&self) -> &SiteAdapter {
        &self.site
    }

    pub fn name(&self) -> &str {
        &self.site.name
    }

    /// Listing URL for `product_id` at `page` (1-based). The id is
    /// percent-encoded so reserved characters stay inside its path segment.
    pub fn listing_url(&self, product_id: &str, page: u32) -> Result<Url, KuchikomiError> {
        let path = self
            .site
            .listing_path
            .replace("{product_id}", &urlencoding::encode(product_id))
            .replace("{page}", &page.to_string());
        let raw = format!("{}{}", self.site.base_url.trim_end_matches('/'), path);
        Ok(parse_url(&raw)?)
    }
}

#[derive(Deserialize)]
struct AdapterFile {
    #[serde(default)]
    site: Vec<SiteAdapter>,
}

/// The set of adapters available to a run: built-ins plus any loaded from
/// TOML files, later definitions replacing earlier ones of the same name.
#[derive(Debug, Clone)]
pub struct AdapterRegistry {
    adapters: Vec<SiteAdapter>,
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AdapterRegistry {
    pub fn builtin() -> Self {
        Self {
            adapters: vec![SiteAdapter::cosme(), SiteAdapter::qoo10(), SiteAdapter::rakuten()],
        }
    }

    /// Adds adapters from a TOML document of `[[site]]` tables.
    pub fn extend_from_toml(&mut self, text: &str) -> Result<usize, KuchikomiError> {
        let file: AdapterFile = toml::from_str(text)
            .map_err(|e| KuchikomiError::Adapter(format!("invalid adapter file: {}", e)))?;
        let count = file.site.len();
        for adapter in file.site {
            adapter.compile()?;
            self.insert(adapter);
        }
        Ok(count)
    }

    pub fn extend_from_file(&mut self, path: &Path) -> Result<usize, KuchikomiError> {
        let text = std::fs::read_to_string(path)?;
        let count = self.extend_from_toml(&text)?;
        tracing::info!("Loaded {} adapter(s) from {}", count, path.display());
        Ok(count)
    }

    pub fn insert(&mut self, adapter: SiteAdapter) {
        match self
            .adapters
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(&adapter.name))
        {
            Some(existing) => *existing = adapter,
            None => self.adapters.push(adapter),
        }
    }

    pub fn get(&self, name: &str) -> Result<&SiteAdapter, KuchikomiError> {
        let wanted = name.trim();
        self.adapters
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                KuchikomiError::InvalidInput(format!(
                    "unknown site '{}'. Known sites: {}",
                    name,
                    self.names().join(", ")
                ))
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SiteAdapter> {
        self.adapters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_compile() {
        for adapter in AdapterRegistry::builtin().iter() {
            adapter
                .compile()
                .unwrap_or_else(|e| panic!("{} failed to compile: {}", adapter.name, e));
        }
    }

    #[test]
    fn listing_urls() {
        let cosme = SiteAdapter::cosme().compile().unwrap();
        assert_eq!(
            cosme.listing_url("10205860", 3).unwrap().as_str(),
            "https://www.cosme.net/products/10205860/review/?page=3"
        );
        let rakuten = SiteAdapter::rakuten().compile().unwrap();
        assert_eq!(
            rakuten.listing_url("354955_10000308", 1).unwrap().as_str(),
            "https://review.rakuten.co.jp/item/1/354955_10000308?p=1"
        );
    }

    #[test]
    fn reserved_characters_in_product_id_are_encoded() {
        let rakuten = SiteAdapter::rakuten().compile().unwrap();
        let url = rakuten.listing_url("42#x/y?&", 2).unwrap();
        assert_eq!(
            url.as_str(),
            "https://review.rakuten.co.jp/item/1/42%23x%2Fy%3F%26?p=2"
        );
        assert_eq!(url.query(), Some("p=2"));
        assert_eq!(url.fragment(), None);

        let cosme = SiteAdapter::cosme().compile().unwrap();
        assert_eq!(
            cosme.listing_url("{page}", 1).unwrap().as_str(),
            "https://www.cosme.net/products/%7Bpage%7D/review/?page=1"
        );
    }

    #[test]
    fn base_url_override() {
        let adapter = SiteAdapter::qoo10()
            .with_base_url("http://127.0.0.1:9999/")
            .compile()
            .unwrap();
        assert_eq!(
            adapter.listing_url("1018510911", 2).unwrap().as_str(),
            "http://127.0.0.1:9999/g/1018510911/?page=2"
        );
    }

    #[test]
    fn columns_follow_exposed_fields() {
        assert_eq!(
            SiteAdapter::cosme().columns(),
            vec![Column::Score, Column::Age, Column::SkinType, Column::Comment]
        );
        assert_eq!(SiteAdapter::qoo10().columns(), vec![Column::Comment]);
        assert_eq!(
            SiteAdapter::rakuten().columns(),
            vec![Column::Score, Column::Age, Column::Gender, Column::Comment]
        );
    }

    #[test]
    fn template_without_page_is_rejected() {
        let mut adapter = SiteAdapter::cosme();
        adapter.listing_path = "/products/{product_id}/review/".into();
        assert!(matches!(adapter.compile(), Err(KuchikomiError::Adapter(_))));
    }

    #[test]
    fn invalid_selector_is_rejected() {
        let mut adapter = SiteAdapter::qoo10();
        adapter.listing_selector = "p[[".into();
        let err = adapter.compile().unwrap_err();
        assert!(err.to_string().contains("invalid selector"));
    }

    #[test]
    fn toml_adds_and_overrides() {
        let mut registry = AdapterRegistry::builtin();
        let added = registry
            .extend_from_toml(
                r#"
                [[site]]
                name = "lips"
                label = "LIPS"
                base_url = "https://lipscosme.com"
                listing_path = "/products/{product_id}/reviews?page={page}"
                listing_selector = "div.review"
                review_body_selector = "p.body"
                reviewer_info_selector = "span.profile"
                export_encoding = "utf-8"
                gender = { kind = "vocabulary", terms = ["女性", "男性"] }

                [[site]]
                name = "QOO10"
                label = "Qoo10 mirror"
                base_url = "https://mirror.example"
                listing_path = "/g/{product_id}?page={page}"
                listing_selector = "p.review_txt"
                "#,
            )
            .unwrap();
        assert_eq!(added, 2);

        let lips = registry.get("lips").unwrap();
        assert_eq!(lips.export_encoding, TextEncoding::Utf8);
        assert_eq!(lips.columns(), vec![Column::Age, Column::Gender, Column::Comment]);

        assert_eq!(registry.get("qoo10").unwrap().label, "Qoo10 mirror");
        assert_eq!(registry.names().len(), 4);
    }

    #[test]
    fn unknown_site_lists_known() {
        let err = AdapterRegistry::builtin().get("amazon").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("cosme"));
        assert!(msg.contains("rakuten"));
    }

    #[test]
    fn selector_description_mentions_detail() {
        let desc = SiteAdapter::cosme().describe_selectors();
        assert!(desc.contains("listing=span.read-more a.cmn-viewmore"));
        assert!(desc.contains("detail_link=<container>"));
        assert!(!desc.contains("more="));
    }
}

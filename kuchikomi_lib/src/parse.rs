//! Listing and detail page parsing.
//!
//! Parsing is synchronous and returns owned values so the parsed document
//! never lives across an await point.

use kuchikomi_http::{resolve_link, Url};
use scraper::{ElementRef, Html, Selector};

use crate::adapter::{CompiledAdapter, ReviewSource};
use crate::fields::{clean_text, parse_age, parse_score};
use crate::record::ReviewRecord;

/// Whether the listing says more pages follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    HasMore,
    Exhausted,
}

/// One usable entry found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEntry {
    /// Fields were available inline.
    Record(ReviewRecord),
    /// Fields live on this detail page.
    Detail(Url),
}

/// What one listing page yielded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// Review containers matched, including ones that were skipped.
    pub containers: usize,
    pub entries: Vec<ListingEntry>,
    pub pagination: Pagination,
}

impl ListingPage {
    pub fn is_empty(&self) -> bool {
        self.containers == 0
    }
}

/// Parses a listing page fetched from `page_url`.
pub fn parse_listing(adapter: &CompiledAdapter, html: &str, page_url: &Url) -> ListingPage {
    let document = Html::parse_document(html);
    let containers: Vec<ElementRef<'_>> = document.select(&adapter.listing).collect();

    let entries = containers
        .iter()
        .filter_map(|container| match &adapter.source {
            ReviewSource::Inline => {
                inline_record(adapter, *container).map(ListingEntry::Record)
            }
            ReviewSource::Detail { link } => {
                detail_link(*container, link.as_ref(), page_url).map(ListingEntry::Detail)
            }
        })
        .collect();

    let pagination = match &adapter.pagination_marker {
        Some(marker) if document.select(marker).next().is_none() => Pagination::Exhausted,
        _ => Pagination::HasMore,
    };

    ListingPage {
        containers: containers.len(),
        entries,
        pagination,
    }
}

/// Parses a per-review detail page. `None` when it has no review body.
pub fn parse_detail(adapter: &CompiledAdapter, html: &str) -> Option<ReviewRecord> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let comment = match &adapter.body {
        Some(body) => first_text(root, body)?,
        None => clean_text(root.text())?,
    };
    Some(build_record(adapter, root, comment))
}

fn inline_record(adapter: &CompiledAdapter, container: ElementRef<'_>) -> Option<ReviewRecord> {
    let comment = match &adapter.body {
        Some(body) => first_text(container, body)?,
        None => clean_text(container.text())?,
    };
    Some(build_record(adapter, container, comment))
}

fn build_record(adapter: &CompiledAdapter, scope: ElementRef<'_>, comment: String) -> ReviewRecord {
    let rating = adapter.rating.as_ref().and_then(|s| first_text(scope, s));
    let info = adapter
        .reviewer_info
        .as_ref()
        .and_then(|s| first_text(scope, s));

    let classify = |classifier: Option<&crate::fields::CompiledClassifier>| {
        classifier.zip(info.as_deref()).and_then(|(c, text)| c.classify(text))
    };

    ReviewRecord {
        score: parse_score(rating.as_deref()),
        age: info.as_deref().and_then(parse_age),
        skin_type: classify(adapter.skin_type.as_ref()),
        gender: classify(adapter.gender.as_ref()),
        comment,
    }
}

fn detail_link(container: ElementRef<'_>, link: Option<&Selector>, page_url: &Url) -> Option<Url> {
    let anchor = match link {
        Some(selector) => container.select(selector).next()?,
        None => container,
    };
    let href = anchor.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    match resolve_link(page_url, href) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Skipping unusable detail link: {}", e);
            None
        }
    }
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|el| clean_text(el.text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::SiteAdapter;
    use kuchikomi_http::parse_url;

    fn page_url() -> Url {
        parse_url("https://www.cosme.net/products/1/review/?page=1").unwrap()
    }

    #[test]
    fn cosme_listing_collects_detail_links() {
        let adapter = SiteAdapter::cosme().compile().unwrap();
        let html = r#"
            <div class="review">
              <span class="read-more"><a class="cmn-viewmore" href="/reviews/100">続きを読む</a></span>
            </div>
            <div class="review">
              <span class="read-more"><a class="cmn-viewmore" href="https://www.cosme.net/reviews/101">続きを読む</a></span>
            </div>
            <div class="review">
              <span class="read-more"><a class="cmn-viewmore">リンクなし</a></span>
            </div>"#;
        let page = parse_listing(&adapter, html, &page_url());
        assert_eq!(page.containers, 3);
        assert_eq!(
            page.entries,
            vec![
                ListingEntry::Detail(parse_url("https://www.cosme.net/reviews/100").unwrap()),
                ListingEntry::Detail(parse_url("https://www.cosme.net/reviews/101").unwrap()),
            ]
        );
        assert_eq!(page.pagination, Pagination::HasMore);
    }

    #[test]
    fn cosme_detail_fields() {
        let adapter = SiteAdapter::cosme().compile().unwrap();
        let html = r#"
            <div class="rating clearfix"><p class="reviewer-rating">★4.0</p></div>
            <p class="reviewer-info">32歳 / 乾燥肌 / クチコミ投稿12件</p>
            <p class="read">
                伸びが良くて使いやすいです。
            </p>"#;
        let record = parse_detail(&adapter, html).unwrap();
        assert_eq!(record.score, Some(4));
        assert_eq!(record.age.as_deref(), Some("32歳"));
        assert_eq!(record.skin_type.as_deref(), Some("乾燥肌"));
        assert_eq!(record.gender, None);
        assert_eq!(record.comment, "伸びが良くて使いやすいです。");
    }

    #[test]
    fn detail_without_body_is_skipped() {
        let adapter = SiteAdapter::cosme().compile().unwrap();
        let html = r#"<div class="rating clearfix"><p class="reviewer-rating">★5</p></div>"#;
        assert_eq!(parse_detail(&adapter, html), None);
    }

    #[test]
    fn missing_fields_degrade_independently() {
        let adapter = SiteAdapter::cosme().compile().unwrap();
        let html = r#"<p class="reviewer-info">乾燥肌の人向け</p><p class="read">良い</p>"#;
        let record = parse_detail(&adapter, html).unwrap();
        assert_eq!(record.score, None);
        assert_eq!(record.age, None);
        assert_eq!(record.skin_type, None);
        assert_eq!(record.comment, "良い");
    }

    #[test]
    fn rakuten_inline_records() {
        let adapter = SiteAdapter::rakuten().compile().unwrap();
        let html = r#"
            <div class="review-detail--a1">
              <div class="review-rating--x"><span>5</span></div>
              <div class="reviewer-info--y">40代前半 / 女性</div>
              <div class="review-body--z">リピートしています</div>
            </div>
            <div class="review-detail--a1">
              <div class="reviewer-info--y">男性</div>
            </div>
            <div class="review-detail--a1">
              <div class="review-body--z">  普通  </div>
            </div>"#;
        let url = parse_url("https://review.rakuten.co.jp/item/1/x?p=1").unwrap();
        let page = parse_listing(&adapter, html, &url);
        assert_eq!(page.containers, 3);
        assert_eq!(
            page.entries,
            vec![
                ListingEntry::Record(ReviewRecord {
                    score: Some(5),
                    age: Some("40代前半".into()),
                    skin_type: None,
                    gender: Some("女性".into()),
                    comment: "リピートしています".into(),
                }),
                ListingEntry::Record(ReviewRecord::new("普通")),
            ]
        );
    }

    #[test]
    fn qoo10_pagination_marker() {
        let adapter = SiteAdapter::qoo10().compile().unwrap();
        let url = parse_url("https://www.qoo10.jp/g/1/?page=1").unwrap();

        let with_marker = r#"<p class="review_txt"> 最高 </p><div id="pagingQA">1 2 3</div>"#;
        let page = parse_listing(&adapter, with_marker, &url);
        assert_eq!(page.entries, vec![ListingEntry::Record(ReviewRecord::new("最高"))]);
        assert_eq!(page.pagination, Pagination::HasMore);

        let last = r#"<p class="review_txt">最後</p>"#;
        assert_eq!(
            parse_listing(&adapter, last, &url).pagination,
            Pagination::Exhausted
        );
    }

    #[test]
    fn empty_listing() {
        let adapter = SiteAdapter::qoo10().compile().unwrap();
        let url = parse_url("https://www.qoo10.jp/g/1/?page=9").unwrap();
        let page = parse_listing(&adapter, "<html><body>no reviews</body></html>", &url);
        assert!(page.is_empty());
        assert!(page.entries.is_empty());
    }
}

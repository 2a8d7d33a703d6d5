//! The paginated review extractor.
//!
//! Fetches one listing page at a time, strictly in sequence, with a fixed
//! pause between pages. A fetch failure ends the run but keeps every record
//! from the pages completed before it.

use chrono::Utc;
use kuchikomi_http::Client;
use tokio::time::sleep;

use crate::adapter::{CompiledAdapter, SiteAdapter};
use crate::config::ExtractorConfig;
use crate::error::KuchikomiError;
use crate::parse::{parse_detail, parse_listing, ListingEntry, Pagination};
use crate::progress::ProgressHandle;
use crate::record::{ExtractionRequest, ExtractionRun, ReviewRecord, StopReason};

/// Result of processing a single listing page.
enum PageOutcome {
    /// No review containers: the site has run out of pages.
    Empty,
    Reviews {
        records: Vec<ReviewRecord>,
        pagination: Pagination,
    },
}

/// Runs extractions against one site.
pub struct Extractor {
    client: Client,
    adapter: CompiledAdapter,
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(adapter: &SiteAdapter, config: ExtractorConfig) -> Result<Self, KuchikomiError> {
        let adapter = adapter.compile()?;
        let client = Client::new(config.client_config())?;
        if adapter.site().requires_user_agent && client.user_agent().is_omitted() {
            tracing::warn!(
                "{} usually blocks requests without a user agent; sending none as configured",
                adapter.site().label
            );
        }
        Ok(Self {
            client,
            adapter,
            config,
        })
    }

    pub fn adapter(&self) -> &CompiledAdapter {
        &self.adapter
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Runs one extraction without external progress reporting.
    pub async fn extract(&self, request: &ExtractionRequest) -> ExtractionRun {
        self.extract_with_progress(request, &ProgressHandle::new())
            .await
    }

    /// Runs one extraction, publishing progress into `progress` after every
    /// page. The returned run always holds the records gathered so far, even
    /// when it stopped on an error.
    pub async fn extract_with_progress(
        &self,
        request: &ExtractionRequest,
        progress: &ProgressHandle,
    ) -> ExtractionRun {
        let started_at = Utc::now();
        let site = self.adapter.site();
        tracing::info!(
            "Extracting {} reviews for product {} ({})",
            site.label,
            request.product_id,
            match request.max_pages.max() {
                Some(max) => format!("up to {} pages", max),
                None => "all pages".to_string(),
            }
        );
        tracing::info!("Selectors for {}: {}", site.name, site.describe_selectors());

        progress.begin(request.max_pages.max());
        let mut records = Vec::new();
        let mut pages_fetched: u32 = 0;
        let mut page: u32 = 1;

        let stopped = loop {
            if request.max_pages.exceeded_by(page) {
                break StopReason::ReachedMaxPages;
            }

            let outcome = match self.process_page(&request.product_id, page, progress).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Stopping at page {}: {}", page, e);
                    break StopReason::Error {
                        message: e.to_string(),
                    };
                }
            };

            let (page_records, pagination) = match outcome {
                PageOutcome::Empty => {
                    tracing::info!("Page {} has no reviews", page);
                    break StopReason::Exhausted;
                }
                PageOutcome::Reviews {
                    records,
                    pagination,
                } => (records, pagination),
            };

            pages_fetched += 1;
            let count = page_records.len();
            records.extend(page_records);
            progress.page_done(pages_fetched, count);
            tracing::info!(
                "Page {}/{} ({} reviews)",
                page,
                request
                    .max_pages
                    .max()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                count
            );

            if pagination == Pagination::Exhausted {
                break StopReason::Exhausted;
            }
            let Some(next) = page.checked_add(1) else {
                break StopReason::ReachedMaxPages;
            };
            if request.max_pages.exceeded_by(next) {
                break StopReason::ReachedMaxPages;
            }

            if !self.config.page_delay.is_zero() {
                sleep(self.config.page_delay).await;
            }
            page = next;
        };

        progress.finish(&stopped);
        tracing::info!(
            "Finished after {} page(s) with {} review(s): {}",
            pages_fetched,
            records.len(),
            stopped
        );

        ExtractionRun {
            site: site.name.clone(),
            product_id: request.product_id.clone(),
            records,
            pages_fetched,
            stopped,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Fetches and parses one listing page, following detail links when the
    /// adapter needs them. Any fetch failure discards the page.
    async fn process_page(
        &self,
        product_id: &str,
        page: u32,
        progress: &ProgressHandle,
    ) -> Result<PageOutcome, KuchikomiError> {
        let url = self.adapter.listing_url(product_id, page)?;
        progress.fetching(url.as_str());
        let html = self.client.fetch_html(&url).await?;
        let listing = parse_listing(&self.adapter, &html, &url);
        if listing.is_empty() {
            return Ok(PageOutcome::Empty);
        }

        let mut records = Vec::with_capacity(listing.entries.len());
        let mut fetched_detail = false;
        for entry in listing.entries {
            match entry {
                ListingEntry::Record(record) => records.push(record),
                ListingEntry::Detail(detail_url) => {
                    if fetched_detail && !self.config.detail_delay.is_zero() {
                        sleep(self.config.detail_delay).await;
                    }
                    fetched_detail = true;
                    progress.fetching(detail_url.as_str());
                    let body = self.client.fetch_html(&detail_url).await?;
                    match parse_detail(&self.adapter, &body) {
                        Some(record) => records.push(record),
                        None => tracing::debug!("No review body at {}", detail_url),
                    }
                }
            }
        }

        if records.is_empty() {
            tracing::warn!(
                "Page {} matched {} review container(s) but produced no records; the {} selectors may be out of date",
                page,
                listing.containers,
                self.adapter.name()
            );
        }

        Ok(PageOutcome::Reviews {
            records,
            pagination: listing.pagination,
        })
    }
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use kuchikomi_lib::config;
use kuchikomi_lib::validation;
use kuchikomi_lib::{
    export_records, ExtractionRequest, ExtractionRun, Extractor, ExtractorConfig,
    ProgressHandle, StopReason, TextEncoding, UserAgent,
};

use crate::output::{
    print_json, print_reviews_csv, print_reviews_markdown, print_reviews_table, OutputFormat,
};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Args)]
pub struct ReviewsArgs {
    /// Site adapter name (see `kuchikomi sites`)
    #[arg(long)]
    pub site: String,

    /// Product identifier as it appears in the site's URLs
    #[arg(long)]
    pub product: String,

    /// Number of listing pages to fetch
    #[arg(long, conflicts_with = "all_pages", required_unless_present = "all_pages")]
    pub pages: Option<u32>,

    /// Fetch until the site runs out of pages
    #[arg(long)]
    pub all_pages: bool,

    /// Write the CSV export to this file
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Export encoding: shift_jis, utf-8, utf-8-sig (defaults to the site's)
    #[arg(long)]
    pub encoding: Option<String>,

    /// Delay between listing pages in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Delay between detail-page fetches in milliseconds
    #[arg(long)]
    pub detail_delay_ms: Option<u64>,

    /// Send this user agent on every request
    #[arg(long, conflicts_with = "no_user_agent")]
    pub user_agent: Option<String>,

    /// Send no user agent header at all
    #[arg(long)]
    pub no_user_agent: bool,

    /// Override the site's base URL (mirrors, local captures)
    #[arg(long)]
    pub base_url: Option<String>,

    /// TOML file with extra or replacement site adapters
    #[arg(long)]
    pub adapters: Option<PathBuf>,
}

pub async fn run(args: &ReviewsArgs, format: &OutputFormat) -> Result<()> {
    let registry = super::load_registry(args.adapters.as_deref())?;
    let mut adapter = registry.get(&args.site)?.clone();
    if let Some(base_url) = args.base_url.clone().or_else(config::base_url_from_env) {
        adapter = adapter.with_base_url(&base_url);
    }

    let product_id = validation::validate_product_id(&args.product)?;
    let pages = if args.all_pages { None } else { args.pages };
    let bound = validation::validate_max_pages(pages, &adapter)?;
    let encoding = match &args.encoding {
        Some(e) => e.parse::<TextEncoding>()?,
        None => adapter.export_encoding,
    };

    let extractor = Extractor::new(&adapter, build_config(args))?;
    let request = ExtractionRequest::new(product_id, bound);

    let progress = ProgressHandle::new();
    let display = tokio::spawn(show_progress(progress.clone(), bound.max()));
    let run = extractor.extract_with_progress(&request, &progress).await;
    display.await.context("progress display task failed")?;

    print_summary(&run, &adapter.label);

    match format {
        OutputFormat::Table => print_reviews_table(&run.records),
        OutputFormat::Json => print_json(&run),
        OutputFormat::Csv => print_reviews_csv(&run.records)?,
        OutputFormat::Markdown => print_reviews_markdown(&run.records),
    }

    if let Some(path) = &args.out {
        if run.stopped.is_error() && run.records.is_empty() {
            eprintln!("Nothing extracted; {} not written", path.display());
        } else {
            let bytes = export_records(&run.records, &adapter.columns(), encoding)?;
            std::fs::write(path, bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "Wrote {} review(s) to {} ({})",
                run.records.len(),
                path.display(),
                encoding
            );
        }
    }

    if let StopReason::Error { message } = &run.stopped {
        bail!(
            "extraction stopped after {} page(s): {}",
            run.pages_fetched,
            message
        );
    }

    Ok(())
}

fn build_config(args: &ReviewsArgs) -> ExtractorConfig {
    let mut config = ExtractorConfig::from_env();
    if let Some(ms) = args.delay_ms {
        config.page_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = args.detail_delay_ms {
        config.detail_delay = Duration::from_millis(ms);
    }
    if args.no_user_agent {
        config.user_agent = UserAgent::Omit;
    } else if let Some(ua) = &args.user_agent {
        config.user_agent = UserAgent::from_setting(ua);
    }
    config
}

/// Redraws a progress bar from the shared handle until the run finishes.
async fn show_progress(progress: ProgressHandle, total: Option<u32>) {
    let pb = match total {
        Some(n) => {
            let pb = ProgressBar::new(n as u64);
            pb.set_style(
                ProgressStyle::with_template(
                    "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} ({eta}) {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("[{elapsed_precise}] {spinner} page {pos} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(POLL_INTERVAL);
            pb
        }
    };
    pb.set_message("fetching reviews...");

    loop {
        let snap = progress.snapshot();
        pb.set_position(snap.pages_fetched as u64);
        if snap.finished {
            let reason = snap
                .stopped
                .map(|s| s.to_string())
                .unwrap_or_default();
            pb.finish_with_message(format!("{} reviews, {}", snap.records_total, reason));
            break;
        }
        pb.set_message(format!(
            "{} reviews (+{} last page)",
            snap.records_total, snap.records_this_page
        ));
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

fn print_summary(run: &ExtractionRun, label: &str) {
    let elapsed = run.finished_at - run.started_at;
    eprintln!(
        "{} product {}: {} page(s), {} review(s), {} in {:.1}s",
        label,
        run.product_id,
        run.pages_fetched,
        run.records.len(),
        run.stopped,
        elapsed.num_milliseconds() as f64 / 1000.0
    );
}

//! Library layer for kuchikomi: site adapters, field probes, the paginated
//! review extractor, CSV export, and column hashing.
//!
//! Wraps the `kuchikomi_http` fetch layer with per-site parsing rules and a
//! sequential, throttled extraction loop that always returns what it has
//! gathered, even when a fetch fails part way through.

pub mod adapter;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod fields;
pub mod hashing;
pub mod parse;
pub mod progress;
pub mod record;
pub mod validation;

pub use kuchikomi_http;
pub use kuchikomi_http::UserAgent;

pub use adapter::{AdapterRegistry, CompiledAdapter, DetailLink, SiteAdapter};
pub use config::ExtractorConfig;
pub use error::KuchikomiError;
pub use export::{export_records, Column, TextEncoding};
pub use extract::Extractor;
pub use fields::Classifier;
pub use hashing::{hash_columns, HashedTable};
pub use progress::{ProgressHandle, ProgressSnapshot};
pub use record::{ExtractionRequest, ExtractionRun, PageBound, ReviewRecord, StopReason};

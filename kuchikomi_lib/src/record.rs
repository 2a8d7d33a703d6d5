//! Review records and the request/run values that frame one extraction.

use std::fmt;
use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One extracted review. Identity is its position in the run's sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRecord {
    pub score: Option<u8>,
    pub age: Option<String>,
    pub skin_type: Option<String>,
    pub gender: Option<String>,
    pub comment: String,
}

impl ReviewRecord {
    /// A record with only a comment; optional fields start empty.
    pub fn new(comment: impl Into<String>) -> Self {
        Self {
            score: None,
            age: None,
            skin_type: None,
            gender: None,
            comment: comment.into(),
        }
    }
}

/// Upper bound on listing pages for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBound {
    Limit(NonZeroU32),
    /// Keep going until the site reports no further pages.
    All,
}

impl PageBound {
    /// Bound of `n` pages; `None` when `n` is zero.
    pub fn limit(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self::Limit)
    }

    /// The page limit, or `None` when unbounded.
    pub fn max(&self) -> Option<u32> {
        match self {
            Self::Limit(n) => Some(n.get()),
            Self::All => None,
        }
    }

    /// True once `page` lies beyond the bound.
    pub fn exceeded_by(&self, page: u32) -> bool {
        self.max().is_some_and(|max| page > max)
    }
}

/// Input for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub product_id: String,
    pub max_pages: PageBound,
}

impl ExtractionRequest {
    pub fn new(product_id: impl Into<String>, max_pages: PageBound) -> Self {
        Self {
            product_id: product_id.into(),
            max_pages,
        }
    }
}

/// Why a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// The site reported no further pages.
    Exhausted,
    /// The page bound was hit.
    ReachedMaxPages,
    /// A fetch failed; records gathered before it are kept.
    Error { message: String },
}

impl StopReason {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "no more pages"),
            Self::ReachedMaxPages => write!(f, "reached page limit"),
            Self::Error { message } => write!(f, "error: {}", message),
        }
    }
}

/// Outcome of one extraction: the records in page order plus bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionRun {
    pub site: String,
    pub product_id: String,
    pub records: Vec<ReviewRecord>,
    pub pages_fetched: u32,
    pub stopped: StopReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

//! Pull-based progress reporting.
//!
//! The extractor writes into a [`ProgressHandle`]; the host keeps a clone and
//! calls [`ProgressHandle::snapshot`] whenever it wants to redraw.

use std::sync::{Arc, Mutex};

use crate::record::StopReason;

/// Point-in-time view of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub pages_fetched: u32,
    /// Page bound, `None` when fetching until exhausted.
    pub total_planned: Option<u32>,
    pub records_this_page: usize,
    pub records_total: usize,
    /// URL currently being fetched.
    pub current_url: Option<String>,
    pub finished: bool,
    pub stopped: Option<StopReason>,
}

impl ProgressSnapshot {
    /// Completion in percent when the run is bounded.
    pub fn percent(&self) -> Option<u32> {
        let total = self.total_planned?;
        if total == 0 {
            return None;
        }
        Some(((self.pages_fetched as u64 * 100) / total as u64).min(100) as u32)
    }
}

/// Shared, cloneable progress state for one run.
#[derive(Debug, Clone, Default)]
pub struct ProgressHandle {
    inner: Arc<Mutex<ProgressSnapshot>>,
}

impl ProgressHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn update(&self, f: impl FnOnce(&mut ProgressSnapshot)) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state);
    }

    pub(crate) fn begin(&self, total_planned: Option<u32>) {
        self.update(|s| {
            *s = ProgressSnapshot {
                total_planned,
                ..ProgressSnapshot::default()
            }
        });
    }

    pub(crate) fn fetching(&self, url: &str) {
        self.update(|s| s.current_url = Some(url.to_string()));
    }

    pub(crate) fn page_done(&self, pages_fetched: u32, records_this_page: usize) {
        self.update(|s| {
            s.pages_fetched = pages_fetched;
            s.records_this_page = records_this_page;
            s.records_total += records_this_page;
        });
    }

    pub(crate) fn finish(&self, stopped: &StopReason) {
        self.update(|s| {
            s.current_url = None;
            s.finished = true;
            s.stopped = Some(stopped.clone());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let handle = ProgressHandle::new();
        let host = handle.clone();
        handle.begin(Some(4));
        handle.fetching("https://example.com/?page=1");
        assert_eq!(
            host.snapshot().current_url.as_deref(),
            Some("https://example.com/?page=1")
        );

        handle.page_done(1, 10);
        handle.page_done(2, 7);
        let snap = host.snapshot();
        assert_eq!(snap.pages_fetched, 2);
        assert_eq!(snap.records_this_page, 7);
        assert_eq!(snap.records_total, 17);
        assert_eq!(snap.percent(), Some(50));
        assert!(!snap.finished);

        handle.finish(&StopReason::Exhausted);
        let snap = host.snapshot();
        assert!(snap.finished);
        assert_eq!(snap.current_url, None);
        assert_eq!(snap.stopped, Some(StopReason::Exhausted));
    }

    #[test]
    fn unbounded_has_no_percent() {
        let handle = ProgressHandle::new();
        handle.begin(None);
        handle.page_done(3, 5);
        assert_eq!(handle.snapshot().percent(), None);
    }

    #[test]
    fn begin_resets() {
        let handle = ProgressHandle::new();
        handle.begin(Some(2));
        handle.page_done(2, 3);
        handle.finish(&StopReason::ReachedMaxPages);
        handle.begin(Some(5));
        assert_eq!(
            handle.snapshot(),
            ProgressSnapshot {
                total_planned: Some(5),
                ..ProgressSnapshot::default()
            }
        );
    }
}

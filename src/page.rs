//! Pages listed in the sidebar

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

static NEXT_PAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque page identifier, unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(u64);

impl PageId {
    /// Generate a fresh id. Ids are never reused.
    pub fn fresh() -> Self {
        PageId(NEXT_PAGE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page-{}", self.0)
    }
}

/// A browsing entry. Identity is the id; two pages may share a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Page {
    pub id: PageId,
    pub url: Url,
}

impl Page {
    pub fn new(url: Url) -> Self {
        Self {
            id: PageId::fresh(),
            url,
        }
    }

    /// Sidebar label (the absolute URL string)
    pub fn label(&self) -> &str {
        self.url.as_str()
    }
}

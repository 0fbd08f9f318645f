//! Page store: the ordered, append-only page collection.

use crate::page::{Page, PageId};
use tokio::sync::watch;
use url::Url;

/// Owns the sidebar's pages in insertion order.
///
/// The collection is published through a `watch` channel so observers can
/// react to submissions; `list` returns a copy of the current collection.
pub struct PageStore {
    pages: watch::Sender<Vec<Page>>,
}

impl PageStore {
    pub fn new() -> Self {
        let (pages, _) = watch::channel(Vec::new());
        Self { pages }
    }

    /// Create a store pre-seeded with one page per URL, in order.
    pub fn with_urls<I>(urls: I) -> Self
    where
        I: IntoIterator<Item = Url>,
    {
        let store = Self::new();
        for url in urls {
            store.submit(url);
        }
        store
    }

    /// Append a new page for `url` and return its id.
    pub fn submit(&self, url: Url) -> PageId {
        let page = Page::new(url);
        let id = page.id;
        log::debug!("store: appending {} -> {}", id, page.url);
        self.pages.send_modify(|pages| pages.push(page));
        id
    }

    /// Current collection, in insertion order.
    pub fn list(&self) -> Vec<Page> {
        self.pages.borrow().clone()
    }

    pub fn get(&self, id: PageId) -> Option<Page> {
        self.pages.borrow().iter().find(|p| p.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.pages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Observe the collection; the receiver is notified after every submit.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Page>> {
        self.pages.subscribe()
    }
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn submit_appends_in_order_with_unique_ids() {
        let store = PageStore::new();
        let urls = ["https://a.example", "https://b.example", "https://a.example"];
        let ids: Vec<_> = urls.iter().map(|u| store.submit(url(u))).collect();

        let pages = store.list();
        assert_eq!(pages.len(), urls.len());
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.id, ids[i]);
            assert_eq!(page.url, url(urls[i]));
        }
        let unique: HashSet<_> = pages.iter().map(|p| p.id).collect();
        assert_eq!(unique.len(), urls.len());
    }

    #[test]
    fn get_finds_by_id() {
        let store = PageStore::with_urls([url("https://a.example")]);
        let id = store.list()[0].id;
        assert_eq!(store.get(id).map(|p| p.url), Some(url("https://a.example")));
        assert!(store.get(PageId::fresh()).is_none());
    }

    #[test]
    fn subscribers_see_submissions() {
        let store = PageStore::new();
        let mut rx = store.subscribe();
        assert!(rx.borrow_and_update().is_empty());

        store.submit(url("https://a.example"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }

    #[test]
    fn list_is_a_copy() {
        let store = PageStore::new();
        store.submit(url("https://a.example"));
        let before = store.list();
        store.submit(url("https://b.example"));
        assert_eq!(before.len(), 1);
        assert_eq!(store.len(), 2);
    }
}

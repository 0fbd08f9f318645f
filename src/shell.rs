//! Shell controller: selection, URL entry and snapshot state.
//!
//! `Shell` is the top of the UI-thread object graph. It owns the page store,
//! the mounted detail pane (if any) and the snapshot slot the pane's adapter
//! publishes into. A reconciliation host calls [`Shell::reconcile`] after
//! every state change and may call it more often; passes with unchanged
//! inputs do nothing beyond republishing the capture function.

use crate::adapter::SurfaceAdapter;
use crate::bridge::SnapshotSlot;
use crate::page::{Page, PageId};
use crate::store::PageStore;
use crate::surface::{PaneId, SurfaceFactory};
use crate::{Bitmap, Result, ShellConfig};
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use tokio::task::JoinHandle;
use url::Url;

/// What the detail area shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    NoPageSelected,
    Page {
        page: Page,
        /// Last captured bitmap, scaled for display over the pane
        overlay: Option<Bitmap>,
    },
}

/// One sidebar row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub id: PageId,
    pub label: String,
    pub selected: bool,
}

struct Pane<S: crate::RenderingSurface + 'static> {
    page: PageId,
    adapter: SurfaceAdapter<S>,
}

pub struct Shell<F: SurfaceFactory> {
    factory: F,
    store: PageStore,
    url_text: String,
    selection: Option<PageId>,
    pane: Option<Pane<F::Surface>>,
    slot: SnapshotSlot,
    bitmap: Rc<RefCell<Option<Bitmap>>>,
    snapshot_scale: f32,
    passes: u64,
}

impl<F: SurfaceFactory> Shell<F> {
    /// Build a shell seeded from `config`. No pane is mounted until a page is
    /// selected and a reconciliation pass runs.
    pub fn new(config: &ShellConfig, factory: F) -> Result<Self> {
        let pages = config.validate()?;
        Ok(Self {
            factory,
            store: PageStore::with_urls(pages),
            url_text: config.initial_url_text.clone(),
            selection: None,
            pane: None,
            slot: SnapshotSlot::new(),
            bitmap: Rc::new(RefCell::new(None)),
            snapshot_scale: config.snapshot_scale,
            passes: 0,
        })
    }

    pub fn store(&self) -> &PageStore {
        &self.store
    }

    pub fn pages(&self) -> Vec<Page> {
        self.store.list()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    // --- URL entry ---

    pub fn url_text(&self) -> &str {
        &self.url_text
    }

    pub fn set_url_text(&mut self, text: impl Into<String>) {
        self.url_text = text.into();
    }

    /// Submit the URL field. On a parse failure the field is left as is and
    /// nothing else happens.
    pub fn submit_url_text(&mut self) -> Option<PageId> {
        match Url::parse(&self.url_text) {
            Ok(url) => {
                self.url_text.clear();
                Some(self.store.submit(url))
            }
            Err(e) => {
                log::debug!("shell: ignoring URL text {:?}: {}", self.url_text, e);
                None
            }
        }
    }

    // --- selection ---

    pub fn select_page(&mut self, id: PageId) {
        self.selection = Some(id);
    }

    /// Select the page at sidebar position `index`.
    pub fn select_index(&mut self, index: usize) -> Option<PageId> {
        let id = self.store.list().get(index).map(|p| p.id)?;
        self.select_page(id);
        Some(id)
    }

    pub fn deselect(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<PageId> {
        self.selection
    }

    /// The selected page, or `None` when nothing (or an unknown id) is
    /// selected.
    pub fn selected_page(&self) -> Option<Page> {
        self.selection.and_then(|id| self.store.get(id))
    }

    // --- reconciliation ---

    /// One reconciliation pass over the detail pane.
    ///
    /// Tears down a pane that no longer matches the selection, mounts one for
    /// a newly selected page, and lets the pane's adapter bring its surface in
    /// line with the page's URL.
    pub fn reconcile(&mut self) {
        self.passes += 1;
        let desired = self.selected_page();

        let stale = match (&self.pane, &desired) {
            (Some(pane), Some(page)) => pane.page != page.id,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if stale {
            self.pane = None;
            // the old function could only report a torn-down surface
            self.slot.clear();
        }

        let Some(page) = desired else {
            return;
        };
        let factory = &self.factory;
        let pane = self.pane.get_or_insert_with(|| {
            log::info!("shell: mounting detail pane for {}", page.id);
            Pane {
                page: page.id,
                adapter: SurfaceAdapter::mount(factory),
            }
        });
        pane.adapter.reconcile(&page.url, &self.slot);
    }

    /// Number of reconciliation passes run so far
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Pane currently mounted in the detail area
    pub fn mounted_pane(&self) -> Option<PaneId> {
        self.pane.as_ref().map(|p| p.adapter.pane())
    }

    pub fn snapshot_slot(&self) -> &SnapshotSlot {
        &self.slot
    }

    // --- snapshots ---

    /// Capture through whatever function is published when the returned
    /// future first runs, store the result, and resolve to the bitmap held
    /// afterwards.
    ///
    /// With nothing published, or when the capture fails, the stored bitmap
    /// is left untouched. Concurrent requests each store their own result, so
    /// the one that completes last wins.
    pub fn snapshot_request(&self) -> impl Future<Output = Option<Bitmap>> + 'static {
        let slot = self.slot.clone();
        let stored = Rc::clone(&self.bitmap);
        async move {
            match slot.invoke() {
                None => log::debug!("shell: snapshot requested with no capture function"),
                Some(capture) => match capture.await {
                    Ok(bitmap) => {
                        log::debug!(
                            "shell: captured {}x{} from {:?}",
                            bitmap.width,
                            bitmap.height,
                            bitmap.url.as_ref().map(Url::as_str)
                        );
                        *stored.borrow_mut() = Some(bitmap);
                    }
                    Err(e) => log::warn!("shell: snapshot failed: {}", e),
                },
            }
            let current = stored.borrow().clone();
            current
        }
    }

    /// Spawn [`Shell::snapshot_request`] on the current `LocalSet`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a `LocalSet`.
    pub fn request_snapshot(&self) -> JoinHandle<Option<Bitmap>> {
        tokio::task::spawn_local(self.snapshot_request())
    }

    pub fn last_bitmap(&self) -> Option<Bitmap> {
        self.bitmap.borrow().clone()
    }

    pub fn clear_bitmap(&mut self) {
        self.bitmap.borrow_mut().take();
    }

    // --- view model ---

    pub fn sidebar(&self) -> Vec<SidebarEntry> {
        self.store
            .list()
            .into_iter()
            .map(|page| SidebarEntry {
                id: page.id,
                label: page.label().to_string(),
                selected: self.selection == Some(page.id),
            })
            .collect()
    }

    pub fn detail(&self) -> DetailView {
        match self.selected_page() {
            None => DetailView::NoPageSelected,
            Some(page) => DetailView::Page {
                page,
                overlay: self
                    .bitmap
                    .borrow()
                    .as_ref()
                    .map(|b| b.scaled(self.snapshot_scale)),
            },
        }
    }
}

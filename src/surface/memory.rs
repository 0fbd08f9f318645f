//! In-memory rendering surface for deterministic tests and demos.
//!
//! `MemorySurface` never touches the network: `load` records the URL and
//! captures return a viewport-sized bitmap filled with a colour derived from
//! the loaded URL. Every lifecycle step is appended to a shared
//! `SurfaceJournal` so tests can count navigations per pane.

use super::{PaneId, RenderingSurface, SurfaceFactory};
use crate::{Bitmap, Result, Viewport};
use futures::future::LocalBoxFuture;
use sha2::{Digest, Sha256};
use std::cell::{Cell, RefCell};
use std::sync::{Arc, Mutex};
use url::Url;

/// Something that happened to a memory surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Created(PaneId),
    Load(PaneId, Url),
    Captured(PaneId, Option<Url>),
    TornDown(PaneId),
}

/// Shared, thread-safe event log. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct SurfaceJournal {
    events: Arc<Mutex<Vec<SurfaceEvent>>>,
}

impl SurfaceJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: SurfaceEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Every navigation issued, in order.
    pub fn loads(&self) -> Vec<(PaneId, Url)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Load(pane, url) => Some((pane, url)),
                _ => None,
            })
            .collect()
    }

    pub fn load_count(&self) -> usize {
        self.loads().len()
    }

    /// Panes whose surface has been created, in creation order.
    pub fn created(&self) -> Vec<PaneId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Created(pane) => Some(pane),
                _ => None,
            })
            .collect()
    }

    pub fn torn_down(&self) -> Vec<PaneId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::TornDown(pane) => Some(pane),
                _ => None,
            })
            .collect()
    }
}

/// Fill colour a memory surface uses for `url`: white when nothing is
/// loaded, otherwise the first three bytes of the URL's SHA-256.
pub fn fill_colour(url: Option<&Url>) -> [u8; 4] {
    match url {
        None => [255, 255, 255, 255],
        Some(url) => {
            let digest = Sha256::digest(url.as_str().as_bytes());
            [digest[0], digest[1], digest[2], 255]
        }
    }
}

pub struct MemorySurface {
    pane: PaneId,
    viewport: Viewport,
    url: RefCell<Option<Url>>,
    torn_down: Cell<bool>,
    capture_yields: u32,
    journal: SurfaceJournal,
}

impl MemorySurface {
    pub fn new(pane: PaneId, viewport: Viewport, journal: SurfaceJournal) -> Self {
        journal.record(SurfaceEvent::Created(pane));
        Self {
            pane,
            viewport,
            url: RefCell::new(None),
            torn_down: Cell::new(false),
            capture_yields: 1,
            journal,
        }
    }

    /// Suspend `yields` times in every capture before reading the frame
    /// (at least once).
    pub fn with_capture_yields(mut self, yields: u32) -> Self {
        self.capture_yields = yields.max(1);
        self
    }

    pub fn pane(&self) -> PaneId {
        self.pane
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.get()
    }
}

impl RenderingSurface for MemorySurface {
    fn current_url(&self) -> Option<Url> {
        self.url.borrow().clone()
    }

    fn load(&self, url: &Url) {
        self.journal.record(SurfaceEvent::Load(self.pane, url.clone()));
        *self.url.borrow_mut() = Some(url.clone());
    }

    fn capture_visible_content(&self) -> LocalBoxFuture<'_, Result<Bitmap>> {
        Box::pin(async move {
            for _ in 0..self.capture_yields {
                tokio::task::yield_now().await;
            }
            let url = self.current_url();
            self.journal
                .record(SurfaceEvent::Captured(self.pane, url.clone()));
            let colour = fill_colour(url.as_ref());
            Ok(Bitmap::filled(self.viewport.width, self.viewport.height, colour).with_url(url))
        })
    }

    fn teardown(&self) {
        self.torn_down.set(true);
        self.journal.record(SurfaceEvent::TornDown(self.pane));
    }
}

/// Creates `MemorySurface`s that all report into one journal.
#[derive(Debug, Clone)]
pub struct MemorySurfaceFactory {
    viewport: Viewport,
    journal: SurfaceJournal,
    capture_yields: Cell<u32>,
}

impl MemorySurfaceFactory {
    pub fn new(viewport: Viewport, journal: SurfaceJournal) -> Self {
        Self {
            viewport,
            journal,
            capture_yields: Cell::new(1),
        }
    }

    /// How many times surfaces created from now on suspend per capture.
    pub fn set_capture_yields(&self, yields: u32) {
        self.capture_yields.set(yields);
    }

    pub fn journal(&self) -> &SurfaceJournal {
        &self.journal
    }
}

impl Default for MemorySurfaceFactory {
    fn default() -> Self {
        Self::new(Viewport::default(), SurfaceJournal::new())
    }
}

impl SurfaceFactory for MemorySurfaceFactory {
    type Surface = MemorySurface;

    fn make_surface(&self, pane: PaneId) -> MemorySurface {
        MemorySurface::new(pane, self.viewport, self.journal.clone())
            .with_capture_yields(self.capture_yields.get())
    }
}

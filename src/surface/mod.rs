//! Rendering surfaces: the retained, UI-thread-bound objects that load and
//! display a document.
//!
//! A surface is created once per detail pane through a `SurfaceFactory` and
//! lives until the pane is torn down. All methods take `&self` and are only
//! ever called on the UI thread, so implementations keep their state in
//! `Cell`/`RefCell`. A capture may be in flight while the next
//! reconciliation pass issues a `load`; implementations must not hold a
//! `RefCell` borrow across an await point.

use crate::Bitmap;
use crate::Result;
use futures::future::LocalBoxFuture;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

#[cfg(feature = "headless")]
pub mod headless;
pub mod memory;

static NEXT_PANE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one mounted detail pane (and therefore one surface instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneId(u64);

impl PaneId {
    pub fn fresh() -> Self {
        PaneId(NEXT_PANE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pane-{}", self.0)
    }
}

/// An embedded rendering surface.
pub trait RenderingSurface {
    /// URL of the document the surface has been asked to show, if any.
    fn current_url(&self) -> Option<Url>;

    /// Start navigating to `url`. Fire-and-forget: completion and failure are
    /// not reported back.
    fn load(&self, url: &Url);

    /// Serialize the visible content into a bitmap. Begins and ends on the UI
    /// thread.
    fn capture_visible_content(&self) -> LocalBoxFuture<'_, Result<Bitmap>>;

    /// Called once when the owning pane is removed.
    fn teardown(&self) {}
}

/// Constructs one surface per mounted pane.
pub trait SurfaceFactory {
    type Surface: RenderingSurface + 'static;

    fn make_surface(&self, pane: PaneId) -> Self::Surface;
}

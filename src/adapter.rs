//! Rendering surface adapter: keeps one retained surface in step with the
//! page a detail pane is showing.

use crate::bridge::{CaptureFn, SnapshotSlot};
use crate::surface::{PaneId, RenderingSurface, SurfaceFactory};
use crate::Error;
use std::rc::Rc;
use url::Url;

/// What a reconciliation pass did to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The surface was asked to load the desired URL
    Navigated,
    /// The surface already had the desired URL
    Unchanged,
}

/// Owns the surface of one detail pane for the pane's lifetime.
///
/// The surface is created when the adapter is mounted and torn down when the
/// adapter is dropped. Capture functions only hold a weak reference, so once
/// the pane is gone they resolve to `Error::SurfaceTornDown` instead of
/// keeping a dead surface alive.
pub struct SurfaceAdapter<S: RenderingSurface + 'static> {
    pane: PaneId,
    surface: Rc<S>,
    navigations: u64,
}

impl<S: RenderingSurface + 'static> SurfaceAdapter<S> {
    /// Mount a new pane, constructing its surface through `factory`.
    pub fn mount<F>(factory: &F) -> Self
    where
        F: SurfaceFactory<Surface = S>,
    {
        let pane = PaneId::fresh();
        log::info!("adapter: mounting {}", pane);
        Self::new(pane, factory.make_surface(pane))
    }

    pub fn new(pane: PaneId, surface: S) -> Self {
        Self {
            pane,
            surface: Rc::new(surface),
            navigations: 0,
        }
    }

    pub fn pane(&self) -> PaneId {
        self.pane
    }

    /// Navigations issued by this adapter so far
    pub fn navigations(&self) -> u64 {
        self.navigations
    }

    /// One reconciliation pass.
    ///
    /// Loads `desired` only when the surface shows something else, then
    /// publishes a fresh capture function unconditionally.
    pub fn reconcile(&mut self, desired: &Url, slot: &SnapshotSlot) -> Reconciled {
        let outcome = if self.surface.current_url().as_ref() == Some(desired) {
            Reconciled::Unchanged
        } else {
            log::debug!("adapter: {} navigating to {}", self.pane, desired);
            self.surface.load(desired);
            self.navigations += 1;
            Reconciled::Navigated
        };
        slot.publish(self.capture_fn());
        outcome
    }

    /// A capture function bound to this pane's surface instance.
    pub fn capture_fn(&self) -> CaptureFn {
        let pane = self.pane;
        let surface = Rc::downgrade(&self.surface);
        CaptureFn::new(pane, move || {
            let surface = surface.clone();
            Box::pin(async move {
                let surface = surface
                    .upgrade()
                    .ok_or(Error::SurfaceTornDown(pane.get()))?;
                let bitmap = surface.capture_visible_content().await?;
                Ok(bitmap)
            })
        })
    }
}

impl<S: RenderingSurface + 'static> Drop for SurfaceAdapter<S> {
    fn drop(&mut self) {
        log::info!("adapter: tearing down {}", self.pane);
        self.surface.teardown();
    }
}

//! Snapshot bridge: hands the *current* capture function from a surface
//! adapter to the shell across reconciliation passes.
//!
//! The adapter publishes a fresh `CaptureFn` on every pass and the slot keeps
//! only the latest one (last write wins, no queue). The shell invokes whatever
//! is in the slot at the time it asks for a snapshot, so it never has to know
//! which surface instance is live.

use crate::surface::PaneId;
use crate::{Bitmap, Result};
use futures::future::LocalBoxFuture;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Future produced by invoking a capture function.
pub type CaptureFuture = LocalBoxFuture<'static, Result<Bitmap>>;

/// A zero-argument async handle bound to one surface instance.
#[derive(Clone)]
pub struct CaptureFn {
    pane: PaneId,
    capture: Rc<dyn Fn() -> CaptureFuture>,
}

impl CaptureFn {
    pub fn new<F>(pane: PaneId, capture: F) -> Self
    where
        F: Fn() -> CaptureFuture + 'static,
    {
        Self {
            pane,
            capture: Rc::new(capture),
        }
    }

    /// Pane whose surface this function captures
    pub fn pane(&self) -> PaneId {
        self.pane
    }

    pub fn call(&self) -> CaptureFuture {
        (self.capture)()
    }
}

impl fmt::Debug for CaptureFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureFn").field("pane", &self.pane).finish()
    }
}

/// Single-slot, last-write-wins holder for the current capture function.
///
/// Clones share the slot.
#[derive(Clone, Default)]
pub struct SnapshotSlot {
    current: Rc<RefCell<Option<CaptureFn>>>,
    publishes: Rc<Cell<u64>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever was published before. A capture already running
    /// from an earlier function is unaffected.
    pub fn publish(&self, capture: CaptureFn) {
        *self.current.borrow_mut() = Some(capture);
        self.publishes.set(self.publishes.get() + 1);
    }

    /// Start the most recently published capture, or `None` if nothing has
    /// been published.
    pub fn invoke(&self) -> Option<CaptureFuture> {
        // clone out first: the capture body may publish again
        let current = self.current.borrow().clone();
        current.map(|capture| capture.call())
    }

    /// Drop the published function, if any.
    pub fn clear(&self) {
        self.current.borrow_mut().take();
    }

    pub fn current_pane(&self) -> Option<PaneId> {
        self.current.borrow().as_ref().map(CaptureFn::pane)
    }

    pub fn is_published(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Total number of publishes since creation.
    pub fn publish_count(&self) -> u64 {
        self.publishes.get()
    }
}

impl fmt::Debug for SnapshotSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotSlot")
            .field("current", &self.current_pane())
            .field("publishes", &self.publishes.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(pane: PaneId, rgba: [u8; 4]) -> CaptureFn {
        CaptureFn::new(pane, move || {
            Box::pin(async move { Ok(Bitmap::filled(1, 1, rgba)) })
        })
    }

    #[tokio::test]
    async fn invoke_without_publish_is_none() {
        let slot = SnapshotSlot::new();
        assert!(slot.invoke().is_none());
        assert!(!slot.is_published());
    }

    #[tokio::test]
    async fn last_publish_wins() {
        let slot = SnapshotSlot::new();
        let (first, second) = (PaneId::fresh(), PaneId::fresh());
        slot.publish(constant(first, [1, 1, 1, 255]));
        slot.publish(constant(second, [2, 2, 2, 255]));

        assert_eq!(slot.current_pane(), Some(second));
        assert_eq!(slot.publish_count(), 2);
        let bitmap = slot.invoke().unwrap().await.unwrap();
        assert_eq!(bitmap.pixel(0, 0), Some([2, 2, 2, 255]));
    }

    #[tokio::test]
    async fn publish_during_capture_does_not_disturb_it() {
        let slot = SnapshotSlot::new();
        slot.publish(constant(PaneId::fresh(), [1, 1, 1, 255]));
        let in_flight = slot.invoke().unwrap();

        slot.publish(constant(PaneId::fresh(), [2, 2, 2, 255]));
        let bitmap = in_flight.await.unwrap();
        assert_eq!(bitmap.pixel(0, 0), Some([1, 1, 1, 255]));
    }

    #[test]
    fn clear_empties_the_slot() {
        let slot = SnapshotSlot::new();
        slot.publish(constant(PaneId::fresh(), [0, 0, 0, 255]));
        let shared = slot.clone();
        shared.clear();
        assert!(!slot.is_published());
        assert!(slot.invoke().is_none());
    }
}

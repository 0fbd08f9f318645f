//! Headless rendering surface.
//!
//! `load` starts an HTTP fetch on the UI thread's runtime and returns
//! immediately; `capture_visible_content` waits for the latest fetch to
//! settle, then lays out and rasterizes the document. A failed fetch renders
//! as an empty page. There is no script execution and no styling.

use super::{PaneId, RenderingSurface, SurfaceFactory};
use crate::rendering::{render_blank, render_document};
use crate::{Bitmap, Error, Result, ShellConfig, Viewport};
use futures::future::{BoxFuture, FutureExt, LocalBoxFuture, Shared};
use reqwest::Client;
use std::cell::{Cell, RefCell};
use std::time::Duration;
use tokio::task::AbortHandle;
use url::Url;

type Fetch = Shared<BoxFuture<'static, std::result::Result<String, String>>>;

enum Document {
    Empty,
    Pending {
        generation: u64,
        fetch: Fetch,
        abort: AbortHandle,
    },
    Ready(String),
    Failed(String),
}

async fn fetch_document(client: Client, url: Url) -> std::result::Result<String, String> {
    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| format!("Failed to fetch {}: {}", url, e))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(format!("Failed to fetch {}: HTTP {}", url, status));
    }
    resp.text()
        .await
        .map_err(|e| format!("Failed to read response body: {}", e))
}

pub struct HeadlessSurface {
    pane: PaneId,
    client: Client,
    viewport: Viewport,
    url: RefCell<Option<Url>>,
    document: RefCell<Document>,
    generation: Cell<u64>,
    torn_down: Cell<bool>,
}

impl HeadlessSurface {
    pub fn new(pane: PaneId, client: Client, viewport: Viewport) -> Self {
        Self {
            pane,
            client,
            viewport,
            url: RefCell::new(None),
            document: RefCell::new(Document::Empty),
            generation: Cell::new(0),
            torn_down: Cell::new(false),
        }
    }

    /// Wait until the latest fetch, if any, has settled and record its
    /// outcome. A load issued while waiting restarts the wait on its fetch.
    async fn settle(&self) {
        loop {
            let pending = match &*self.document.borrow() {
                Document::Pending {
                    generation, fetch, ..
                } => Some((*generation, fetch.clone())),
                _ => None,
            };
            let Some((generation, fetch)) = pending else {
                return;
            };

            let outcome = fetch.await;
            if self.generation.get() != generation {
                continue;
            }
            let settled = match outcome {
                Ok(html) => Document::Ready(html),
                Err(e) => {
                    log::warn!("headless: {} load failed: {}", self.pane, e);
                    Document::Failed(e)
                }
            };
            *self.document.borrow_mut() = settled;
            return;
        }
    }

    /// Whether the last load has completed successfully
    pub fn is_ready(&self) -> bool {
        matches!(&*self.document.borrow(), Document::Ready(_))
    }

    /// Why the last load failed, if it did
    pub fn load_error(&self) -> Option<Error> {
        match &*self.document.borrow() {
            Document::Failed(e) => Some(Error::LoadError(e.clone())),
            _ => None,
        }
    }
}

impl RenderingSurface for HeadlessSurface {
    fn current_url(&self) -> Option<Url> {
        self.url.borrow().clone()
    }

    fn load(&self, url: &Url) {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        *self.url.borrow_mut() = Some(url.clone());

        let handle = tokio::spawn(fetch_document(self.client.clone(), url.clone()));
        let abort = handle.abort_handle();
        let fetch = async move {
            match handle.await {
                Ok(res) => res,
                Err(e) => Err(format!("fetch task ended: {}", e)),
            }
        }
        .boxed()
        .shared();

        let previous = std::mem::replace(
            &mut *self.document.borrow_mut(),
            Document::Pending {
                generation,
                fetch,
                abort,
            },
        );
        if let Document::Pending { abort, .. } = previous {
            abort.abort();
        }
        log::debug!("headless: {} loading {}", self.pane, url);
    }

    fn capture_visible_content(&self) -> LocalBoxFuture<'_, Result<Bitmap>> {
        Box::pin(async move {
            if self.torn_down.get() {
                return Err(Error::CaptureError(format!("{} has been torn down", self.pane)));
            }
            self.settle().await;
            let url = self.current_url();
            let html = match &*self.document.borrow() {
                Document::Ready(html) => Some(html.clone()),
                _ => None,
            };
            let bitmap = match html {
                Some(html) => render_document(&html, self.viewport),
                None => render_blank(self.viewport),
            };
            Ok(bitmap.with_url(url))
        })
    }

    fn teardown(&self) {
        self.torn_down.set(true);
        self.generation.set(self.generation.get() + 1);
        if let Document::Pending { abort, .. } =
            std::mem::replace(&mut *self.document.borrow_mut(), Document::Empty)
        {
            abort.abort();
        }
        log::debug!("headless: {} torn down", self.pane);
    }
}

/// Creates headless surfaces sharing one HTTP client.
#[derive(Clone)]
pub struct HeadlessSurfaceFactory {
    client: Client,
    viewport: Viewport,
}

impl HeadlessSurfaceFactory {
    pub fn new(config: &ShellConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            viewport: config.viewport,
        })
    }
}

impl SurfaceFactory for HeadlessSurfaceFactory {
    type Surface = HeadlessSurface;

    fn make_surface(&self, pane: PaneId) -> HeadlessSurface {
        HeadlessSurface::new(pane, self.client.clone(), self.viewport)
    }
}

//! Threaded facade over the UI-thread shell.
//!
//! The shell, its surfaces and capture functions are `!Send` and must stay on
//! one thread. `ShellHandle` spawns that thread (a current-thread tokio
//! runtime driving a `LocalSet`), builds the surface factory on it, and
//! forwards commands over a channel. Every state-changing command runs a
//! reconciliation pass before it replies; `ShellConfig::redraw_interval_ms`
//! adds periodic passes on top.

use crate::page::{Page, PageId};
use crate::shell::{DetailView, Shell};
use crate::surface::SurfaceFactory;
use crate::{Bitmap, Error, Result, ShellConfig};
use std::thread;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::LocalSet;
use tokio::time::Interval;

enum Command {
    SetUrlText(String, oneshot::Sender<()>),
    SubmitUrlText(oneshot::Sender<Option<PageId>>),
    Open(String, oneshot::Sender<Option<PageId>>),
    Select(PageId, oneshot::Sender<()>),
    SelectIndex(usize, oneshot::Sender<Option<PageId>>),
    Deselect(oneshot::Sender<()>),
    Pages(oneshot::Sender<Vec<Page>>),
    Detail(oneshot::Sender<DetailView>),
    Snapshot(oneshot::Sender<Option<Bitmap>>),
    Passes(oneshot::Sender<u64>),
    Close(oneshot::Sender<()>),
}

/// A `Send + Clone` handle to a shell running on its own UI thread.
#[derive(Clone)]
pub struct ShellHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl ShellHandle {
    /// Spawn the UI thread. `make_factory` runs on that thread, so the
    /// factory (and its surfaces) never need to be `Send`.
    pub async fn spawn<F, M>(config: ShellConfig, make_factory: M) -> Result<Self>
    where
        F: SurfaceFactory + 'static,
        M: FnOnce(&ShellConfig) -> Result<F> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<Command>();
        let (init_tx, init_rx) = oneshot::channel::<Result<()>>();

        thread::Builder::new()
            .name("pageshell-ui".into())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        let _ = init_tx.send(Err(Error::InitializationError(format!(
                            "Failed to build UI runtime: {}",
                            e
                        ))));
                        return;
                    }
                };
                let local = LocalSet::new();
                local.block_on(&rt, run_ui(config, make_factory, init_tx, cmd_rx));
            })
            .map_err(|e| Error::InitializationError(format!("Failed to spawn UI thread: {}", e)))?;

        // Wait for the UI thread to report initialization success or failure
        init_rx
            .await
            .map_err(|e| Error::InitializationError(format!("UI thread init canceled: {}", e)))??;

        Ok(Self { cmd_tx })
    }

    /// Spawn a shell backed by headless surfaces.
    #[cfg(feature = "headless")]
    pub async fn headless(config: ShellConfig) -> Result<Self> {
        Self::spawn(config, crate::surface::headless::HeadlessSurfaceFactory::new).await
    }

    async fn request<T>(
        &self,
        what: &str,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .map_err(|_| Error::Closed(format!("{} not delivered", what)))?;
        rx.await
            .map_err(|e| Error::Closed(format!("{} canceled: {}", what, e)))
    }

    /// Replace the URL entry text
    pub async fn set_url_text(&self, text: &str) -> Result<()> {
        let text = text.to_string();
        self.request("SetUrlText", |tx| Command::SetUrlText(text, tx))
            .await
    }

    /// Submit the URL entry text; `None` when it did not parse.
    pub async fn submit_url_text(&self) -> Result<Option<PageId>> {
        self.request("SubmitUrlText", Command::SubmitUrlText).await
    }

    /// Type `text` into the URL field and submit it in one step.
    pub async fn open(&self, text: &str) -> Result<Option<PageId>> {
        let text = text.to_string();
        self.request("Open", |tx| Command::Open(text, tx)).await
    }

    pub async fn select(&self, id: PageId) -> Result<()> {
        self.request("Select", |tx| Command::Select(id, tx)).await
    }

    /// Select by sidebar position; `None` when out of range.
    pub async fn select_index(&self, index: usize) -> Result<Option<PageId>> {
        self.request("SelectIndex", |tx| Command::SelectIndex(index, tx))
            .await
    }

    pub async fn deselect(&self) -> Result<()> {
        self.request("Deselect", Command::Deselect).await
    }

    pub async fn pages(&self) -> Result<Vec<Page>> {
        self.request("Pages", Command::Pages).await
    }

    pub async fn detail(&self) -> Result<DetailView> {
        self.request("Detail", Command::Detail).await
    }

    /// Request a snapshot and wait for it; resolves to the bitmap the shell
    /// holds once the capture completes (unchanged if nothing was captured).
    pub async fn snapshot(&self) -> Result<Option<Bitmap>> {
        self.request("Snapshot", Command::Snapshot).await
    }

    /// Reconciliation passes run on the UI thread so far
    pub async fn passes(&self) -> Result<u64> {
        self.request("Passes", Command::Passes).await
    }

    /// Tear down the shell and stop the UI thread.
    pub async fn close(self) -> Result<()> {
        self.request("Close", Command::Close).await
    }
}

async fn redraw_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn run_ui<F, M>(
    config: ShellConfig,
    make_factory: M,
    init_tx: oneshot::Sender<Result<()>>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
) where
    F: SurfaceFactory + 'static,
    M: FnOnce(&ShellConfig) -> Result<F>,
{
    let mut shell = match make_factory(&config).and_then(|factory| Shell::new(&config, factory)) {
        Ok(shell) => shell,
        Err(e) => {
            let _ = init_tx.send(Err(e));
            return;
        }
    };
    shell.reconcile();
    let _ = init_tx.send(Ok(()));
    log::info!("ui: shell ready with {} pages", shell.store().len());

    let mut redraw = (config.redraw_interval_ms > 0)
        .then(|| tokio::time::interval(Duration::from_millis(config.redraw_interval_ms)));

    loop {
        let cmd = tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
            _ = redraw_tick(&mut redraw) => {
                shell.reconcile();
                continue;
            }
        };

        match cmd {
            Command::SetUrlText(text, resp) => {
                shell.set_url_text(text);
                shell.reconcile();
                let _ = resp.send(());
            }
            Command::SubmitUrlText(resp) => {
                let id = shell.submit_url_text();
                shell.reconcile();
                let _ = resp.send(id);
            }
            Command::Open(text, resp) => {
                shell.set_url_text(text);
                let id = shell.submit_url_text();
                shell.reconcile();
                let _ = resp.send(id);
            }
            Command::Select(id, resp) => {
                shell.select_page(id);
                shell.reconcile();
                let _ = resp.send(());
            }
            Command::SelectIndex(index, resp) => {
                let id = shell.select_index(index);
                shell.reconcile();
                let _ = resp.send(id);
            }
            Command::Deselect(resp) => {
                shell.deselect();
                shell.reconcile();
                let _ = resp.send(());
            }
            Command::Pages(resp) => {
                let _ = resp.send(shell.pages());
            }
            Command::Detail(resp) => {
                let _ = resp.send(shell.detail());
            }
            Command::Snapshot(resp) => {
                // runs alongside later commands; the last capture to finish wins
                let request = shell.snapshot_request();
                tokio::task::spawn_local(async move {
                    let _ = resp.send(request.await);
                });
            }
            Command::Passes(resp) => {
                let _ = resp.send(shell.passes());
            }
            Command::Close(resp) => {
                drop(shell);
                let _ = resp.send(());
                log::info!("ui: shell closed");
                return;
            }
        }
    }
    log::info!("ui: all handles dropped, shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::memory::{MemorySurfaceFactory, SurfaceJournal};
    use crate::Viewport;

    fn config() -> ShellConfig {
        ShellConfig {
            viewport: Viewport { width: 8, height: 8 },
            initial_pages: Vec::new(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn commands_round_trip_through_ui_thread() {
        let journal = SurfaceJournal::new();
        let j = journal.clone();
        let handle = ShellHandle::spawn(config(), move |cfg| {
            Ok(MemorySurfaceFactory::new(cfg.viewport, j))
        })
        .await
        .unwrap();

        assert!(handle.open("not a url").await.unwrap().is_none());
        let id = handle.open("https://a.example").await.unwrap().unwrap();
        assert_eq!(handle.pages().await.unwrap().len(), 1);

        handle.select(id).await.unwrap();
        assert_eq!(journal.load_count(), 1);

        let bitmap = handle.snapshot().await.unwrap().unwrap();
        assert_eq!(bitmap.url.unwrap().as_str(), "https://a.example/");

        handle.close().await.unwrap();
        assert_eq!(journal.torn_down().len(), 1);
    }

    #[tokio::test]
    async fn factory_failure_is_reported() {
        let res = ShellHandle::spawn(config(), |_cfg| -> Result<MemorySurfaceFactory> {
            Err(Error::InitializationError("no surfaces".into()))
        })
        .await;
        assert!(matches!(res, Err(Error::InitializationError(_))));
    }

    #[tokio::test]
    async fn commands_after_close_fail() {
        let handle = ShellHandle::spawn(config(), |cfg| {
            Ok(MemorySurfaceFactory::new(cfg.viewport, SurfaceJournal::new()))
        })
        .await
        .unwrap();
        let other = handle.clone();
        handle.close().await.unwrap();
        assert!(matches!(other.pages().await, Err(Error::Closed(_))));
    }
}

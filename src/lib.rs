//! pageshell
//!
//! A minimal multi-page browser shell: a sidebar of pages, a detail pane that
//! shows the selected page in a retained rendering surface, and on-demand
//! bitmap snapshots of whatever that surface currently shows.
//!
//! # Architecture
//!
//! - **Page store** ([`store`]): ordered, append-only collection of pages
//! - **Surface adapter** ([`adapter`]): owns one surface per mounted pane and
//!   reconciles it against the selected page without redundant reloads
//! - **Snapshot bridge** ([`bridge`]): last-write-wins slot through which the
//!   adapter republishes its capture function on every pass
//! - **Shell controller** ([`shell`]): selection, URL entry and snapshot state
//!
//! All of the above live on a single UI thread and are `!Send`.
//! [`async_api::ShellHandle`] runs them on a dedicated thread and exposes a
//! `Send` async facade.
//!
//! # Example
//!
//! ```no_run
//! use pageshell::surface::memory::MemorySurfaceFactory;
//! use pageshell::{Shell, ShellConfig};
//!
//! # async fn run() -> pageshell::Result<()> {
//! let config = ShellConfig::default();
//! let mut shell = Shell::new(&config, MemorySurfaceFactory::default())?;
//! shell.select_index(0);
//! shell.reconcile();
//!
//! let local = tokio::task::LocalSet::new();
//! let bitmap = local.run_until(shell.snapshot_request()).await;
//! println!("captured: {:?}", bitmap.map(|b| b.digest()));
//! # Ok(())
//! # }
//! ```

use serde::Deserialize;
use std::path::Path;
use url::Url;

pub mod error;
pub use error::{Error, Result};

pub mod adapter;
pub mod bitmap;
pub mod bridge;
pub mod page;
pub mod shell;
pub mod store;
pub mod surface;

// Layout, paint and raster for the headless surface
#[cfg(feature = "headless")]
pub mod rendering;

// Threaded facade over the UI-thread shell
pub mod async_api;

pub use adapter::{Reconciled, SurfaceAdapter};
pub use async_api::ShellHandle;
pub use bitmap::Bitmap;
pub use bridge::{CaptureFn, SnapshotSlot};
pub use page::{Page, PageId};
pub use shell::{DetailView, Shell, SidebarEntry};
pub use store::PageStore;
pub use surface::{PaneId, RenderingSurface, SurfaceFactory};

/// Configuration for the browser shell
///
/// Defaults seed the sidebar with two pages and pre-fill the URL field, and
/// render at 1280x720.
///
/// # Examples
///
/// ```
/// let cfg = pageshell::ShellConfig::default();
/// assert_eq!(cfg.initial_pages.len(), 2);
/// assert_eq!(cfg.snapshot_scale, 0.5);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Size of every rendering surface (and therefore every capture)
    pub viewport: Viewport,
    /// User agent string sent by the headless surface
    pub user_agent: String,
    /// Timeout for document fetches in milliseconds
    pub timeout_ms: u64,
    /// Pages the store starts with, in sidebar order
    pub initial_pages: Vec<String>,
    /// Initial contents of the URL entry field
    pub initial_url_text: String,
    /// Extra reconciliation passes on the UI thread (0 disables)
    pub redraw_interval_ms: u64,
    /// Scale applied to the captured bitmap when shown over the detail pane
    pub snapshot_scale: f32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) pageshell/0.1".to_string(),
            timeout_ms: 30000,
            initial_pages: vec![
                "https://www.objc.io".to_string(),
                "https://www.apple.com".to_string(),
            ],
            initial_url_text: "https://www.objc.io".to_string(),
            redraw_interval_ms: 0,
            snapshot_scale: 0.5,
        }
    }
}

impl ShellConfig {
    /// Read a JSON config file; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        let config: ShellConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config and parse `initial_pages`.
    pub fn validate(&self) -> Result<Vec<Url>> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::ConfigError(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if !(self.snapshot_scale > 0.0 && self.snapshot_scale <= 1.0) {
            return Err(Error::ConfigError(format!(
                "snapshot_scale must be in (0, 1], got {}",
                self.snapshot_scale
            )));
        }
        self.initial_pages
            .iter()
            .map(|s| {
                Url::parse(s)
                    .map_err(|e| Error::ConfigError(format!("initial page {:?}: {}", s, e)))
            })
            .collect()
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShellConfig::default();
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.viewport.height, 720);
        assert_eq!(config.validate().unwrap().len(), 2);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ShellConfig =
            serde_json::from_str(r#"{"viewport": {"width": 320, "height": 200}, "initial_pages": []}"#)
                .unwrap();
        assert_eq!(config.viewport, Viewport { width: 320, height: 200 });
        assert!(config.initial_pages.is_empty());
        assert_eq!(config.timeout_ms, 30000);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let bad_page = ShellConfig {
            initial_pages: vec!["not a url".into()],
            ..Default::default()
        };
        assert!(matches!(bad_page.validate(), Err(Error::ConfigError(_))));

        let bad_scale = ShellConfig {
            snapshot_scale: 0.0,
            ..Default::default()
        };
        assert!(bad_scale.validate().is_err());

        for scale in [1.5, 1e9, f32::NAN] {
            let cfg = ShellConfig {
                snapshot_scale: scale,
                ..Default::default()
            };
            assert!(matches!(cfg.validate(), Err(Error::ConfigError(_))));
        }
        let full = ShellConfig {
            snapshot_scale: 1.0,
            ..Default::default()
        };
        assert!(full.validate().is_ok());

        let empty = ShellConfig {
            viewport: Viewport { width: 0, height: 10 },
            ..Default::default()
        };
        assert!(empty.validate().is_err());
    }
}

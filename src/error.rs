//! Error types for the browser shell

use thiserror::Error;

/// Result type alias for shell operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the browser shell
///
/// None of these cross the shell controller's public operations: submissions,
/// selection changes and snapshot requests absorb them where they occur.
/// They surface from the lower layers (surfaces, bitmaps, configuration and
/// the threaded facade).
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to initialize a surface factory or the UI thread
    #[error("Initialization failed: {0}")]
    InitializationError(String),

    /// Text could not be parsed as an absolute URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to load a document into a surface
    #[error("Failed to load URL: {0}")]
    LoadError(String),

    /// Failed to render or encode content
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// The surface could not produce a frame
    #[error("Capture failed: {0}")]
    CaptureError(String),

    /// A capture function was invoked after its pane was torn down
    #[error("Surface {0} was torn down")]
    SurfaceTornDown(u64),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The UI thread is gone
    #[error("UI thread closed: {0}")]
    Closed(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<png::EncodingError> for Error {
    fn from(err: png::EncodingError) -> Self {
        Error::RenderError(format!("PNG encoding failed: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_become_invalid_url() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, Error::InvalidUrl(_)));
        assert!(err.to_string().starts_with("Invalid URL"));
    }

    #[test]
    fn torn_down_names_the_surface() {
        assert_eq!(Error::SurfaceTornDown(7).to_string(), "Surface 7 was torn down");
    }
}

//! Unified error type for the vodpack application.
//!
//! Library modules funnel their failures into [`Error`]; the binary adds
//! top-level context with `anyhow` and prints the chain on exit.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Unified error type covering all failure modes in vodpack.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input dimensions fall outside every supported aspect-ratio band.
    #[error("aspect ratio cannot be determined from dimensions {width}x{height}")]
    AspectRatio {
        /// Input width in pixels.
        width: u32,
        /// Input height in pixels.
        height: u32,
    },

    /// An external tool could not be located or started.
    #[error("tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// The encoder process ran but exited with a non-zero status.
    #[error("encoder exited with non-zero status ({status})")]
    Encoder {
        /// The encoder's exit status.
        status: ExitStatus,
    },

    /// Media probing failed.
    #[error("probe error: {0}")]
    Probe(String),

    /// The source is already catalogued and no overwrite was requested.
    #[error("source already encoded: {} (pass --overwrite to replace it)", path.display())]
    Duplicate {
        /// Absolute path of the already-catalogued source.
        path: PathBuf,
    },

    /// Reading or writing the catalog file failed.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// The configuration file is present but malformed.
    #[error("config error: {0}")]
    Config(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Catalog`].
    pub fn catalog(message: impl Into<String>) -> Self {
        Error::Catalog(message.into())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_display() {
        let err = Error::AspectRatio {
            width: 1,
            height: 5,
        };
        assert_eq!(
            err.to_string(),
            "aspect ratio cannot be determined from dimensions 1x5"
        );
    }

    #[test]
    fn tool_display() {
        let err = Error::tool("ffmpeg", "failed to spawn: not found");
        assert_eq!(
            err.to_string(),
            "tool error [ffmpeg]: failed to spawn: not found"
        );
    }

    #[test]
    fn duplicate_display() {
        let err = Error::Duplicate {
            path: PathBuf::from("/videos/clip.mp4"),
        };
        assert!(err.to_string().contains("/videos/clip.mp4"));
        assert!(err.to_string().contains("--overwrite"));
    }

    #[test]
    fn catalog_display() {
        let err = Error::catalog("malformed entry");
        assert_eq!(err.to_string(), "catalog error: malformed entry");
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
    }
}

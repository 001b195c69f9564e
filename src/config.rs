//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! storage, tool, and encoding sections. Every section defaults sensibly so a
//! completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub tools: ToolsConfig,
    pub encoding: EncodingConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str).map_err(|e| Error::Config(format!("parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.encoding.segment_seconds == 0 {
            warnings.push("encoding.segment_seconds is 0; ffmpeg will reject it".into());
        }

        if self.encoding.gop_size == 0 {
            warnings.push("encoding.gop_size is 0; keyframe placement is undefined".into());
        }

        if self.encoding.start_number == 0 {
            warnings.push(
                "encoding.start_number is 0; segment numbering may collide with defaults".into(),
            );
        }

        if let Some(ref p) = self.tools.ffmpeg_path {
            if !p.exists() {
                warnings.push(format!("tools.ffmpeg_path {} does not exist", p.display()));
            }
        }

        if let Some(ref p) = self.tools.ffprobe_path {
            if !p.exists() {
                warnings.push(format!("tools.ffprobe_path {} does not exist", p.display()));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Where packages and the catalog live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory holding one subdirectory per package plus the catalog
    /// file. Tilde-expanded at use.
    pub output_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("~/Videos/vodpack"),
        }
    }
}

impl StorageConfig {
    /// Return the output directory with `~` expanded.
    pub fn resolved_output_dir(&self) -> PathBuf {
        let raw = self.output_dir.to_string_lossy();
        PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
    }
}

/// Paths to external CLI tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
}

/// Encoder invocation defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// HLS segment duration in seconds.
    #[serde(default = "default_segment_seconds")]
    pub segment_seconds: u32,
    /// Group-of-pictures size in frames.
    #[serde(default = "default_gop_size")]
    pub gop_size: u32,
    /// First segment number, kept well clear of any pre-existing numbering.
    #[serde(default = "default_start_number")]
    pub start_number: u32,
}

fn default_segment_seconds() -> u32 {
    6
}
fn default_gop_size() -> u32 {
    60
}
fn default_start_number() -> u32 {
    10000
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            segment_seconds: default_segment_seconds(),
            gop_size: default_gop_size(),
            start_number: default_start_number(),
        }
    }
}

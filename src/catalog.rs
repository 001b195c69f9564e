//! On-disk catalog of produced packages.
//!
//! A single JSON document under the storage root records every package ever
//! produced, keyed by source path for duplicate detection and by id for
//! replacement. The CLI layer loads it before an encode and writes it back
//! after; the encode core itself never touches it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of the catalog document under the storage root.
pub const CATALOG_FILE: &str = "catalog.json";

/// One produced package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Package id; also the package directory name under the storage root.
    pub id: String,
    /// Codec name the package was encoded with ("h264" / "h265").
    pub codec: String,
    /// Source creation time, or encode time when the source carried none.
    pub date: DateTime<Utc>,
    /// Encryption key as 32 lowercase hex characters.
    pub key: String,
    /// Display title.
    pub title: String,
    /// Absolute path of the source video.
    pub source_path: PathBuf,
}

/// The catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load the catalog from `path`. A missing file is an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Catalog`] when the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                Error::catalog(format!("failed to parse {}: {e}", path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::catalog(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Write the catalog to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::catalog(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::catalog(format!("failed to serialize catalog: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| Error::catalog(format!("failed to write {}: {e}", path.display())))
    }

    /// Find the entry for a source path, if any.
    pub fn find_by_source(&self, source: &Path) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.source_path == source)
    }

    /// Find an entry whose id or source path matches `needle`.
    pub fn find_by_id_or_source(&self, needle: &str) -> Option<&CatalogEntry> {
        let canonical = Path::new(needle).canonicalize().ok();
        self.entries.iter().find(|e| {
            e.id == needle
                || Some(&e.source_path) == canonical.as_ref()
                || e.source_path == Path::new(needle)
        })
    }

    /// Remove every entry with the given id.
    pub fn remove_id(&mut self, id: &str) {
        self.entries.retain(|e| e.id != id);
    }

    /// Append an entry.
    pub fn push(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, source: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.into(),
            codec: "h264".into(),
            date: Utc::now(),
            key: "00112233445566778899aabbccddeeff".into(),
            title: "Test".into(),
            source_path: PathBuf::from(source),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let catalog = Catalog::load(Path::new("/nonexistent/catalog.json")).unwrap();
        assert!(catalog.entries.is_empty());
    }

    #[test]
    fn save_and_reload_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.json");

        let mut catalog = Catalog::default();
        catalog.push(entry("a1", "/videos/one.mp4"));
        catalog.save(&path).unwrap();

        let reloaded = Catalog::load(&path).unwrap();
        assert_eq!(reloaded.entries, catalog.entries);
    }

    #[test]
    fn save_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/dir/catalog.json");

        Catalog::default().save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn malformed_file_is_a_catalog_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(&path, "not json").unwrap();

        let err = Catalog::load(&path).unwrap_err();
        assert!(matches!(err, Error::Catalog(_)));
    }

    #[test]
    fn field_names_are_camel_case() {
        let mut catalog = Catalog::default();
        catalog.push(entry("a1", "/videos/one.mp4"));
        let json = serde_json::to_string(&catalog).unwrap();
        assert!(json.contains("\"sourcePath\""));
        assert!(!json.contains("source_path"));
    }

    #[test]
    fn duplicate_detection_by_source() {
        let mut catalog = Catalog::default();
        catalog.push(entry("a1", "/videos/one.mp4"));

        assert!(catalog.find_by_source(Path::new("/videos/one.mp4")).is_some());
        assert!(catalog.find_by_source(Path::new("/videos/two.mp4")).is_none());
    }

    #[test]
    fn overwrite_replaces_rather_than_duplicates() {
        let mut catalog = Catalog::default();
        catalog.push(entry("a1", "/videos/one.mp4"));

        // Re-encode of the same source under the same id.
        catalog.remove_id("a1");
        let mut replacement = entry("a1", "/videos/one.mp4");
        replacement.codec = "h265".into();
        catalog.push(replacement);

        assert_eq!(catalog.entries.len(), 1);
        assert_eq!(catalog.entries[0].codec, "h265");
    }

    #[test]
    fn lookup_by_id_or_source() {
        let mut catalog = Catalog::default();
        catalog.push(entry("a1", "/videos/one.mp4"));

        assert!(catalog.find_by_id_or_source("a1").is_some());
        assert!(catalog.find_by_id_or_source("/videos/one.mp4").is_some());
        assert!(catalog.find_by_id_or_source("missing").is_none());
    }
}

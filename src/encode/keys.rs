//! Encryption key provisioning for HLS segment encryption.
//!
//! ffmpeg consumes a "key info" side-channel file describing the playback key
//! URL, the local key file, and the IV. Both files hold live key material, so
//! they are scoped temporaries: dropped (and thus deleted, best-effort) when
//! the owning job finishes, whether it succeeded or not.

use std::io::Write;
use std::path::Path;

use rand::{CryptoRng, RngCore};
use tempfile::NamedTempFile;

use crate::error::Result;

/// Length of the AES-128 key and IV, in bytes.
pub const KEY_LEN: usize = 16;

/// URL the player fetches the key from; the viewer page intercepts this and
/// supplies the key from the URL fragment instead.
pub const KEY_URL: &str = "http://127.0.0.1/playlist.key";

/// Scoped encryption material for one encode job.
///
/// Holds the key file and the key-info descriptor file as named temporaries;
/// both are removed when this value is dropped, on every exit path.
pub struct EncryptionAssets {
    key_file: NamedTempFile,
    key_info_file: NamedTempFile,
}

impl EncryptionAssets {
    /// Path of the key-info file handed to ffmpeg via `-hls_key_info_file`.
    pub fn key_info_path(&self) -> &Path {
        self.key_info_file.path()
    }

    /// Path of the raw key file.
    pub fn key_path(&self) -> &Path {
        self.key_file.path()
    }
}

/// Write the key file and key-info descriptor for the given key.
///
/// The IV is drawn fresh from the caller's CSPRNG. The key-info file has
/// exactly three lines: the key URL, the key file path, and the IV as 32
/// lowercase hex characters.
pub fn provision<R: RngCore + CryptoRng>(
    key: &[u8; KEY_LEN],
    rng: &mut R,
) -> Result<EncryptionAssets> {
    let mut key_file = NamedTempFile::new()?;
    key_file.write_all(key)?;
    key_file.flush()?;

    let mut iv = [0u8; KEY_LEN];
    rng.fill_bytes(&mut iv);

    let mut key_info_file = NamedTempFile::new()?;
    writeln!(key_info_file, "{KEY_URL}")?;
    writeln!(key_info_file, "{}", key_file.path().display())?;
    writeln!(key_info_file, "{}", hex::encode(iv))?;
    key_info_file.flush()?;

    Ok(EncryptionAssets {
        key_file,
        key_info_file,
    })
}

//! Encode job orchestration.
//!
//! One [`EncodeJob`] drives a single ffmpeg invocation producing every
//! selected rung, then writes the master manifest and the static viewer
//! assets. The contract: after [`EncodeJob::run`] returns, the package
//! directory is either fully populated or absent, and the transient key
//! files are gone either way.

pub mod keys;
pub mod ladder;
pub mod manifest;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::{CryptoRng, RngCore};

use crate::config::EncodingConfig;
use crate::error::{Error, Result};
use crate::exec::ToolCommand;
use crate::tools::ToolRegistry;
use self::ladder::{Codec, Rung};

static VIEWER_HTML: &str = include_str!("../../assets/index.html");
static PLAYER_JS: &str = include_str!("../../assets/player.js");

/// One encode request, immutable after construction.
#[derive(Debug)]
pub struct EncodeJob {
    pub video_id: String,
    pub input_path: PathBuf,
    pub input_width: u32,
    pub input_height: u32,
    pub output_root: PathBuf,
    pub codec: Codec,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    key: [u8; keys::KEY_LEN],
}

impl EncodeJob {
    /// Build a job, drawing a fresh 16-byte encryption key from the CSPRNG.
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: RngCore + CryptoRng>(
        video_id: String,
        input_path: PathBuf,
        input_width: u32,
        input_height: u32,
        output_root: PathBuf,
        codec: Codec,
        title: String,
        timestamp: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        let mut key = [0u8; keys::KEY_LEN];
        rng.fill_bytes(&mut key);

        Self {
            video_id,
            input_path,
            input_width,
            input_height,
            output_root,
            codec,
            title,
            timestamp,
            key,
        }
    }

    /// The encryption key as 32 lowercase hex characters, for the catalog
    /// record and the playback locator.
    pub fn key_hex(&self) -> String {
        hex::encode(self.key)
    }

    /// Directory the package is written into.
    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(&self.video_id)
    }

    /// Run the encode: classify, select the ladder, provision key material,
    /// invoke ffmpeg once over all rungs, then write the manifest and viewer
    /// assets.
    ///
    /// On any failure after the output directory is created - including
    /// cancellation at the encoder await point - the directory is removed
    /// before the error propagates.
    pub async fn run<R: RngCore + CryptoRng>(
        &self,
        tools: &ToolRegistry,
        encoding: &EncodingConfig,
        rng: &mut R,
    ) -> Result<()> {
        let out_dir = self.output_dir();
        if out_dir.exists() {
            fs::remove_dir_all(&out_dir)?;
        }
        fs::create_dir_all(&out_dir)?;

        let guard = RollbackGuard::new(&out_dir);

        let aspect = ladder::classify(self.input_width, self.input_height)?;
        let rungs = ladder::select(aspect, self.codec, self.input_width, self.input_height);
        tracing::info!(
            "encoding {} as {} {} with {} rungs",
            self.input_path.display(),
            aspect,
            self.codec,
            rungs.len()
        );

        let assets = keys::provision(&self.key, rng)?;

        let ffmpeg = tools.require("ffmpeg")?;
        let args = self.encoder_args(&rungs, encoding, assets.key_info_path(), &out_dir);

        let output = ToolCommand::new(&ffmpeg.path).args(args).run().await?;
        if !output.status.success() {
            return Err(Error::Encoder {
                status: output.status,
            });
        }

        fs::write(out_dir.join("playlist.m3u8"), manifest::render_master(&rungs))?;
        fs::write(out_dir.join("index.html"), VIEWER_HTML)?;
        fs::write(out_dir.join("player.js"), PLAYER_JS)?;

        guard.disarm();
        tracing::info!("package complete at {}", out_dir.display());
        Ok(())
    }

    /// Build the flat ffmpeg argument list covering all rungs in one
    /// invocation: global options first, then one output group per rung in
    /// ladder order.
    fn encoder_args(
        &self,
        rungs: &[Rung],
        encoding: &EncodingConfig,
        key_info_path: &Path,
        out_dir: &Path,
    ) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "info".to_string(),
            "-i".to_string(),
            self.input_path.to_string_lossy().to_string(),
        ];

        for rung in rungs {
            args.extend([
                "-vcodec".to_string(),
                self.codec.encoder_lib().to_string(),
                "-vf".to_string(),
                format!("scale={}:{}", rung.width, rung.height),
                "-b:v".to_string(),
                format!("{}k", rung.video_bitrate_kbps),
            ]);

            if self.codec == Codec::H264 {
                args.extend([
                    "-profile:v".to_string(),
                    "main".to_string(),
                    "-level".to_string(),
                    "3.1".to_string(),
                ]);
            }

            args.extend([
                "-acodec".to_string(),
                "aac".to_string(),
                "-b:a".to_string(),
                format!("{}k", rung.audio_bitrate_kbps),
                "-g".to_string(),
                encoding.gop_size.to_string(),
                "-hls_time".to_string(),
                encoding.segment_seconds.to_string(),
                "-hls_list_size".to_string(),
                "0".to_string(),
                "-hls_playlist_type".to_string(),
                "vod".to_string(),
                "-start_number".to_string(),
                encoding.start_number.to_string(),
                "-hls_key_info_file".to_string(),
                key_info_path.to_string_lossy().to_string(),
                out_dir.join(rung.stream_file()).to_string_lossy().to_string(),
            ]);
        }

        args
    }
}

/// Removes the package directory on drop unless disarmed.
struct RollbackGuard {
    dir: PathBuf,
    armed: bool,
}

impl RollbackGuard {
    fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RollbackGuard {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = fs::remove_dir_all(&self.dir) {
                tracing::warn!("failed to roll back {}: {e}", self.dir.display());
            }
        }
    }
}

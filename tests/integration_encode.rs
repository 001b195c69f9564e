//! End-to-end orchestration tests.
//!
//! The real encoder is replaced with stub executables (`true`, `false`) so
//! the full job sequence runs without ffmpeg: output-directory lifecycle,
//! manifest and viewer-asset writing, and rollback on failure.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use vodpack::config::{EncodingConfig, ToolsConfig};
use vodpack::encode::ladder::Codec;
use vodpack::encode::EncodeJob;
use vodpack::error::Error;
use vodpack::tools::ToolRegistry;

/// Registry whose "ffmpeg" is an arbitrary real executable.
fn stub_registry(fake_ffmpeg: &Path) -> ToolRegistry {
    ToolRegistry::discover(&ToolsConfig {
        ffmpeg_path: Some(fake_ffmpeg.to_path_buf()),
        ffprobe_path: None,
    })
}

fn job(output_root: &Path, width: u32, height: u32, rng: &mut StdRng) -> EncodeJob {
    EncodeJob::new(
        "deadbeef".into(),
        PathBuf::from("/videos/source.mp4"),
        width,
        height,
        output_root.to_path_buf(),
        Codec::H264,
        "Test video".into(),
        Utc::now(),
        rng,
    )
}

// ---------------------------------------------------------------------------
// Success path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_encode_populates_the_package() {
    let ffmpeg = which::which("true").unwrap();
    let storage = TempDir::new().unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let job = job(storage.path(), 1920, 1080, &mut rng);
    job.run(&stub_registry(&ffmpeg), &EncodingConfig::default(), &mut rng)
        .await
        .unwrap();

    let pkg = storage.path().join("deadbeef");
    assert!(pkg.is_dir());

    let manifest = std::fs::read_to_string(pkg.join("playlist.m3u8")).unwrap();
    assert!(manifest.starts_with("#EXTM3U\n#EXT-X-PLAYLIST-TYPE:VOD\n"));
    assert!(manifest.trim_end().ends_with("#EXT-X-ENDLIST"));
    // 360p leads the master manifest.
    let first_stream = manifest
        .lines()
        .find(|l| l.starts_with("video_"))
        .unwrap();
    assert_eq!(first_stream, "video_360p.m3u8");

    assert!(pkg.join("index.html").exists());
    assert!(pkg.join("player.js").exists());
}

#[tokio::test]
async fn rerun_replaces_a_stale_package_directory() {
    let ffmpeg = which::which("true").unwrap();
    let storage = TempDir::new().unwrap();
    let mut rng = StdRng::seed_from_u64(2);

    let pkg = storage.path().join("deadbeef");
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(pkg.join("stale.m3u8"), "old").unwrap();

    let job = job(storage.path(), 1280, 720, &mut rng);
    job.run(&stub_registry(&ffmpeg), &EncodingConfig::default(), &mut rng)
        .await
        .unwrap();

    assert!(!pkg.join("stale.m3u8").exists());
    assert!(pkg.join("playlist.m3u8").exists());
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn encoder_failure_rolls_back_the_package_directory() {
    let ffmpeg = which::which("false").unwrap();
    let storage = TempDir::new().unwrap();
    let mut rng = StdRng::seed_from_u64(3);

    let job = job(storage.path(), 1920, 1080, &mut rng);
    let err = job
        .run(&stub_registry(&ffmpeg), &EncodingConfig::default(), &mut rng)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Encoder { .. }));
    assert!(!storage.path().join("deadbeef").exists());
}

#[tokio::test]
async fn unstartable_encoder_rolls_back_and_maps_to_tool_error() {
    let storage = TempDir::new().unwrap();
    // A file that exists but is not executable.
    let fake = storage.path().join("ffmpeg");
    std::fs::write(&fake, "#!/bin/sh\n").unwrap();
    let mut rng = StdRng::seed_from_u64(4);

    let job = job(storage.path(), 1920, 1080, &mut rng);
    let err = job
        .run(&stub_registry(&fake), &EncodingConfig::default(), &mut rng)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Tool { .. }));
    assert!(!storage.path().join("deadbeef").exists());
}

#[tokio::test]
async fn unclassifiable_input_fails_before_the_encoder_runs() {
    let ffmpeg = which::which("true").unwrap();
    let storage = TempDir::new().unwrap();
    let mut rng = StdRng::seed_from_u64(5);

    let job = job(storage.path(), 1000, 1000, &mut rng);
    let err = job
        .run(&stub_registry(&ffmpeg), &EncodingConfig::default(), &mut rng)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AspectRatio { .. }));
    assert!(!storage.path().join("deadbeef").exists());
}

//! Adaptive bitrate ladder: aspect classification, rung tables, selection.
//!
//! Each supported `(aspect, codec)` pair maps to a fixed table of output
//! renditions ("rungs") in ascending quality order. Portrait inputs reuse the
//! wide tables with width and height transposed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Output video codec family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    H264,
    H265,
}

impl Codec {
    /// Name as recorded in the catalog and accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Codec::H264 => "h264",
            Codec::H265 => "h265",
        }
    }

    /// The ffmpeg encoder library implementing this codec.
    pub fn encoder_lib(&self) -> &'static str {
        match self {
            Codec::H264 => "libx264",
            Codec::H265 => "libx265",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "h264" => Ok(Codec::H264),
            "h265" => Ok(Codec::H265),
            other => Err(format!("unknown codec '{other}' (expected h264 or h265)")),
        }
    }
}

/// Coarse aspect-ratio bucket selecting which ladder table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectClass {
    Wide16x9,
    Square4x3,
    Tall9x16,
}

impl fmt::Display for AspectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AspectClass::Wide16x9 => "16:9",
            AspectClass::Square4x3 => "4:3",
            AspectClass::Tall9x16 => "9:16",
        };
        f.write_str(s)
    }
}

/// One bitrate/resolution rendition in the adaptive ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rung {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
}

impl Rung {
    /// Name of the segment playlist the encoder writes for this rung.
    pub fn stream_file(&self) -> String {
        format!("video_{}.m3u8", self.name)
    }

    /// Combined bandwidth hint for the master manifest, in bits per second.
    pub fn bandwidth(&self) -> u64 {
        u64::from(self.video_bitrate_kbps + self.audio_bitrate_kbps) * 1024
    }

    /// Copy of this rung with width and height swapped.
    fn transposed(self) -> Self {
        Rung {
            width: self.height,
            height: self.width,
            ..self
        }
    }
}

const fn rung(name: &'static str, width: u32, height: u32, video: u32, audio: u32) -> Rung {
    Rung {
        name,
        width,
        height,
        video_bitrate_kbps: video,
        audio_bitrate_kbps: audio,
    }
}

static H264_WIDE: [Rung; 10] = [
    rung("144p", 256, 144, 75, 32),
    rung("234p", 416, 234, 145, 32),
    rung("360p", 640, 360, 365, 48),
    rung("432pl", 768, 432, 730, 48),
    rung("432ph", 768, 432, 1100, 48),
    rung("540p", 960, 540, 2000, 64),
    rung("720pl", 1280, 720, 3000, 64),
    rung("720ph", 1280, 720, 4500, 72),
    rung("1080pl", 1920, 1080, 6000, 96),
    rung("1080ph", 1920, 1080, 7800, 128),
];

static H264_SQUARE: [Rung; 10] = [
    rung("144p", 192, 144, 65, 32),
    rung("234p", 312, 234, 109, 32),
    rung("360p", 480, 360, 274, 48),
    rung("432pl", 576, 432, 548, 48),
    rung("432ph", 576, 432, 825, 48),
    rung("540p", 720, 540, 1500, 64),
    rung("720pl", 960, 720, 2251, 64),
    rung("720ph", 960, 720, 3376, 72),
    rung("1080pl", 1440, 1080, 4501, 96),
    rung("1080ph", 1440, 1080, 5851, 128),
];

static H265_WIDE: [Rung; 13] = [
    rung("234p", 416, 234, 75, 32),
    rung("360p", 640, 360, 145, 32),
    rung("432p", 768, 432, 300, 48),
    rung("540pl", 960, 540, 600, 48),
    rung("540pm", 960, 540, 900, 48),
    rung("540ph", 960, 540, 1600, 64),
    rung("720pl", 1280, 720, 2400, 64),
    rung("720ph", 1280, 720, 3400, 72),
    rung("1080pl", 1920, 1080, 4500, 72),
    rung("1080ph", 1920, 1080, 5800, 96),
    rung("1440p", 2560, 1440, 8100, 96),
    rung("2160pl", 3840, 2160, 11600, 128),
    rung("2160ph", 3840, 2160, 16800, 128),
];

static H265_SQUARE: [Rung; 13] = [
    rung("234p", 312, 234, 65, 32),
    rung("360p", 480, 360, 109, 32),
    rung("432p", 576, 432, 225, 48),
    rung("540pl", 720, 540, 450, 48),
    rung("540pm", 720, 540, 675, 48),
    rung("540ph", 720, 540, 1200, 64),
    rung("720pl", 960, 720, 1800, 64),
    rung("720ph", 960, 720, 2551, 72),
    rung("1080pl", 1440, 1080, 3376, 72),
    rung("1080ph", 1440, 1080, 4351, 96),
    rung("1440p", 1920, 1440, 6077, 96),
    rung("2160pl", 2880, 2160, 8702, 128),
    rung("2160ph", 2880, 2160, 12603, 128),
];

/// Classify input dimensions into a coarse aspect class.
///
/// Accepts ratios within ±5% of 16:9, 4:3, or 9:16, checked in that order.
///
/// # Errors
///
/// Returns [`Error::AspectRatio`] when the ratio falls outside all three
/// tolerance bands.
pub fn classify(width: u32, height: u32) -> Result<AspectClass> {
    const WIDE: f64 = 16.0 / 9.0;
    const SQUARE: f64 = 4.0 / 3.0;
    const TALL: f64 = 9.0 / 16.0;

    let ratio = f64::from(width) / f64::from(height);
    let within = |target: f64| ratio >= target * 0.95 && ratio <= target * 1.05;

    if within(WIDE) {
        Ok(AspectClass::Wide16x9)
    } else if within(SQUARE) {
        Ok(AspectClass::Square4x3)
    } else if within(TALL) {
        Ok(AspectClass::Tall9x16)
    } else {
        Err(Error::AspectRatio { width, height })
    }
}

/// Select the ordered ladder for the given aspect class and codec, filtered
/// against the input dimensions.
///
/// A rung is dropped only when *both* of its dimensions would require more
/// than 20% upscaling of the input; a single in-tolerance axis keeps it. The
/// `"360p"` rung, when retained, is moved to the front so playback can start
/// on it first; all other rungs keep their table order.
pub fn select(aspect: AspectClass, codec: Codec, input_width: u32, input_height: u32) -> Vec<Rung> {
    let base: Vec<Rung> = match (aspect, codec) {
        (AspectClass::Wide16x9, Codec::H264) => H264_WIDE.to_vec(),
        (AspectClass::Square4x3, Codec::H264) => H264_SQUARE.to_vec(),
        (AspectClass::Wide16x9, Codec::H265) => H265_WIDE.to_vec(),
        (AspectClass::Square4x3, Codec::H265) => H265_SQUARE.to_vec(),
        (AspectClass::Tall9x16, Codec::H264) => {
            H264_WIDE.iter().map(|r| r.transposed()).collect()
        }
        (AspectClass::Tall9x16, Codec::H265) => {
            H265_WIDE.iter().map(|r| r.transposed()).collect()
        }
    };

    let (front, rest): (Vec<Rung>, Vec<Rung>) = base
        .into_iter()
        .filter(|r| fits(input_width, input_height, r))
        .partition(|r| r.name == "360p");

    front.into_iter().chain(rest).collect()
}

/// Keep a rung unless both target dimensions exceed the input by more than
/// 20%. Deliberately an OR across the axes, not an AND.
fn fits(input_width: u32, input_height: u32, rung: &Rung) -> bool {
    u64::from(input_width) * 120 >= u64::from(rung.width) * 100
        || u64::from(input_height) * 120 >= u64::from(rung.height) * 100
}

//! Master playlist rendering.

use std::fmt::Write;

use super::ladder::Rung;

/// Render the master HLS playlist for the given rungs, in the order supplied.
///
/// Pure and deterministic; the caller decides where the text is written.
pub fn render_master(rungs: &[Rung]) -> String {
    let mut out = String::new();

    writeln!(out, "#EXTM3U").unwrap();
    writeln!(out, "#EXT-X-PLAYLIST-TYPE:VOD").unwrap();

    for rung in rungs {
        writeln!(
            out,
            "#EXT-X-STREAM-INF:PROGRAM-ID=1,BANDWIDTH={},RESOLUTION={}x{}",
            rung.bandwidth(),
            rung.width,
            rung.height
        )
        .unwrap();
        writeln!(out, "{}", rung.stream_file()).unwrap();
    }

    writeln!(out, "#EXT-X-ENDLIST").unwrap();

    out
}

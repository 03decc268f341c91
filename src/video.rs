use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use tracing::{error, info};

use crate::reaction::ReactionLabel;

const VIDEO_WIDTH: u32 = 1080;
const VIDEO_HEIGHT: u32 = 1920;
const SUBTITLE_STYLE: &str = "Fontsize=28,OutlineColour=&H000000&,Outline=3,Shadow=0";

/// A character reaction clip shown while a commentary beat plays.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionOverlay {
    pub clip: PathBuf,
    pub start: f64,
    pub end: f64,
}

/// Looks up `<dir>/<label>.mp4`, the clip for each reaction label.
pub fn reaction_clip(dir: &Path, label: ReactionLabel) -> Option<PathBuf> {
    let path = dir.join(format!("{}.mp4", label));
    path.exists().then_some(path)
}

/// Filter graph: scaled background with burned-in subtitles, then each overlay in the
/// bottom-right corner at 35% of the frame width, enabled only during its beat.
/// Returns the graph and the label of its final video stream.
pub fn build_filter_graph(srt_path: &Path, overlays: &[ReactionOverlay]) -> (String, String) {
    let mut graph = format!(
        "[0:v]scale={VIDEO_WIDTH}:{VIDEO_HEIGHT},subtitles={}:force_style='{SUBTITLE_STYLE}'[v0]",
        srt_path.display()
    );
    let width = VIDEO_WIDTH * 35 / 100;
    for (i, overlay) in overlays.iter().enumerate() {
        let input = i + 2;
        graph.push_str(&format!(
            ";[{input}:v]scale={width}:-1,setpts=PTS-STARTPTS+{start:.3}/TB[r{i}]\
             ;[v{i}][r{i}]overlay=W-w-40:H-h-300:eof_action=pass:\
             enable='between(t,{start:.3},{end:.3})'[v{next}]",
            start = overlay.start,
            end = overlay.end,
            next = i + 1,
        ));
    }
    (graph, format!("[v{}]", overlays.len()))
}

/// ffmpeg arguments for the final mux. The background loops until the narration
/// ends, and `-shortest` then stops the video with the audio.
pub fn mux_args(
    background: &Path,
    audio: &Path,
    srt_path: &Path,
    overlays: &[ReactionOverlay],
    out: &Path,
) -> Vec<OsString> {
    let (graph, video_out) = build_filter_graph(srt_path, overlays);
    let mut args: Vec<OsString> = vec!["-y".into(), "-stream_loop".into(), "-1".into()];
    args.extend(["-i".into(), background.into(), "-i".into(), audio.into()]);
    for overlay in overlays {
        args.extend(["-i".into(), overlay.clip.clone().into_os_string()]);
    }
    for arg in [
        "-filter_complex",
        graph.as_str(),
        "-map",
        video_out.as_str(),
        "-map",
        "1:a:0",
        "-c:v",
        "libx264",
        "-c:a",
        "aac",
        "-r",
        "60",
        "-shortest",
    ] {
        args.push(arg.into());
    }
    args.push(out.into());
    args
}

pub fn compose_video(
    background: &Path,
    audio: &Path,
    srt_path: &Path,
    overlays: &[ReactionOverlay],
    out: &Path,
) -> anyhow::Result<()> {
    info!(
        "Merging audio, subtitles and {} reaction clips into {}",
        overlays.len(),
        out.display()
    );
    let status = Command::new("ffmpeg")
        .args(mux_args(background, audio, srt_path, overlays, out))
        .status()
        .context("Failed to run ffmpeg")?;
    if !status.success() {
        error!("ffmpeg failed to produce final video");
        anyhow::bail!("ffmpeg failed to produce final video");
    }
    Ok(())
}

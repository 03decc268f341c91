use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use hound::{SampleFormat, WavReader};
use tracing::{error, info, warn};

use crate::reaction::ReactionLabel;
use crate::timeline::{SpeakerRole, TimelineEntry};

/// One synthesized timeline entry with its measured timing.
#[derive(Debug, Clone)]
pub struct SpokenClip {
    pub wav: PathBuf,
    pub text: String,
    pub role: SpeakerRole,
    pub reaction: Option<ReactionLabel>,
    pub duration: f64,
    pub leading_silence: f64,
}

impl SpokenClip {
    pub fn measure(wav: PathBuf, entry: &TimelineEntry) -> anyhow::Result<Self> {
        let duration = wav_duration_seconds(&wav)?;
        let leading_silence = detect_leading_silence(&wav, 500, 2000).unwrap_or(0.0);
        Ok(Self {
            text: entry.text().to_string(),
            role: entry.role(),
            reaction: entry.reaction(),
            wav,
            duration,
            leading_silence,
        })
    }
}

pub fn wav_duration_seconds(path: &Path) -> anyhow::Result<f64> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let samples = reader.len();
    let frames = samples as f64 / spec.channels as f64;
    let duration = frames / spec.sample_rate as f64;
    Ok(duration)
}

/// Seconds before the first sample louder than `threshold`, once at least `min_samples` are quiet.
pub fn detect_leading_silence(
    path: &Path,
    threshold: i32,
    min_samples: usize,
) -> anyhow::Result<f64> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int {
        anyhow::bail!("leading silence detection needs integer samples");
    }
    let mut quiet = 0usize;
    for sample in reader.samples::<i32>() {
        if sample?.abs() > threshold {
            break;
        }
        quiet += 1;
    }
    if quiet < min_samples {
        return Ok(0.0);
    }
    let frames = quiet as f64 / spec.channels as f64;
    Ok(frames / spec.sample_rate as f64)
}

/// Joins WAV parts with ffmpeg, re-encoding when a stream copy fails.
pub fn concat_wavs(
    parts: &[PathBuf],
    tmp_dir: &Path,
    combined_name: &str,
) -> anyhow::Result<PathBuf> {
    let concat_list = tmp_dir.join("files.txt");
    {
        let mut f = File::create(&concat_list)?;
        for p in parts {
            let fname = p
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("Invalid filename"))?;
            writeln!(f, "file '{}'", fname)?;
        }
    }
    info!("Concatenating {} WAV parts into {}", parts.len(), combined_name);

    let status = Command::new("ffmpeg")
        .current_dir(tmp_dir)
        .args([
            "-y", "-f", "concat", "-safe", "0", "-i", "files.txt", "-c", "copy", combined_name,
        ])
        .status()
        .context("Failed to run ffmpeg")?;

    if !status.success() {
        warn!("ffmpeg concat with copy failed; retrying with re-encode");
        let status2 = Command::new("ffmpeg")
            .current_dir(tmp_dir)
            .args([
                "-y", "-f", "concat", "-safe", "0", "-i", "files.txt", "-c:a", "pcm_s16le",
                combined_name,
            ])
            .status()?;
        if !status2.success() {
            error!("ffmpeg failed to concatenate WAV files");
            anyhow::bail!("ffmpeg failed to concatenate WAV files");
        }
    }
    Ok(tmp_dir.join(combined_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn write_wav(path: &Path, silent: usize, loud: usize) {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for _ in 0..silent {
            writer.write_sample(0i16).unwrap();
        }
        for _ in 0..loud {
            writer.write_sample(8000i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn measures_duration_and_leading_silence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.wav");
        write_wav(&path, 4000, 12000);
        assert!((wav_duration_seconds(&path).unwrap() - 2.0).abs() < 1e-9);
        assert!((detect_leading_silence(&path, 500, 2000).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn short_lead_in_is_not_silence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.wav");
        write_wav(&path, 100, 8000);
        assert_eq!(detect_leading_silence(&path, 500, 2000).unwrap(), 0.0);
    }
}

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::audio::SpokenClip;
use crate::timeline::SpeakerRole;

const COMMA_PAUSE: f64 = 0.2;
const SENTENCE_END_PAUSE: f64 = 0.4;
const WORD_WEIGHT_ALPHA: f64 = 0.75;

static WORD_OR_PAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w[\w'-]*)|([,.!?])").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct SrtCue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// One cue per word, timed by spreading each clip's speaking time over its words.
/// Commentary words are bracketed so they read apart from the narration.
pub fn build_srt_entries(clips: &[SpokenClip]) -> Vec<SrtCue> {
    let mut cues = Vec::new();
    let mut cumulative_seconds = 0.0_f64;
    for clip in clips {
        let start_of_clip = cumulative_seconds + clip.leading_silence;
        let end_of_clip = cumulative_seconds + clip.duration;
        let label = |word: &str| match clip.role {
            SpeakerRole::Narrator => word.to_string(),
            SpeakerRole::Commentator => format!("[{word}]"),
        };

        let elements: Vec<&str> = WORD_OR_PAUSE.find_iter(&clip.text).map(|m| m.as_str()).collect();
        if elements.is_empty() {
            cues.push(SrtCue { start: start_of_clip, end: end_of_clip, text: label(&clip.text) });
            cumulative_seconds = end_of_clip;
            continue;
        }

        let mut total_pause_time = 0.0;
        let mut word_elements = Vec::new();
        for &element in &elements {
            match element {
                "," => total_pause_time += COMMA_PAUSE,
                "." | "!" | "?" => total_pause_time += SENTENCE_END_PAUSE,
                _ => word_elements.push(element),
            }
        }
        let word_time_available =
            (clip.duration - clip.leading_silence - total_pause_time).max(0.0);
        let total_weight: f64 = word_elements
            .iter()
            .map(|w| (w.chars().count() as f64).powf(WORD_WEIGHT_ALPHA))
            .sum();

        let mut current = start_of_clip;
        for element in elements {
            match element {
                "," => current += COMMA_PAUSE,
                "." | "!" | "?" => current += SENTENCE_END_PAUSE,
                word => {
                    let weight = (word.chars().count() as f64).powf(WORD_WEIGHT_ALPHA);
                    let word_duration = if total_weight > 0.0 {
                        word_time_available * weight / total_weight
                    } else {
                        0.0
                    };
                    cues.push(SrtCue {
                        start: current,
                        end: current + word_duration,
                        text: label(word),
                    });
                    current += word_duration;
                }
            }
        }
        cumulative_seconds = end_of_clip;
    }
    cues
}

/// Start and end of every clip on the combined audio track.
pub fn clip_spans(clips: &[SpokenClip]) -> Vec<(f64, f64)> {
    let mut start = 0.0;
    clips
        .iter()
        .map(|clip| {
            let span = (start, start + clip.duration);
            start += clip.duration;
            span
        })
        .collect()
}

pub fn write_srt(path: &Path, cues: &[SrtCue]) -> anyhow::Result<()> {
    let mut f = File::create(path)?;
    for (i, cue) in cues.iter().enumerate() {
        writeln!(f, "{}", i + 1)?;
        writeln!(f, "{} --> {}", format_srt_time(cue.start), format_srt_time(cue.end))?;
        for line in wrap_text(&cue.text, 80) {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)?;
    }
    Ok(())
}

fn format_srt_time(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_sec = total_ms / 1000;
    let s = total_sec % 60;
    let total_min = total_sec / 60;
    let m = total_min % 60;
    let h = total_min / 60;
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

fn wrap_text(s: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in s.split_whitespace() {
        if current.len() + word.len() + 1 > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn clip(text: &str, role: SpeakerRole, duration: f64) -> SpokenClip {
        SpokenClip {
            wav: PathBuf::from("unused.wav"),
            text: text.to_string(),
            role,
            reaction: None,
            duration,
            leading_silence: 0.0,
        }
    }

    #[test]
    fn formats_srt_timestamps() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(3723.4567), "01:02:03,457");
    }

    #[test]
    fn wraps_long_cue_text() {
        assert_eq!(wrap_text("aa bb cc", 5), ["aa bb", "cc"]);
    }

    #[test]
    fn words_fill_clip_minus_pauses() {
        let cues = build_srt_entries(&[clip("Hi there.", SpeakerRole::Narrator, 1.4)]);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "Hi");
        assert_eq!(cues[0].start, 0.0);
        assert!((cues[1].end - 1.0).abs() < 1e-9);
    }

    #[test]
    fn commentary_cues_follow_narration_and_are_bracketed() {
        let cues = build_srt_entries(&[
            clip("Story", SpeakerRole::Narrator, 2.0),
            clip("Wow", SpeakerRole::Commentator, 1.0),
        ]);
        assert_eq!(cues[1].text, "[Wow]");
        assert!((cues[1].start - 2.0).abs() < 1e-9);
        assert!((cues[1].end - 3.0).abs() < 1e-9);
    }

    #[test]
    fn spans_are_contiguous() {
        let spans = clip_spans(&[
            clip("a", SpeakerRole::Narrator, 1.5),
            clip("b", SpeakerRole::Commentator, 0.5),
        ]);
        assert_eq!(spans, [(0.0, 1.5), (1.5, 2.0)]);
    }
}

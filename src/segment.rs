use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::PlanError;
use crate::timeline::SpeakerRole;

/// One narration unit, read by the narrator voice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorySegment {
    index: usize,
    text: String,
    estimated_secs: f64,
    role: SpeakerRole,
}

impl StorySegment {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn estimated_secs(&self) -> f64 {
        self.estimated_secs
    }

    pub fn role(&self) -> SpeakerRole {
        self.role
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Characters that are actually read out: everything but whitespace.
pub fn spoken_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

pub fn estimate_secs(text: &str, words_per_minute: f64) -> f64 {
    text.split_whitespace().count() as f64 * 60.0 / words_per_minute
}

/// Splits story text into narration segments on sentence and paragraph boundaries.
#[derive(Debug, Clone)]
pub struct Segmenter {
    min_chars: usize,
    max_chars: usize,
    words_per_minute: f64,
    paragraph_break: Regex,
    sentence_end: Regex,
}

impl Segmenter {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            min_chars: config.min_segment_chars,
            max_chars: config.max_segment_chars,
            words_per_minute: config.words_per_minute,
            paragraph_break: Regex::new(r"\n\s*\n").unwrap(),
            sentence_end: Regex::new(r#"[.!?]+["'\u{201D}\u{2019})\]]*\s+"#).unwrap(),
        }
    }

    pub fn segment(&self, text: &str) -> Result<Vec<StorySegment>, PlanError> {
        if text.trim().is_empty() {
            return Err(PlanError::EmptyInput);
        }

        let mut pieces = Vec::new();
        for paragraph in self.paragraph_break.split(text) {
            self.pack_sentences(&self.sentences(paragraph), &mut pieces);
        }
        self.merge_short(&mut pieces);

        let segments: Vec<StorySegment> = pieces
            .into_iter()
            .enumerate()
            .map(|(index, text)| StorySegment {
                index,
                estimated_secs: estimate_secs(&text, self.words_per_minute),
                text,
                role: SpeakerRole::Narrator,
            })
            .collect();
        debug!(
            "Segmented {} spoken chars into {} segments",
            spoken_len(text),
            segments.len()
        );
        Ok(segments)
    }

    fn sentences(&self, paragraph: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for m in self.sentence_end.find_iter(paragraph) {
            push_normalized(&paragraph[start..m.end()], &mut sentences);
            start = m.end();
        }
        push_normalized(&paragraph[start..], &mut sentences);
        sentences
    }

    // Greedy fill; a paragraph never shares a segment with the next one at this stage.
    fn pack_sentences(&self, sentences: &[String], pieces: &mut Vec<String>) {
        let mut current = String::new();
        for sentence in sentences {
            if current.is_empty() {
                current.push_str(sentence);
            } else if spoken_len(&current) + spoken_len(sentence) <= self.max_chars {
                current.push(' ');
                current.push_str(sentence);
            } else {
                pieces.push(std::mem::take(&mut current));
                current.push_str(sentence);
            }
        }
        if !current.is_empty() {
            pieces.push(current);
        }
    }

    // Short pieces join the next piece, or the previous one when last.
    // A merge that would break the upper bound is tried the other way round, then skipped.
    fn merge_short(&self, pieces: &mut Vec<String>) {
        let fits = |a: &str, b: &str| spoken_len(a) + spoken_len(b) <= self.max_chars;
        let mut i = 0;
        while i < pieces.len() {
            if pieces.len() < 2 || spoken_len(&pieces[i]) >= self.min_chars {
                i += 1;
                continue;
            }
            let has_next = i + 1 < pieces.len();
            let forward = has_next && fits(&pieces[i], &pieces[i + 1]);
            let backward = i > 0 && fits(&pieces[i - 1], &pieces[i]);
            if forward {
                let short = pieces.remove(i);
                pieces[i] = format!("{short} {}", pieces[i]);
            } else if backward {
                let short = pieces.remove(i);
                pieces[i - 1].push(' ');
                pieces[i - 1].push_str(&short);
            } else {
                i += 1;
            }
        }
    }
}

fn push_normalized(raw: &str, out: &mut Vec<String>) {
    let sentence = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !sentence.is_empty() {
        out.push(sentence);
    }
}

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::reaction::{ReactionLabel, ReactionTable};

/// Tunables for turning a story into a timeline. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Segments with fewer spoken (non-whitespace) characters get merged into a neighbour.
    pub min_segment_chars: usize,
    /// Upper bound on spoken characters per segment, broken only by a single oversized sentence.
    pub max_segment_chars: usize,
    /// One commentary beat per this many narration segments.
    pub commentary_every: usize,
    pub noteworthy_keywords: Vec<String>,
    pub reactions: ReactionTable,
    pub default_reaction: ReactionLabel,
    /// Without an on-screen character, beats carry no reaction label.
    pub character_enabled: bool,
    pub words_per_minute: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_segment_chars: 80,
            max_segment_chars: 400,
            commentary_every: 2,
            noteworthy_keywords: DEFAULT_NOTEWORTHY.iter().map(|k| k.to_string()).collect(),
            reactions: ReactionTable::default(),
            default_reaction: ReactionLabel::Smug,
            character_enabled: true,
            words_per_minute: 150.0,
        }
    }
}

// Surprise, conflict and resolution cues.
const DEFAULT_NOTEWORTHY: &[&str] = &[
    "suddenly",
    "turns out",
    "found out",
    "realized",
    "shocked",
    "screamed",
    "yelled",
    "lied",
    "cheated",
    "fight",
    "argument",
    "furious",
    "confronted",
    "refused",
    "kicked out",
    "fired",
    "revenge",
    "police",
    "finally",
    "in the end",
    "apologized",
    "update",
];

impl PipelineConfig {
    /// Reads a JSON config file; missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&data)?;
        config.validate()?;
        info!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_segment_chars == 0 {
            return Err(ConfigError::ZeroMaxSegment);
        }
        if self.min_segment_chars > self.max_segment_chars {
            return Err(ConfigError::InvertedSegmentBounds {
                min: self.min_segment_chars,
                max: self.max_segment_chars,
            });
        }
        if self.commentary_every == 0 {
            return Err(ConfigError::ZeroDensity);
        }
        if !(self.words_per_minute > 0.0) {
            return Err(ConfigError::ZeroSpeechRate);
        }
        if self.noteworthy_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::BlankKeyword("noteworthy_keywords".into()));
        }
        for label in ReactionLabel::ALL {
            if self.reactions.keywords(label).iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::BlankKeyword(format!("reactions.{label}")));
            }
        }
        // The default reaction is reachable without cues; every other label needs at least one.
        if let Some(label) = self.reactions.uncovered().find(|l| *l != self.default_reaction) {
            return Err(ConfigError::UncoveredReaction(label));
        }
        Ok(())
    }
}

use thiserror::Error;

use crate::reaction::ReactionLabel;

/// Failures while turning one story into a timeline. Any of these abandons the story.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("story text is empty")]
    EmptyInput,

    #[error("insertion point {index} does not reference a segment (story has {segment_count})")]
    InvalidInsertionPoint { index: usize, segment_count: usize },

    #[error("more than one commentary beat at insertion point {index}")]
    DuplicateInsertionPoint { index: usize },

    #[error("commentary beat at insertion point {index} has no text")]
    BlankCommentary { index: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("max_segment_chars must be greater than zero")]
    ZeroMaxSegment,

    #[error("min_segment_chars ({min}) is larger than max_segment_chars ({max})")]
    InvertedSegmentBounds { min: usize, max: usize },

    #[error("commentary_every must be at least 1")]
    ZeroDensity,

    #[error("words_per_minute must be greater than zero")]
    ZeroSpeechRate,

    #[error("reaction '{0}' has no keywords and is not the default reaction")]
    UncoveredReaction(ReactionLabel),

    #[error("blank keyword in {0}")]
    BlankKeyword(String),
}

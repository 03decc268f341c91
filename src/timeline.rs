use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlanError;
use crate::reaction::ReactionLabel;
use crate::segment::{StorySegment, estimate_secs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerRole {
    Narrator,
    Commentator,
}

impl fmt::Display for SpeakerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeakerRole::Narrator => f.write_str("narrator"),
            SpeakerRole::Commentator => f.write_str("commentator"),
        }
    }
}

/// Story metadata carried through to the downstream stages untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryMeta {
    pub id: String,
    pub subreddit: String,
    pub title: String,
    pub author: String,
    pub upvotes: i64,
    pub num_comments: u64,
    pub url: String,
}

/// A short aside spoken by the commentator after the segment at `insertion_point`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentaryBeat {
    insertion_point: usize,
    text: String,
    role: SpeakerRole,
    reaction: Option<ReactionLabel>,
}

impl CommentaryBeat {
    pub fn new(
        insertion_point: usize,
        text: impl Into<String>,
        reaction: Option<ReactionLabel>,
    ) -> Result<Self, PlanError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(PlanError::BlankCommentary { index: insertion_point });
        }
        Ok(Self {
            insertion_point,
            text,
            role: SpeakerRole::Commentator,
            reaction,
        })
    }

    pub fn insertion_point(&self) -> usize {
        self.insertion_point
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn role(&self) -> SpeakerRole {
        self.role
    }

    pub fn reaction(&self) -> Option<ReactionLabel> {
        self.reaction
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEntry {
    Narration(StorySegment),
    Commentary(CommentaryBeat),
}

impl TimelineEntry {
    pub fn text(&self) -> &str {
        match self {
            TimelineEntry::Narration(segment) => segment.text(),
            TimelineEntry::Commentary(beat) => beat.text(),
        }
    }

    pub fn role(&self) -> SpeakerRole {
        match self {
            TimelineEntry::Narration(segment) => segment.role(),
            TimelineEntry::Commentary(beat) => beat.role(),
        }
    }

    pub fn reaction(&self) -> Option<ReactionLabel> {
        match self {
            TimelineEntry::Narration(_) => None,
            TimelineEntry::Commentary(beat) => beat.reaction(),
        }
    }
}

/// Narration and commentary in playback order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    story: StoryMeta,
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn story(&self) -> &StoryMeta {
        &self.story
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_role(&self, role: SpeakerRole) -> usize {
        self.entries.iter().filter(|e| e.role() == role).count()
    }

    pub fn total_words(&self) -> usize {
        self.entries.iter().map(|e| e.text().split_whitespace().count()).sum()
    }

    pub fn estimated_secs(&self, words_per_minute: f64) -> f64 {
        self.entries
            .iter()
            .map(|e| estimate_secs(e.text(), words_per_minute))
            .sum()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineAssembler;

impl TimelineAssembler {
    /// Splices each beat in directly after the segment it references.
    pub fn assemble(
        &self,
        story: StoryMeta,
        segments: Vec<StorySegment>,
        beats: Vec<CommentaryBeat>,
    ) -> Result<Timeline, PlanError> {
        let segment_count = segments.len();
        let mut by_point = BTreeMap::new();
        for beat in beats {
            let index = beat.insertion_point();
            if index >= segment_count {
                return Err(PlanError::InvalidInsertionPoint { index, segment_count });
            }
            if by_point.insert(index, beat).is_some() {
                return Err(PlanError::DuplicateInsertionPoint { index });
            }
        }

        let mut entries = Vec::with_capacity(segment_count + by_point.len());
        for segment in segments {
            let beat = by_point.remove(&segment.index());
            entries.push(TimelineEntry::Narration(segment));
            if let Some(beat) = beat {
                entries.push(TimelineEntry::Commentary(beat));
            }
        }
        debug!("Assembled timeline with {} entries", entries.len());
        Ok(Timeline { story, entries })
    }
}

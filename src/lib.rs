pub mod args;
pub mod audio;
pub mod commentary;
pub mod config;
pub mod error;
pub mod keywords;
pub mod metadata;
pub mod plan;
pub mod reaction;
pub mod reddit;
pub mod segment;
pub mod subtitle;
pub mod timeline;
pub mod tts;
pub mod utils;
pub mod video;

pub use config::PipelineConfig;
pub use error::{ConfigError, PlanError};
pub use plan::StoryPlanner;
pub use reaction::{ReactionClassifier, ReactionLabel, ReactionTable};
pub use segment::{Segmenter, StorySegment};
pub use timeline::{
    CommentaryBeat, SpeakerRole, StoryMeta, Timeline, TimelineAssembler, TimelineEntry,
};

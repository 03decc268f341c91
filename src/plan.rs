use tracing::{debug, info};

use crate::commentary::{CommentaryInjector, CommentaryWriter};
use crate::config::PipelineConfig;
use crate::error::PlanError;
use crate::reaction::ReactionClassifier;
use crate::segment::Segmenter;
use crate::timeline::{CommentaryBeat, SpeakerRole, StoryMeta, Timeline, TimelineAssembler};

/// Runs segmentation, commentary placement, reaction classification and assembly for one story.
#[derive(Debug, Clone)]
pub struct StoryPlanner {
    segmenter: Segmenter,
    injector: CommentaryInjector,
    classifier: ReactionClassifier,
    assembler: TimelineAssembler,
    character_enabled: bool,
    words_per_minute: f64,
}

impl StoryPlanner {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            segmenter: Segmenter::new(config),
            injector: CommentaryInjector::new(config),
            classifier: ReactionClassifier::new(&config.reactions, config.default_reaction),
            assembler: TimelineAssembler,
            character_enabled: config.character_enabled,
            words_per_minute: config.words_per_minute,
        }
    }

    pub fn plan(
        &self,
        story: StoryMeta,
        text: &str,
        writer: &mut dyn CommentaryWriter,
    ) -> Result<Timeline, PlanError> {
        let segments = self.segmenter.segment(text)?;
        let points = self.injector.insertion_points(&segments);
        debug!("Commentary after segments {:?}", points);

        let mut beats = Vec::with_capacity(points.len());
        for point in points {
            let text = writer.write(&segments[point]);
            let reaction = self
                .character_enabled
                .then(|| self.classifier.classify(&text));
            beats.push(CommentaryBeat::new(point, text, reaction)?);
        }

        let timeline = self.assembler.assemble(story, segments, beats)?;
        info!(
            "Planned story {}: {} narration, {} commentary, ~{:.1} min",
            timeline.story().id,
            timeline.count_role(SpeakerRole::Narrator),
            timeline.count_role(SpeakerRole::Commentator),
            timeline.estimated_secs(self.words_per_minute) / 60.0
        );
        Ok(timeline)
    }

    pub fn words_per_minute(&self) -> f64 {
        self.words_per_minute
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commentary::{CommentarySource, StockCommentary};
    use crate::reaction::ReactionLabel;
    use crate::segment::StorySegment;
    use crate::timeline::TimelineEntry;

    const STORY: &str = "AITA for skipping my sister's wedding?\n\n\
        My sister planned her wedding on my graduation day. I asked her to move it. \
        She refused and said I was being dramatic.\n\n\
        Suddenly my parents took her side. I was furious and we had a huge argument at dinner.\n\n\
        In the end I went to my graduation. She has not spoken to me since.";

    fn config() -> PipelineConfig {
        PipelineConfig {
            min_segment_chars: 30,
            max_segment_chars: 90,
            ..Default::default()
        }
    }

    struct Fixed(&'static str);

    impl CommentaryWriter for Fixed {
        fn write(&mut self, _segment: &StorySegment) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn plans_interleaved_timeline() {
        let planner = StoryPlanner::new(&config());
        let story = StoryMeta {
            id: "abc123".into(),
            subreddit: "AmItheAsshole".into(),
            ..Default::default()
        };
        let timeline = planner.plan(story, STORY, &mut StockCommentary::default()).unwrap();

        assert_eq!(timeline.story().subreddit, "AmItheAsshole");
        assert!(matches!(timeline.entries()[0], TimelineEntry::Narration(_)));
        assert!(timeline.count_role(SpeakerRole::Commentator) >= 1);

        let narration: Vec<usize> = timeline
            .entries()
            .iter()
            .filter_map(|e| match e {
                TimelineEntry::Narration(s) => Some(s.index()),
                TimelineEntry::Commentary(_) => None,
            })
            .collect();
        assert_eq!(narration, (0..narration.len()).collect::<Vec<_>>());

        for pair in timeline.entries().windows(2) {
            if let TimelineEntry::Commentary(beat) = &pair[1] {
                match &pair[0] {
                    TimelineEntry::Narration(s) => assert_eq!(s.index(), beat.insertion_point()),
                    TimelineEntry::Commentary(_) => panic!("two beats in a row"),
                }
                assert!(beat.reaction().is_some());
            }
        }
    }

    #[test]
    fn reactions_are_omitted_without_character() {
        let planner = StoryPlanner::new(&PipelineConfig {
            character_enabled: false,
            ..config()
        });
        let timeline = planner
            .plan(StoryMeta::default(), STORY, &mut StockCommentary::default())
            .unwrap();
        assert!(timeline.entries().iter().all(|e| e.reaction().is_none()));
    }

    #[test]
    fn beats_are_classified_from_their_text() {
        let planner = StoryPlanner::new(&config());
        let timeline = planner
            .plan(StoryMeta::default(), STORY, &mut Fixed("lol this is hilarious"))
            .unwrap();
        let reactions: Vec<_> = timeline.entries().iter().filter_map(|e| e.reaction()).collect();
        assert!(!reactions.is_empty());
        assert!(reactions.iter().all(|r| *r == ReactionLabel::Laughing));
    }

    #[test]
    fn blank_commentary_abandons_the_story() {
        let planner = StoryPlanner::new(&config());
        let err = planner
            .plan(StoryMeta::default(), STORY, &mut Fixed("  "))
            .unwrap_err();
        assert!(matches!(err, PlanError::BlankCommentary { .. }));
    }

    #[test]
    fn empty_story_is_rejected() {
        let planner = StoryPlanner::new(&config());
        assert_eq!(
            planner.plan(StoryMeta::default(), "\n\n", &mut StockCommentary::default()),
            Err(PlanError::EmptyInput)
        );
    }

    #[test]
    fn replanning_a_story_gives_the_same_timeline() {
        let planner = StoryPlanner::new(&config());
        let source = CommentarySource::Stock;
        let first = planner
            .plan(StoryMeta::default(), STORY, source.writer().as_mut())
            .unwrap();
        // Another story in between must not shift the commentary of the next one.
        planner
            .plan(StoryMeta::default(), STORY, source.writer().as_mut())
            .unwrap();
        let again = planner
            .plan(StoryMeta::default(), STORY, source.writer().as_mut())
            .unwrap();
        assert_eq!(first, again);
    }
}

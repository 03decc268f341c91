use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::PipelineConfig;
use crate::keywords::KeywordSet;
use crate::segment::StorySegment;

/// Decides after which segments a commentary beat goes.
#[derive(Debug, Clone)]
pub struct CommentaryInjector {
    every: usize,
    noteworthy: KeywordSet,
}

impl CommentaryInjector {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            every: config.commentary_every.max(1),
            noteworthy: KeywordSet::new(&config.noteworthy_keywords),
        }
    }

    pub fn target_beats(&self, segment_count: usize) -> usize {
        (segment_count / self.every).min(segment_count.saturating_sub(1))
    }

    /// Returns ascending, distinct segment indices; a beat plays after the segment it names.
    ///
    /// The `segments - 1` usable boundaries are cut into windows of `ceil(boundaries / target)`.
    /// Each window takes the boundary after its most noteworthy segment (earliest on ties), or
    /// its last boundary when nothing in it is noteworthy. The boundary after the final segment
    /// is never used.
    pub fn insertion_points(&self, segments: &[StorySegment]) -> Vec<usize> {
        let count = segments.len();
        let target = self.target_beats(count);
        if target == 0 {
            return Vec::new();
        }
        let last_boundary = count - 1;
        let step = last_boundary.div_ceil(target);

        let mut points = Vec::with_capacity(target);
        for k in 0..target {
            let start = k * step;
            let end = ((k + 1) * step).min(last_boundary);
            if start >= end {
                break;
            }
            let mut best = (end - 1, 0);
            for (i, segment) in segments.iter().enumerate().take(end).skip(start) {
                let score = self.noteworthy.count(segment.text());
                if score > best.1 {
                    best = (i, score);
                }
            }
            debug!(
                "Commentary window {}..{} -> after segment {} (score {})",
                start, end, best.0, best.1
            );
            points.push(best.0);
        }
        points
    }
}

/// Supplies the text of a commentary beat placed after `segment`.
pub trait CommentaryWriter {
    fn write(&mut self, segment: &StorySegment) -> String;
}

const STOCK_LINES: &[&[&str]] = &[
    // shocked
    &[
        "Wait, what? I can't believe that just happened.",
        "Hold up. No way they actually did that.",
    ],
    // sarcastic
    &[
        "Oh sure, because that always works out. Typical.",
        "Whatever you say. Obviously a flawless plan.",
    ],
    // sympathetic
    &[
        "Oof, that hurts. Poor thing.",
        "Honestly, that's heartbreaking.",
    ],
    // judgmental
    &[
        "That was a bad idea from the start.",
        "Karma is coming. I called it.",
    ],
    // supportive
    &[
        "Good call, honestly. Respect.",
        "Yes! Finally someone stands up for themselves.",
    ],
];

/// Canned remarks rotating through shocked, sarcastic, sympathetic, judgmental and supportive.
#[derive(Debug, Default)]
pub struct StockCommentary {
    written: usize,
}

impl CommentaryWriter for StockCommentary {
    fn write(&mut self, _segment: &StorySegment) -> String {
        let style = STOCK_LINES[self.written % STOCK_LINES.len()];
        let line = style[(self.written / STOCK_LINES.len()) % style.len()];
        self.written += 1;
        line.to_string()
    }
}

/// Cycles through remarks read from a text file, one per line.
#[derive(Debug, Clone)]
pub struct LinesCommentary {
    lines: Vec<String>,
    next: usize,
}

impl LinesCommentary {
    pub fn new(lines: Vec<String>) -> anyhow::Result<Self> {
        let lines: Vec<String> = lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();
        if lines.is_empty() {
            anyhow::bail!("commentary source has no usable lines");
        }
        Ok(Self { lines, next: 0 })
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::new(data.lines().map(String::from).collect())
    }
}

impl CommentaryWriter for LinesCommentary {
    fn write(&mut self, _segment: &StorySegment) -> String {
        let line = self.lines[self.next % self.lines.len()].clone();
        self.next += 1;
        line
    }
}

/// Where commentary comes from. Each story gets a fresh writer, so no rotation state
/// carries over from one story to the next.
#[derive(Debug, Clone)]
pub enum CommentarySource {
    Stock,
    Lines(LinesCommentary),
}

impl CommentarySource {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Ok(CommentarySource::Lines(LinesCommentary::load(path)?)),
            None => Ok(CommentarySource::Stock),
        }
    }

    pub fn writer(&self) -> Box<dyn CommentaryWriter> {
        match self {
            CommentarySource::Stock => Box::new(StockCommentary::default()),
            CommentarySource::Lines(lines) => {
                let mut lines = lines.clone();
                lines.next = 0;
                Box::new(lines)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segmenter;
    use std::collections::HashSet;

    fn injector(every: usize, noteworthy: &[&str]) -> CommentaryInjector {
        CommentaryInjector::new(&PipelineConfig {
            commentary_every: every,
            noteworthy_keywords: noteworthy.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        })
    }

    // One segment per sentence.
    fn segments(sentences: &[&str]) -> Vec<StorySegment> {
        let config = PipelineConfig {
            min_segment_chars: 0,
            max_segment_chars: 1,
            ..Default::default()
        };
        let segments = Segmenter::new(&config).segment(&sentences.join(" ")).unwrap();
        assert_eq!(segments.len(), sentences.len());
        segments
    }

    fn plain(count: usize) -> Vec<StorySegment> {
        let sentences: Vec<String> = (0..count).map(|i| format!("Plain sentence {i}.")).collect();
        let refs: Vec<&str> = sentences.iter().map(String::as_str).collect();
        segments(&refs)
    }

    #[test]
    fn evenly_spaced_without_noteworthy_segments() {
        assert_eq!(injector(2, &["boom"]).insertion_points(&plain(8)), [1, 3, 5, 6]);
        assert_eq!(injector(3, &["boom"]).insertion_points(&plain(9)), [2, 5, 7]);
    }

    #[test]
    fn prefers_noteworthy_segment_within_window() {
        let segs = segments(&[
            "It started normal.",
            "Suddenly he screamed.",
            "Then a pause.",
            "More pause.",
            "She confronted him.",
            "The end.",
        ]);
        let points = injector(3, &["suddenly", "screamed", "confronted"]).insertion_points(&segs);
        assert_eq!(points, [1, 4]);
    }

    #[test]
    fn ties_take_the_earliest_boundary() {
        let segs = segments(&["A fight.", "Another fight.", "Calm.", "Calm again."]);
        assert_eq!(injector(4, &["fight"]).insertion_points(&segs), [0]);
    }

    #[test]
    fn never_more_than_target_or_boundaries() {
        for count in 1..20 {
            for every in 1..5 {
                let inj = injector(every, &["plain"]);
                let segs = plain(count);
                let points = inj.insertion_points(&segs);
                let unique: HashSet<_> = points.iter().collect();
                assert_eq!(unique.len(), points.len());
                assert!(points.len() <= (count / every).min(count.saturating_sub(1)));
                assert!(points.iter().all(|&p| p + 1 < count));
                assert!(points.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn beats_spread_over_every_usable_boundary() {
        assert_eq!(injector(2, &["boom"]).insertion_points(&plain(5)), [1, 3]);
        assert_eq!(
            injector(1, &["boom"]).insertion_points(&plain(10)),
            (0..9).collect::<Vec<_>>()
        );
        assert_eq!(injector(2, &["boom"]).insertion_points(&plain(10)).len(), 5);
    }

    #[test]
    fn single_segment_gets_no_commentary() {
        assert!(injector(1, &[]).insertion_points(&plain(1)).is_empty());
    }

    #[test]
    fn stock_commentary_rotates_styles() {
        let segs = plain(1);
        let mut writer = StockCommentary::default();
        let lines: Vec<String> = (0..6).map(|_| writer.write(&segs[0])).collect();
        assert_eq!(lines[0], STOCK_LINES[0][0]);
        assert_eq!(lines[1], STOCK_LINES[1][0]);
        assert_eq!(lines[5], STOCK_LINES[0][1]);
    }

    #[test]
    fn lines_commentary_cycles_and_skips_comments() {
        let segs = plain(1);
        let mut writer = LinesCommentary::new(vec![
            "# header".into(),
            "first".into(),
            "".into(),
            "second".into(),
        ])
        .unwrap();
        let lines: Vec<String> = (0..3).map(|_| writer.write(&segs[0])).collect();
        assert_eq!(lines, ["first", "second", "first"]);
        assert!(LinesCommentary::new(vec!["  ".into()]).is_err());
    }

    #[test]
    fn each_writer_from_a_source_starts_over() {
        let segs = plain(1);
        let lines = LinesCommentary::new(vec!["first".into(), "second".into()]).unwrap();
        for source in [CommentarySource::Stock, CommentarySource::Lines(lines)] {
            let mut used = source.writer();
            used.write(&segs[0]);
            let mut a = source.writer();
            let mut b = source.writer();
            assert_eq!(a.write(&segs[0]), b.write(&segs[0]));
            assert_eq!(a.write(&segs[0]), b.write(&segs[0]));
        }
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::keywords::KeywordSet;

/// Character reaction played during a commentary beat.
///
/// Declaration order doubles as tie-break priority: earlier wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionLabel {
    Shocked,
    Laughing,
    Facepalm,
    Nodding,
    Confused,
    Excited,
    Nervous,
    Angry,
    Sad,
    Smug,
    Thinking,
    EyeRoll,
    Cringe,
    SippingTea,
}

impl ReactionLabel {
    pub const ALL: [ReactionLabel; 14] = [
        ReactionLabel::Shocked,
        ReactionLabel::Laughing,
        ReactionLabel::Facepalm,
        ReactionLabel::Nodding,
        ReactionLabel::Confused,
        ReactionLabel::Excited,
        ReactionLabel::Nervous,
        ReactionLabel::Angry,
        ReactionLabel::Sad,
        ReactionLabel::Smug,
        ReactionLabel::Thinking,
        ReactionLabel::EyeRoll,
        ReactionLabel::Cringe,
        ReactionLabel::SippingTea,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReactionLabel::Shocked => "shocked",
            ReactionLabel::Laughing => "laughing",
            ReactionLabel::Facepalm => "facepalm",
            ReactionLabel::Nodding => "nodding",
            ReactionLabel::Confused => "confused",
            ReactionLabel::Excited => "excited",
            ReactionLabel::Nervous => "nervous",
            ReactionLabel::Angry => "angry",
            ReactionLabel::Sad => "sad",
            ReactionLabel::Smug => "smug",
            ReactionLabel::Thinking => "thinking",
            ReactionLabel::EyeRoll => "eye_roll",
            ReactionLabel::Cringe => "cringe",
            ReactionLabel::SippingTea => "sipping_tea",
        }
    }

    fn default_keywords(self) -> &'static [&'static str] {
        match self {
            ReactionLabel::Shocked => &[
                "what", "wait", "hold up", "excuse me", "no way", "seriously", "wow",
                "shock", "shocked", "shocking", "can't believe", "unbelievable", "oh my god",
            ],
            ReactionLabel::Laughing => &[
                "lmao", "lol", "haha", "hilarious", "funny", "dead", "crying", "i'm dying",
            ],
            ReactionLabel::Facepalm => &[
                "stupid", "dumb", "idiot", "mistake", "bad idea", "why would you",
            ],
            ReactionLabel::Nodding => &[
                "fair", "makes sense", "exactly", "agreed", "respect", "good call", "valid",
            ],
            ReactionLabel::Confused => &[
                "huh", "confused", "makes no sense", "i don't get", "how does that",
            ],
            ReactionLabel::Excited => &[
                "yes", "amazing", "perfect", "love", "brilliant", "let's go", "finally",
            ],
            ReactionLabel::Nervous => &[
                "uh oh", "oh no", "this is bad", "worried", "nervous", "scary",
            ],
            ReactionLabel::Angry => &[
                "angry", "furious", "mad", "rage", "how dare", "unacceptable",
            ],
            ReactionLabel::Sad => &["sad", "heartbreaking", "poor", "tragic", "oof", "that hurts"],
            ReactionLabel::Smug => &[
                "deserve", "deserved", "karma", "told you", "called it", "revenge", "justice",
            ],
            ReactionLabel::Thinking => &[
                "hmm", "interesting", "i wonder", "plot twist", "let me think",
            ],
            ReactionLabel::EyeRoll => &[
                "whatever", "obviously", "typical", "here we go", "sure, jan",
            ],
            ReactionLabel::Cringe => &[
                "cringe", "awkward", "uncomfortable", "yikes", "secondhand embarrassment",
            ],
            ReactionLabel::SippingTea => &["tea", "drama", "spill", "juicy", "popcorn", "messy"],
        }
    }
}

impl fmt::Display for ReactionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReactionLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| format!("unknown reaction label '{s}'"))
    }
}

/// Keyword cues per reaction label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionTable(BTreeMap<ReactionLabel, Vec<String>>);

impl ReactionTable {
    pub fn new(entries: BTreeMap<ReactionLabel, Vec<String>>) -> Self {
        Self(entries)
    }

    pub fn keywords(&self, label: ReactionLabel) -> &[String] {
        self.0.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Labels with no usable keyword.
    pub fn uncovered(&self) -> impl Iterator<Item = ReactionLabel> + '_ {
        ReactionLabel::ALL
            .into_iter()
            .filter(|label| self.keywords(*label).iter().all(|k| k.trim().is_empty()))
    }
}

impl Default for ReactionTable {
    fn default() -> Self {
        let entries = ReactionLabel::ALL
            .into_iter()
            .map(|label| {
                let keywords = label.default_keywords().iter().map(|k| k.to_string()).collect();
                (label, keywords)
            })
            .collect();
        Self(entries)
    }
}

/// Picks one reaction for a commentary line by counting keyword hits per label.
#[derive(Debug, Clone)]
pub struct ReactionClassifier {
    cues: Vec<(ReactionLabel, KeywordSet)>,
    fallback: ReactionLabel,
}

impl ReactionClassifier {
    pub fn new(table: &ReactionTable, fallback: ReactionLabel) -> Self {
        let cues = ReactionLabel::ALL
            .into_iter()
            .map(|label| (label, KeywordSet::new(table.keywords(label))))
            .collect();
        Self { cues, fallback }
    }

    pub fn classify(&self, text: &str) -> ReactionLabel {
        let mut best: Option<(ReactionLabel, usize)> = None;
        for (label, set) in &self.cues {
            let score = set.count(text);
            // Strictly greater keeps the earlier label on ties.
            if score > 0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((*label, score));
            }
        }
        best.map(|(label, _)| label).unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(ReactionLabel, &[&str])]) -> ReactionTable {
        ReactionTable::new(
            entries
                .iter()
                .map(|(label, kws)| (*label, kws.iter().map(|k| k.to_string()).collect()))
                .collect(),
        )
    }

    #[test]
    fn shocked_commentary_is_classified_shocked() {
        let classifier = ReactionClassifier::new(&ReactionTable::default(), ReactionLabel::Smug);
        assert_eq!(
            classifier.classify("I can't believe he just did that, what a shock"),
            ReactionLabel::Shocked
        );
    }

    #[test]
    fn no_keyword_falls_back_to_default() {
        let classifier = ReactionClassifier::new(&ReactionTable::default(), ReactionLabel::Smug);
        assert_eq!(classifier.classify("The bus left at noon."), ReactionLabel::Smug);
    }

    #[test]
    fn highest_score_wins() {
        let t = table(&[(ReactionLabel::Shocked, &["wow"]), (ReactionLabel::Laughing, &["lol"])]);
        let classifier = ReactionClassifier::new(&t, ReactionLabel::Smug);
        assert_eq!(classifier.classify("wow lol lol"), ReactionLabel::Laughing);
    }

    #[test]
    fn ties_go_to_earlier_label() {
        let t = table(&[(ReactionLabel::SippingTea, &["drama"]), (ReactionLabel::Angry, &["mad"])]);
        let classifier = ReactionClassifier::new(&t, ReactionLabel::Smug);
        assert_eq!(classifier.classify("mad drama"), ReactionLabel::Angry);
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = ReactionClassifier::new(&ReactionTable::default(), ReactionLabel::Smug);
        let text = "Oh no, this is messy. Yikes.";
        let first = classifier.classify(text);
        for _ in 0..10 {
            assert_eq!(classifier.classify(text), first);
        }
    }

    #[test]
    fn labels_round_trip_through_names() {
        for label in ReactionLabel::ALL {
            assert_eq!(label.as_str().parse::<ReactionLabel>(), Ok(label));
            assert_eq!(serde_json::to_string(&label).unwrap(), format!("\"{label}\""));
        }
        assert!("grumpy".parse::<ReactionLabel>().is_err());
    }

    #[test]
    fn default_table_covers_every_label() {
        assert_eq!(ReactionTable::default().uncovered().count(), 0);
    }

    #[test]
    fn table_deserializes_from_label_keyed_json() {
        let t: ReactionTable =
            serde_json::from_str(r#"{"eye_roll": ["ugh"], "sipping_tea": ["drama"]}"#).unwrap();
        assert_eq!(t.keywords(ReactionLabel::EyeRoll), ["ugh".to_string()]);
        assert!(t.keywords(ReactionLabel::Shocked).is_empty());
        assert_eq!(t.uncovered().count(), 12);
    }
}

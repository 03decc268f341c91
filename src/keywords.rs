use regex::Regex;

/// A compiled set of keywords and phrases, matched case-insensitively on word boundaries.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    patterns: Vec<Regex>,
}

impl KeywordSet {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let patterns = keywords
            .iter()
            .map(|k| normalize_apostrophes(k.as_ref().trim()))
            .filter(|k| !k.is_empty())
            .map(|k| {
                // Word boundaries only where the phrase starts/ends with a word character,
                // so cues like "?!" or "wait..." still match.
                let escaped = regex::escape(&k.to_lowercase());
                let start = if k.starts_with(|c: char| c.is_alphanumeric()) {
                    r"\b"
                } else {
                    ""
                };
                let end = if k.ends_with(|c: char| c.is_alphanumeric()) {
                    r"\b"
                } else {
                    ""
                };
                Regex::new(&format!("(?i){start}{escaped}{end}"))
                    .expect("escaped keyword is a valid regex")
            })
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Total number of keyword occurrences in `text`.
    pub fn count(&self, text: &str) -> usize {
        let text = normalize_apostrophes(text);
        self.patterns.iter().map(|p| p.find_iter(&text).count()).sum()
    }
}

fn normalize_apostrophes(text: &str) -> String {
    text.replace(['\u{2019}', '\u{2018}'], "'")
}

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Serialize;
use tracing::info;

use crate::timeline::StoryMeta;

// Entertainment.
const CATEGORY_ID: &str = "24";
const MAX_TAGS: usize = 30;
const RULE: &str = "==================================================";

const TITLE_PREFIXES: &[&str] = &[
    "AITA for ",
    "AITA ",
    "WIBTA for ",
    "WIBTA ",
    "TIFU by ",
    "TIFU ",
    "UPDATE: ",
    "Update: ",
    "[UPDATE] ",
];

const BASE_TAGS: &[&str] = &[
    "reddit",
    "reddit stories",
    "reddit story",
    "best reddit stories",
    "top reddit posts",
];

const STORY_TAGS: &[&str] = &["storytime", "story time", "true stories", "real stories"];

const SUBREDDIT_TAGS: &[(&str, &[&str])] = &[
    ("tifu", &["tifu", "today i f'd up", "tifu reddit", "funny reddit stories"]),
    (
        "AmItheAsshole",
        &["aita", "am i the asshole", "aita reddit", "relationship advice"],
    ),
    (
        "MaliciousCompliance",
        &["malicious compliance", "revenge stories", "workplace stories"],
    ),
    ("ProRevenge", &["pro revenge", "revenge", "justice served", "petty revenge"]),
    ("pettyrevenge", &["petty revenge", "revenge stories", "satisfying revenge"]),
    (
        "relationship_advice",
        &["relationship advice", "dating advice", "relationship stories"],
    ),
    ("entitledparents", &["entitled parents", "karen stories", "entitled people"]),
    ("confessions", &["confessions", "true confessions", "reddit confessions"]),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TitleStyle {
    /// `r/sub | Title`
    #[default]
    Dramatic,
    /// `r/sub: Title?`
    Question,
    /// `[r/sub] Title`
    Bracket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribution {
    pub reddit_url: String,
    pub subreddit: String,
    pub original_author: String,
    pub original_title: String,
}

/// Upload metadata for one finished story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub attribution: Attribution,
}

impl VideoMetadata {
    pub fn for_story(story: &StoryMeta, channel_name: &str, style: TitleStyle) -> Self {
        Self {
            title: video_title(&story.title, &story.subreddit, style),
            description: video_description(story, channel_name),
            tags: video_tags(&story.subreddit),
            category_id: CATEGORY_ID.to_string(),
            attribution: Attribution {
                reddit_url: story.url.clone(),
                subreddit: story.subreddit.clone(),
                original_author: story.author.clone(),
                original_title: story.title.clone(),
            },
        }
    }

    /// Writes `metadata_<id>.json` into `out_dir`.
    pub fn save(&self, out_dir: &Path, id: &str) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(out_dir)?;
        let path = out_dir.join(format!("metadata_{}.json", id));
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!("Metadata written to {}", path.display());
        Ok(path)
    }
}

pub fn video_title(original: &str, subreddit: &str, style: TitleStyle) -> String {
    let title = original.trim();
    let title = TITLE_PREFIXES
        .iter()
        .find_map(|p| title.strip_prefix(*p))
        .unwrap_or(title);

    let mut chars = title.chars();
    let title = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    match style {
        TitleStyle::Dramatic => format!("r/{} | {}", subreddit, title),
        TitleStyle::Question => format!("r/{}: {}?", subreddit, title),
        TitleStyle::Bracket => format!("[r/{}] {}", subreddit, title),
    }
}

/// Tags in a fixed order, deduplicated case-insensitively and capped at 30.
pub fn video_tags(subreddit: &str) -> Vec<String> {
    let mut tags: Vec<String> = BASE_TAGS.iter().map(|t| t.to_string()).collect();
    tags.insert(2, format!("r/{}", subreddit));
    tags.insert(3, format!("r {}", subreddit));
    tags.insert(4, subreddit.to_string());

    if let Some((_, extra)) = SUBREDDIT_TAGS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(subreddit))
    {
        tags.extend(extra.iter().map(|t| t.to_string()));
    }
    tags.extend(STORY_TAGS.iter().map(|t| t.to_string()));

    let mut seen = HashSet::new();
    tags.retain(|t| seen.insert(t.to_lowercase()));
    tags.truncate(MAX_TAGS);
    tags
}

pub fn video_description(story: &StoryMeta, channel_name: &str) -> String {
    let sub = &story.subreddit;
    let author = if story.author.is_empty() {
        "[deleted]"
    } else {
        story.author.as_str()
    };

    let mut lines = vec![
        RULE.to_string(),
        "ORIGINAL REDDIT POST".to_string(),
        RULE.to_string(),
        String::new(),
        format!("Read the original story: {}", story.url),
        format!("Subreddit: r/{}", sub),
        format!("Original Author: u/{}", author),
        format!("Original Title: {}", story.title),
        String::new(),
        "Please visit the original post to upvote and support the author!".to_string(),
        String::new(),
        RULE.to_string(),
        "DISCOVER MORE ON REDDIT".to_string(),
        RULE.to_string(),
        String::new(),
        format!("Join r/{} for more stories:", sub),
        format!("https://reddit.com/r/{}", sub),
        String::new(),
        RULE.to_string(),
        format!("ABOUT {}", channel_name.to_uppercase()),
        RULE.to_string(),
        String::new(),
        "We share the best stories from Reddit with full attribution.".to_string(),
        String::new(),
    ];
    lines.push(format!("#Reddit #r{} #RedditStories #Stories", sub));
    lines.join("\n")
}

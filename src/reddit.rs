use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use reqwest::header::USER_AGENT;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::timeline::StoryMeta;
use crate::utils::sanitize_post;

#[derive(Debug, Deserialize)]
pub struct RedditListing {
    pub data: RedditListingData,
}

#[derive(Debug, Deserialize)]
pub struct RedditListingData {
    pub children: Vec<RedditChild>,
}

#[derive(Debug, Deserialize)]
pub struct RedditChild {
    pub data: RedditPost,
}

#[derive(Debug, Deserialize)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub is_self: Option<bool>,
    pub over_18: Option<bool>,
    #[serde(default)]
    pub subreddit: String,
    pub author: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub permalink: String,
}

/// A story ready for planning: metadata plus the text to narrate.
#[derive(Debug, Clone)]
pub struct RedditStory {
    pub meta: StoryMeta,
    pub text: String,
}

impl RedditStory {
    fn engagement(&self) -> i64 {
        self.meta.upvotes + 10 * self.meta.num_comments as i64
    }
}

/// Which posts are worth narrating.
#[derive(Debug, Clone)]
pub struct StoryFilter {
    pub min_chars: usize,
    pub max_chars: usize,
    pub max_words: usize,
    pub min_upvotes: i64,
    pub min_comments: u64,
    pub forbidden: Vec<String>,
}

impl Default for StoryFilter {
    fn default() -> Self {
        Self {
            min_chars: 500,
            max_chars: 8000,
            max_words: 1500,
            min_upvotes: 500,
            min_comments: 50,
            forbidden: Vec::new(),
        }
    }
}

/// Ids of stories already turned into videos, kept as a JSON list.
#[derive(Debug)]
pub struct StoryArchive {
    path: PathBuf,
    ids: HashSet<String>,
}

impl StoryArchive {
    pub fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let ids = load_used_ids(&path)?;
        Ok(Self { path, ids })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn mark_used(&mut self, id: &str) -> anyhow::Result<()> {
        self.ids.insert(id.to_string());
        save_used_ids(&self.path, &self.ids)
    }
}

pub async fn fetch_listing(subreddit: &str, limit: usize) -> anyhow::Result<RedditListing> {
    let url = format!("https://www.reddit.com/r/{}/hot.json?limit={}", subreddit, limit);
    let client = reqwest::Client::new();
    let res = client
        .get(&url)
        .header(USER_AGENT, "reddit-reactions-bot-rust/0.1")
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let parsed: RedditListing = serde_json::from_str(&res)?;
    info!("Fetched {} posts from r/{}", parsed.data.children.len(), subreddit);
    Ok(parsed)
}

/// Fetches every subreddit in turn. A subreddit that fails is logged and left out.
pub async fn fetch_listings(subreddits: &[String], limit: usize) -> Vec<RedditListing> {
    let mut listings = Vec::with_capacity(subreddits.len());
    for subreddit in subreddits {
        match fetch_listing(subreddit, limit).await {
            Ok(listing) => listings.push(listing),
            Err(e) => warn!("Error fetching from r/{}: {:#}", subreddit, e),
        }
    }
    listings
}

/// Unused, safe, popular text posts within the length bounds, most engaging first.
/// A post listed by more than one subreddit is kept once.
pub fn select_stories(
    listings: Vec<RedditListing>,
    archive: &StoryArchive,
    filter: &StoryFilter,
) -> Vec<RedditStory> {
    let mut seen = HashSet::new();
    let mut stories = Vec::new();
    for child in listings.into_iter().flat_map(|l| l.data.children) {
        let post = child.data;
        let is_self = post.is_self.unwrap_or(true);
        let nsfw = post.over_18.unwrap_or(false);

        if nsfw || !is_self || archive.contains(&post.id) || !seen.insert(post.id.clone()) {
            debug!("Skipping post (NSFW, link, repeated or already used): {}", post.title);
            continue;
        }
        if post.score < filter.min_upvotes || post.num_comments < filter.min_comments {
            debug!(
                "Skipping post with {} upvotes and {} comments: {}",
                post.score, post.num_comments, post.title
            );
            continue;
        }
        let body = post.selftext.trim();
        if matches!(body, "" | "[removed]" | "[deleted]") {
            debug!("Skipping post without body: {}", post.title);
            continue;
        }
        let body_len = body.chars().count();
        if body_len < filter.min_chars || body_len > filter.max_chars {
            debug!("Skipping post with {} chars: {}", body_len, post.title);
            continue;
        }

        let text = format!("{}\n\n{}", post.title.trim(), body);
        let Some(clean) = sanitize_post(&text, &filter.forbidden, filter.max_words) else {
            continue;
        };
        stories.push(RedditStory {
            meta: StoryMeta {
                url: format!("https://reddit.com{}", post.permalink),
                id: post.id,
                subreddit: post.subreddit,
                title: post.title.trim().to_string(),
                author: post.author.unwrap_or_else(|| "[deleted]".to_string()),
                upvotes: post.score,
                num_comments: post.num_comments,
            },
            text: clean,
        });
    }
    stories.sort_by_key(|s| std::cmp::Reverse(s.engagement()));
    stories
}

fn load_used_ids(path: &Path) -> anyhow::Result<HashSet<String>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    let data = fs::read_to_string(path)?;
    let ids: Vec<String> = serde_json::from_str(&data)?;
    Ok(ids.into_iter().collect())
}

fn save_used_ids(path: &Path, ids: &HashSet<String>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut sorted: Vec<&String> = ids.iter().collect();
    sorted.sort();
    let data = serde_json::to_string_pretty(&sorted)?;
    fs::write(path, data)?;
    Ok(())
}

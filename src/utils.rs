use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::keywords::KeywordSet;

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static TRAILING_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\n*\s*\b(edit|update)\b\s*\d*\s*:.*$").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// Per-story working directory, removed when dropped whether the story finished or failed.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Starts from an empty directory, clearing what an earlier run left behind.
    pub fn create(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        if path.exists() {
            info!("Removing existing tmp dir '{}'", path.display());
            fs::remove_dir_all(&path)?;
        }
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            warn!("Failed to remove tmp dir '{}': {}", self.path.display(), e);
        }
    }
}

/// Strips reddit markup from a post so it reads well aloud.
pub fn clean_text(text: &str) -> String {
    let text = MARKDOWN_LINK.replace_all(text, "$1");
    let text = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("\r\n", "\n");
    let text = TRAILING_NOTE.replace(&text, "");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    let text = SPACES.replace_all(&text, " ");
    text.trim().to_string()
}

/// One word or phrase per line; `#` starts a comment. A missing file means no filter.
pub fn load_forbidden_words(path: impl AsRef<Path>) -> Vec<String> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(data) => data
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(String::from)
            .collect(),
        Err(e) => {
            warn!("No forbidden words loaded from {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Cleans a post, rejecting it when it mentions a forbidden word or runs past `max_words`.
pub fn sanitize_post(text: &str, forbidden: &[String], max_words: usize) -> Option<String> {
    let clean = clean_text(text);
    if clean.is_empty() {
        return None;
    }
    let hits = KeywordSet::new(forbidden).count(&clean);
    if hits > 0 {
        debug!("Rejecting post with {} forbidden word(s)", hits);
        return None;
    }
    let words = clean.split_whitespace().count();
    if words > max_words {
        debug!("Rejecting post with {} words (max {})", words, max_words);
        return None;
    }
    Some(clean)
}

use std::path::PathBuf;

use clap::Parser;

use crate::metadata::TitleStyle;

const DEFAULT_SUBREDDITS: [&str; 10] = [
    "tifu",
    "AmItheAsshole",
    "MaliciousCompliance",
    "ProRevenge",
    "pettyrevenge",
    "entitledparents",
    "JUSTNOMIL",
    "relationship_advice",
    "confessions",
    "TrueOffMyChest",
];

/// Turn reddit stories into narrated videos with a reacting commentator.
#[derive(Parser, Debug)]
pub struct Args {
    /// Subreddits to pull stories from, comma separated
    #[clap(
        long = "subreddit",
        value_delimiter = ',',
        default_values_t = DEFAULT_SUBREDDITS.map(String::from)
    )]
    pub subreddits: Vec<String>,

    #[clap(long, default_value = "./res/bg.mp4")]
    pub background: PathBuf,

    /// Output directory for finished videos and timelines
    #[clap(long, default_value = "./output")]
    pub out: PathBuf,

    #[clap(long, default_value = "./tts/en_US-hfc_male-medium.onnx")]
    pub narrator_model: String,

    #[clap(long, default_value = "./tts/en_US-amy-medium.onnx")]
    pub commentator_model: String,

    #[clap(long, default_value_t = 100)]
    pub try_posts: usize,

    /// How many stories to process, one after another
    #[clap(long, default_value_t = 1)]
    pub stories: usize,

    /// JSON pipeline config; defaults are used when omitted
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Text file of commentary remarks, one per line
    #[clap(long)]
    pub commentary: Option<PathBuf>,

    /// Directory holding `<reaction>.mp4` character clips
    #[clap(long)]
    pub reactions_dir: Option<PathBuf>,

    #[clap(long, default_value = "./config/forbidden_words.txt")]
    pub forbidden_words: PathBuf,

    #[clap(long, default_value = "./config/used_posts.json")]
    pub archive: PathBuf,

    #[clap(long, default_value = "rs_tmp")]
    pub tmp_dir: PathBuf,

    /// Channel name used in the upload description
    #[clap(long, default_value = "Reddit Stories")]
    pub channel_name: String,

    #[clap(long, value_enum, default_value_t = TitleStyle::Dramatic)]
    pub title_style: TitleStyle,

    /// Stop after writing the timeline and metadata JSON
    #[clap(long)]
    pub plan_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults_and_flags() {
        let args = Args::parse_from(["redditreactions", "--stories", "3", "--plan-only"]);
        assert_eq!(args.subreddits.len(), 10);
        assert_eq!(args.subreddits[0], "tifu");
        assert_eq!(args.stories, 3);
        assert!(args.plan_only);
        assert!(args.config.is_none());
        assert_eq!(args.title_style, TitleStyle::Dramatic);
    }

    #[test]
    fn subreddits_split_on_commas() {
        let args = Args::parse_from(["redditreactions", "--subreddit", "tifu,ProRevenge"]);
        assert_eq!(args.subreddits, ["tifu", "ProRevenge"]);
    }

    #[test]
    fn title_style_by_name() {
        let args = Args::parse_from(["redditreactions", "--title-style", "question"]);
        assert_eq!(args.title_style, TitleStyle::Question);
    }
}

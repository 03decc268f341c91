use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use redditreactions::args::Args;
use redditreactions::audio::{SpokenClip, concat_wavs};
use redditreactions::commentary::{CommentarySource, CommentaryWriter};
use redditreactions::metadata::VideoMetadata;
use redditreactions::reddit::{
    RedditStory, StoryArchive, StoryFilter, fetch_listings, select_stories,
};
use redditreactions::subtitle::{build_srt_entries, clip_spans, write_srt};
use redditreactions::tts::{VoiceModels, tts_generate_chunk};
use redditreactions::utils::{ScratchDir, load_forbidden_words};
use redditreactions::video::{ReactionOverlay, compose_video, reaction_clip};
use redditreactions::{PipelineConfig, StoryPlanner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting reddit reaction video pipeline");

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => {
            let config = PipelineConfig::default();
            config.validate()?;
            config
        }
    };
    debug!("Pipeline config: {:?}", config);

    if !args.plan_only && !args.background.exists() {
        error!("Background video not found: {}", args.background.display());
        std::process::exit(1);
    }

    let planner = StoryPlanner::new(&config);
    let commentary = CommentarySource::load(args.commentary.as_deref())?;

    let mut archive = StoryArchive::load(&args.archive)?;
    let filter = StoryFilter {
        forbidden: load_forbidden_words(&args.forbidden_words),
        ..Default::default()
    };

    info!(
        "Fetching reddit stories from {} subreddits (up to {} posts each)",
        args.subreddits.len(),
        args.try_posts
    );
    let listings = fetch_listings(&args.subreddits, args.try_posts).await;
    let stories = select_stories(listings, &archive, &filter);
    if stories.is_empty() {
        anyhow::bail!("No suitable posts found in r/{}", args.subreddits.join(", r/"));
    }
    info!("{} candidate stories, processing up to {}", stories.len(), args.stories);

    fs::create_dir_all(&args.out)?;
    let batch = args.stories > 1;
    let mut produced = 0;
    let mut attempted = 0;
    for story in stories.into_iter().take(args.stories) {
        attempted += 1;
        let id = story.meta.id.clone();
        let mut writer = commentary.writer();
        match process_story(&args, &planner, writer.as_mut(), story).await {
            Ok(Some(video)) => {
                archive.mark_used(&id)?;
                info!("Final video written to {}", video.display());
                produced += 1;
            }
            Ok(None) => produced += 1,
            Err(e) if batch => error!("Skipping story {}: {:#}", id, e),
            Err(e) => return Err(e),
        }
    }

    info!("Process complete: {} of {} stories done.", produced, attempted);
    Ok(())
}

/// Plans one story and, unless only planning, renders it. Returns the video path.
async fn process_story(
    args: &Args,
    planner: &StoryPlanner,
    writer: &mut dyn CommentaryWriter,
    story: RedditStory,
) -> anyhow::Result<Option<PathBuf>> {
    let id = story.meta.id.clone();
    info!("Using story {} (short preview): {:.200}", id, story.text.replace('\n', " "));

    let timeline = planner.plan(story.meta, &story.text, writer)?;
    let timeline_path = args.out.join(format!("timeline_{}.json", id));
    fs::write(&timeline_path, serde_json::to_string_pretty(&timeline)?)?;
    info!("Timeline written to {}", timeline_path.display());
    VideoMetadata::for_story(timeline.story(), &args.channel_name, args.title_style)
        .save(&args.out, &id)?;

    if args.plan_only {
        return Ok(None);
    }

    let scratch = ScratchDir::create(args.tmp_dir.join(&id))?;
    let tmp_dir = scratch.path();

    let voices = VoiceModels {
        narrator: args.narrator_model.clone(),
        commentator: args.commentator_model.clone(),
    };
    let total = timeline.len();
    let mut clips = Vec::with_capacity(total);
    for (i, entry) in timeline.entries().iter().enumerate() {
        let wav = tmp_dir.join(format!("part_{:03}_{}.wav", i, entry.role()));
        info!(
            "Generating TTS part {}/{} ({}, {} chars)",
            i + 1,
            total,
            entry.role(),
            entry.text().len()
        );
        tts_generate_chunk(voices.for_role(entry.role()), entry.text(), &wav)?;
        clips.push(SpokenClip::measure(wav, entry)?);
        sleep(Duration::from_millis(150)).await;
    }

    let srt_path = tmp_dir.join("subs.srt");
    write_srt(&srt_path, &build_srt_entries(&clips))?;

    let parts: Vec<PathBuf> = clips.iter().map(|c| c.wav.clone()).collect();
    let combined = concat_wavs(&parts, tmp_dir, "combined.wav")?;

    let mut overlays = Vec::new();
    if let Some(dir) = &args.reactions_dir {
        for (clip, (start, end)) in clips.iter().zip(clip_spans(&clips)) {
            let Some(label) = clip.reaction else { continue };
            match reaction_clip(dir, label) {
                Some(path) => overlays.push(ReactionOverlay { clip: path, start, end }),
                None => warn!("No reaction clip for '{}' in {}", label, dir.display()),
            }
        }
    }

    let video = args.out.join(format!("reddit_story_{}.mp4", id));
    compose_video(&args.background, &combined, &srt_path, &overlays, &video)?;
    Ok(Some(video))
}

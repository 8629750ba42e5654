//! CLI for inspecting viseme timelines.
//!
//! Prints the timed segments produced for a given text and audio duration,
//! optionally simulating playback against an in-memory rig.

use clap::Parser;
use lipsync::{create_viseme_timeline, EngineState, LipSyncConfig, MorphMap, PlaybackEngine};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Dump the viseme timeline for an utterance.
#[derive(Parser)]
#[command(name = "timeline-dump", version, about)]
struct Cli {
    /// Utterance text.
    text: String,

    /// Audio duration in seconds.
    #[arg(short, long, default_value_t = 2.0)]
    duration: f32,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulate playback and report how many frames each state lasted.
    #[arg(long)]
    play: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lipsync=info")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("timeline-dump failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> lipsync::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => LipSyncConfig::from_file(path)?,
        None => LipSyncConfig::default(),
    };

    let timeline = create_viseme_timeline(&cli.text, cli.duration, &config)?;
    println!("{} segments over {:.3}s:", timeline.segments().len(), timeline.duration_s());
    for segment in timeline.segments() {
        println!(
            "  {:6.3} .. {:6.3}  {:<3?} (as {:?})",
            segment.start_s, segment.end_s, segment.viseme, segment.reduced
        );
    }

    if cli.play {
        simulate(timeline, &config);
    }
    Ok(())
}

/// Drive the playback engine at 60 fps against an in-memory rig.
fn simulate(timeline: lipsync::VisemeTimeline, config: &LipSyncConfig) {
    const DT: f32 = 1.0 / 60.0;

    let mut engine = PlaybackEngine::new(config);
    let mut rig = MorphMap::with_standard_shapes();
    engine.speak(timeline);

    let mut frames_speaking = 0u32;
    let mut frames_transition = 0u32;
    loop {
        engine.update(DT, &mut rig);
        match engine.state() {
            EngineState::Speaking => frames_speaking += 1,
            EngineState::TransitioningToRest => frames_transition += 1,
            EngineState::Resting | EngineState::Idle => break,
        }
    }
    println!("speaking for {frames_speaking} frames, transition {frames_transition} frames");
}

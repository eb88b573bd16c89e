//! Timeline CLI
//!
//! Loads match timeline / summary JSON and prints engine query results as
//! JSON on stdout. Logs go to stderr (`RUST_LOG`, default `warn`).

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tl_core::{
    context_bundle_schema, EventBucket, HeatmapFilter, PlaybackState, TeamKey, YearCategory,
    YearRecapView,
};
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "tl_cli")]
#[command(about = "Query match timelines: events, team stats, heatmaps, playback", long_about = None)]
struct Cli {
    /// Engine config file (JSON or YAML); falls back to TL_ENGINE_CONFIG_PATH
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct MatchArgs {
    /// Match timeline JSON
    #[arg(long)]
    timeline: PathBuf,

    /// Match summary JSON
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Context bundle around a frame
    Context {
        #[command(flatten)]
        input: MatchArgs,

        /// Focus frame index (clamped to the last frame)
        #[arg(long, default_value = "0")]
        focus: usize,

        /// Participant to expand with a full timeline
        #[arg(long)]
        selected: Option<u32>,

        /// Participant reported as the main player
        #[arg(long)]
        main: Option<u32>,
    },

    /// Events in an inclusive frame range
    Events {
        #[command(flatten)]
        input: MatchArgs,

        #[arg(long, default_value = "0")]
        start: usize,

        /// Defaults to the last frame
        #[arg(long)]
        end: Option<usize>,

        /// Bucket filter, repeatable (kills, dragons, towers, ...)
        #[arg(long = "bucket")]
        buckets: Vec<EventBucket>,
    },

    /// Full-match team stats
    Team {
        #[command(flatten)]
        input: MatchArgs,

        /// blue or red; both when omitted
        #[arg(long)]
        team: Option<TeamKey>,
    },

    /// Kill heatmap density
    Heatmap {
        #[command(flatten)]
        input: MatchArgs,

        /// Inclusive minute cutoff
        #[arg(long)]
        cutoff: Option<u32>,

        #[arg(long)]
        cell_size: Option<f64>,
    },

    /// Year recap from a manifest of matches
    Year {
        /// Manifest JSON listing the player's matches
        #[arg(long)]
        manifest: PathBuf,

        /// Print density for one category instead of the recap data
        #[arg(long)]
        category: Option<YearCategory>,

        #[arg(long)]
        cutoff: Option<u32>,

        #[arg(long)]
        champion: Option<String>,

        #[arg(long)]
        role: Option<String>,

        #[arg(long)]
        match_count: Option<usize>,

        #[arg(long)]
        start_minute: Option<u32>,

        #[arg(long)]
        end_minute: Option<u32>,
    },

    /// Run match playback and print each state as a JSON line
    Play {
        #[command(flatten)]
        input: MatchArgs,

        /// Multiplier on the base tick interval
        #[arg(long, default_value = "1.0")]
        speed: f32,
    },

    /// JSON schema of the context bundle
    Schema,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = tl_cli::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Context { input, focus, selected, main } => {
            let mut timeline = open(&input, config)?;
            if let Some(id) = main {
                timeline = timeline.with_main_participant(id);
            }
            print_json(&timeline.get_chat_context(focus, selected))?;
        }

        Commands::Events { input, start, end, buckets } => {
            let timeline = open(&input, config)?;
            let end = end.or(timeline.store().max_frame_index()).unwrap_or(0);
            let filter = (!buckets.is_empty()).then_some(buckets.as_slice());
            print_json(&timeline.get_events_in_range(start, end, filter))?;
        }

        Commands::Team { input, team } => {
            let timeline = open(&input, config)?;
            match team {
                Some(team) => print_json(timeline.get_team_stats(team))?,
                None => print_json(timeline.team_stats())?,
            }
        }

        Commands::Heatmap { input, cutoff, cell_size } => {
            let timeline = open(&input, config)?;
            let grid = timeline.get_density_grid(timeline.kill_points(), cutoff, cell_size);
            print_json(&*grid)?;
        }

        Commands::Year {
            manifest,
            category,
            cutoff,
            champion,
            role,
            match_count,
            start_minute,
            end_minute,
        } => {
            let data = tl_cli::build_year_recap(&manifest)?;
            let filter = HeatmapFilter {
                champion,
                role,
                match_count,
                game_time_start: start_minute,
                game_time_end: end_minute,
            };
            match category {
                None => print_json(&data)?,
                Some(category) => {
                    let view = YearRecapView::new(data, config).with_filter(&filter);
                    print_json(&*view.density(category, cutoff))?;
                }
            }
        }

        Commands::Play { input, speed } => {
            let timeline = open(&input, config)?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .context("Failed to start runtime")?;
            runtime.block_on(play(timeline.playback_driver(), speed))?;
        }

        Commands::Schema => print_json(&context_bundle_schema())?,
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn open(input: &MatchArgs, config: tl_core::EngineConfig) -> Result<tl_core::MatchTimeline> {
    tl_cli::open_match(&input.timeline, input.summary.as_deref(), config)
}

#[cfg(feature = "cli")]
async fn play(mut driver: tl_core::PlaybackDriver, speed: f32) -> Result<()> {
    driver.set_speed(speed);
    let mut states = driver.subscribe();
    println!("{}", serde_json::to_string(&driver.play())?);

    loop {
        states.changed().await.context("Playback channel closed")?;
        let state = *states.borrow_and_update();
        println!("{}", serde_json::to_string(&state)?);
        if state == PlaybackState::Stopped {
            break;
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("tl_cli is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}

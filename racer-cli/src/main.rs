use std::{fs, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use racer_cli::{
    drive_session, format_ms, load_replay, load_track, summarize_track, track_id_for, TraceRow,
};
use racer_core::constants::MAX_REPLAY_TICKS_DEFAULT;
use racer_core::{
    reset_player_records, toggle_cheat_mode, trace_fingerprint, trace_replay, verify_replay,
    Ledger, RaceSession, SessionOptions, Track, TrackDraft,
};
use racer_store::config::read_env_u32;
use racer_store::{DiskRecords, StoreConfig};

#[derive(Parser, Debug)]
#[command(name = "racer")]
#[command(about = "Headless host for the tile racer: tracks, replays and best times")]
struct Cli {
    /// Records directory (ledger and replays). Defaults to $RACER_DATA_DIR or ./data
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Track directory. Defaults to $RACER_MAPS_DIR or ./assets/maps
    #[arg(long, global = true)]
    maps_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a track file and print its layout
    CheckTrack {
        #[arg(long)]
        track: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Check that a replay is a complete, compatible run of a track
    VerifyReplay {
        #[arg(long)]
        track: PathBuf,
        #[arg(long)]
        replay: PathBuf,
        /// Defaults to $RACER_MAX_REPLAY_TICKS or 36000 (ten minutes)
        #[arg(long)]
        max_ticks: Option<u32>,
    },
    /// Dump sampled car state for a replay as JSON
    Trace {
        #[arg(long)]
        track: PathBuf,
        #[arg(long)]
        replay: PathBuf,
        #[arg(long, default_value_t = 1)]
        every: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Drive a full session from a replay's inputs and persist the result
    Drive {
        /// Track file; otherwise `--track-id` is looked up in the maps dir
        #[arg(long)]
        track: Option<PathBuf>,
        #[arg(long)]
        track_id: Option<String>,
        #[arg(long)]
        replay: PathBuf,
        /// Run as the author's test drive: saves the track and creator time
        #[arg(long, default_value_t = false)]
        editor_test: bool,
    },
    /// List stored best and creator times
    Records {
        #[arg(long)]
        track_id: Option<String>,
    },
    /// Forget one track's best time, creator flag and last replay
    ResetBest {
        #[arg(long)]
        track_id: String,
    },
    /// Clear every best time, creator flag and last replay
    ResetRecords,
    /// Mark every track's creator time as beaten, or clear them all if they already are
    Cheat,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let Cli {
        data_dir,
        maps_dir,
        command,
    } = Cli::parse();

    let mut config = StoreConfig::from_env();
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = maps_dir {
        config.maps_dir = dir;
    }

    match command {
        Commands::CheckTrack { track, json } => {
            let summary = summarize_track(&load_track(&track)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("track={}", track.display());
                println!("size={}x{}", summary.width, summary.height);
                println!("start={},{}", summary.start.0, summary.start.1);
                println!("finish={},{}", summary.finish.0, summary.finish.1);
                println!("start_angle={}", summary.start_angle);
                println!("checkpoints={}", summary.checkpoints);
                println!("mud_tiles={}", summary.mud_tiles);
                println!("wall_tiles={}", summary.wall_tiles);
            }
        }
        Commands::VerifyReplay {
            track,
            replay,
            max_ticks,
        } => {
            let max_ticks = max_ticks.unwrap_or_else(|| {
                read_env_u32("RACER_MAX_REPLAY_TICKS", MAX_REPLAY_TICKS_DEFAULT)
            });
            let track = load_track(&track)?;
            let recorded = load_replay(&replay)?;
            let options = SessionOptions::default();
            let run = verify_replay(&track, &options.physics, options.car, &recorded, max_ticks)
                .with_context(|| format!("replay rejected: {}", replay.display()))?;
            println!("replay={}", replay.display());
            println!("ticks={}", run.ticks);
            println!("time={}", format_ms(Some(run.elapsed_ms)));
            println!("collisions={}", run.collisions);
            println!("final_x={:.3}", run.car.x);
            println!("final_y={:.3}", run.car.y);
        }
        Commands::Trace {
            track,
            replay,
            every,
            output,
        } => {
            let track = load_track(&track)?;
            let recorded = load_replay(&replay)?;
            let options = SessionOptions::default();
            let samples = trace_replay(
                &track,
                &options.physics,
                options.car,
                &recorded.inputs,
                every,
            );
            let fingerprint = trace_fingerprint(&samples);
            let rows: Vec<TraceRow> = samples.iter().map(TraceRow::from).collect();
            let encoded = serde_json::to_vec_pretty(&rows).context("failed to encode trace")?;
            if let Some(path) = output {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, encoded)
                    .with_context(|| format!("failed writing trace: {}", path.display()))?;
                println!("wrote={}", path.display());
                println!("samples={}", rows.len());
            } else {
                println!("{}", String::from_utf8_lossy(&encoded));
            }
            println!("fingerprint={fingerprint:#018x}");
        }
        Commands::Drive {
            track,
            track_id,
            replay,
            editor_test,
        } => {
            let store = DiskRecords::open(&config).map_err(|e| anyhow!(e))?;
            let (track, track_id) = resolve_track(&store, track, track_id)?;
            let recorded = load_replay(&replay)?;
            let options = SessionOptions::default();

            let mut session = if editor_test {
                RaceSession::editor_test(store, &TrackDraft::from_track(&track), track_id, options)
                    .map_err(|e| anyhow!("{e}"))?
            } else {
                RaceSession::race(store, track, track_id, options)
            };
            let summary = drive_session(&mut session, &recorded.inputs);

            println!("track_id={}", session.track_id());
            println!("frames={}", summary.frames);
            println!("ticks={}", summary.ticks);
            println!("collisions={}", summary.collisions);
            match summary.outcome {
                Some(outcome) => {
                    println!("finished=true");
                    println!("time={}", format_ms(Some(outcome.elapsed_ms)));
                    println!("new_best={}", outcome.new_best);
                    println!("creator_beaten={}", outcome.creator_beaten);
                    println!("persisted={}", outcome.persisted);
                    println!("unused_inputs={}", summary.unused_inputs);
                }
                None => println!("finished=false"),
            }
            println!("best={}", format_ms(summary.records.best_time_ms));
            println!("creator={}", format_ms(summary.records.creator_time_ms));
        }
        Commands::Records { track_id } => {
            let store = DiskRecords::open(&config).map_err(|e| anyhow!(e))?;
            let rows = store.ledger().rows().map_err(|e| anyhow!(e))?;
            let mut shown = 0usize;
            for row in rows
                .iter()
                .filter(|row| track_id.as_deref().map_or(true, |id| row.track_id == id))
            {
                println!(
                    "{:20} best={:>10} creator={:>10} beaten={}",
                    row.track_id,
                    format_ms(row.best_time_ms),
                    format_ms(row.creator_time_ms),
                    row.creator_beaten
                );
                shown += 1;
            }
            if shown == 0 {
                println!("no records");
            }
        }
        Commands::ResetBest { track_id } => {
            let store = DiskRecords::open(&config).map_err(|e| anyhow!(e))?;
            let (track, track_id) = resolve_track(&store, None, Some(track_id))?;
            let before = store.best_time(&track_id)?;
            let mut session = RaceSession::race(store, track, track_id, SessionOptions::default());
            let persisted = session.reset_best_time();
            println!("track_id={}", session.track_id());
            println!("previous_best={}", format_ms(before));
            println!("persisted={persisted}");
        }
        Commands::ResetRecords => {
            let mut store = DiskRecords::open(&config).map_err(|e| anyhow!(e))?;
            let removed = reset_player_records(&mut store)?;
            println!("cleared best times and creator flags");
            println!("removed_replays={removed}");
        }
        Commands::Cheat => {
            let mut store = DiskRecords::open(&config).map_err(|e| anyhow!(e))?;
            let track_ids = store.artifacts().track_ids().map_err(|e| anyhow!(e))?;
            let enabled = toggle_cheat_mode(&mut store, &track_ids)?;
            println!("tracks={}", track_ids.len());
            println!("creator_beaten={enabled}");
        }
    }

    Ok(())
}

fn resolve_track(
    store: &DiskRecords,
    path: Option<PathBuf>,
    track_id: Option<String>,
) -> Result<(Track, String)> {
    match (path, track_id) {
        (Some(path), track_id) => {
            let track = load_track(&path)?;
            let track_id = match track_id {
                Some(id) => id,
                None => track_id_for(&path)?,
            };
            Ok((track, track_id))
        }
        (None, Some(track_id)) => {
            let track = store.artifacts().load_track(&track_id).map_err(|e| {
                let known = store.artifacts().track_ids().unwrap_or_default().join(", ");
                anyhow!("{e} (known tracks: {known})")
            })?;
            Ok((track, track_id))
        }
        (None, None) => Err(anyhow!("either --track or --track-id is required")),
    }
}

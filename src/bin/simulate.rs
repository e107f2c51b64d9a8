use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use maze_chase::config::{GameConfig, TickSpeed};
use maze_chase::driver::SessionDriver;
use maze_chase::error::{GameError, LevelError, LibraryError};
use maze_chase::level::parse;
use maze_chase::library::{LevelLibrary, LevelSource};
use maze_chase::logging;
use maze_chase::rng::{make_source, RandomSource};
use maze_chase::session::GameSession;
use maze_chase::tile::{MovementOutcome, TileKind};
use maze_chase::types::{Direction, GameEvent, Outcome, SessionSummary};
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{error, info};

const DEFAULT_RUN_TICKS: u64 = 1_000;
const DEFAULT_PLAY_SECONDS: u64 = 30;
/// Autopilot turns once every this many simulation ticks.
const AUTOPILOT_TICKS_PER_TURN: u32 = 4;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless maze-chase simulator")]
struct Cli {
    /// Debug logging on stderr unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the levels in the levels directory.
    Levels {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Parse and validate a level file.
    Check { file: PathBuf },
    /// Step a level as fast as possible and print every event as JSON.
    Run {
        level: String,
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_RUN_TICKS)]
        ticks: u64,
        #[arg(long)]
        seed: Option<u32>,
        #[arg(long, value_parser = parse_direction)]
        direction: Option<Direction>,
        /// Turn randomly whenever the player is blocked.
        #[arg(long)]
        autopilot: bool,
    },
    /// Play a level on real timers with an autopilot at the controls.
    Play {
        level: String,
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Seconds per tick, 0.1 to 1.0.
        #[arg(long)]
        speed: Option<f64>,
        #[arg(long)]
        seed: Option<u32>,
        #[arg(long, default_value_t = DEFAULT_PLAY_SECONDS)]
        max_seconds: u64,
    },
}

#[derive(Clone, Debug, Serialize)]
struct LevelListLine {
    dir: String,
    levels: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct LevelReport {
    rows: usize,
    cols: usize,
    ghosts: usize,
    points: usize,
    #[serde(rename = "hasKey")]
    has_key: bool,
    #[serde(rename = "hasGate")]
    has_gate: bool,
}

#[derive(Clone, Debug, Serialize)]
struct SummaryLine {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    summary: SessionSummary,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run_command(cli.command) {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            error!(error = %format!("{err:#}"), "command failed");
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run_command(command: Command) -> anyhow::Result<u8> {
    let config = GameConfig::from_env().context("reading environment")?;
    let mut stdout = io::stdout().lock();

    match command {
        Command::Levels { dir } => {
            let library = LevelLibrary::new(dir.unwrap_or(config.levels_dir));
            let levels = library.list()?;
            emit(
                &mut stdout,
                &LevelListLine {
                    dir: library.dir().to_string_lossy().to_string(),
                    levels,
                },
            )?;
            Ok(0)
        }
        Command::Check { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let report = inspect(&text).with_context(|| format!("checking {}", file.display()))?;
            emit(&mut stdout, &report)?;
            Ok(0)
        }
        Command::Run {
            level,
            dir,
            ticks,
            seed,
            direction,
            autopilot,
        } => {
            let dir = dir.unwrap_or(config.levels_dir);
            let (name, text) = read_level(&level, &dir)?;
            let summary = fast_forward(
                &name,
                &text,
                ticks,
                seed.or(config.seed),
                direction,
                autopilot,
                &mut stdout,
            )?;
            Ok(exit_status(summary.outcome))
        }
        Command::Play {
            level,
            dir,
            speed,
            seed,
            max_seconds,
        } => {
            let dir = dir.unwrap_or(config.levels_dir);
            let (name, text) = read_level(&level, &dir)?;
            let speed = match speed {
                Some(secs) => TickSpeed::new(secs)?,
                None => config.speed,
            };
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("building runtime")?;
            let summary = runtime.block_on(play(
                &name,
                &text,
                speed,
                seed.or(config.seed),
                Duration::from_secs(max_seconds),
                &mut stdout,
            ))?;
            Ok(exit_status(summary.outcome))
        }
    }
}

/// A path to an existing file wins; anything else is a name in the levels directory.
fn read_level(level: &str, dir: &Path) -> Result<(String, String), GameError> {
    let path = Path::new(level);
    if path.is_file() {
        let text = fs::read_to_string(path).map_err(|source| LibraryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(level)
            .to_string();
        return Ok((name, text));
    }

    let text = LevelLibrary::new(dir).load_level(level)?;
    let name = level.trim_end_matches(".txt").to_string();
    Ok((name, text))
}

fn inspect(text: &str) -> Result<LevelReport, LevelError> {
    let level = parse(text)?;
    level.player_start()?;
    Ok(LevelReport {
        rows: level.grid.rows(),
        cols: level.grid.cols(),
        ghosts: level.ghost_spawns().len(),
        points: level.grid.count(TileKind::Point),
        has_key: level.grid.count(TileKind::Key) > 0,
        has_gate: level.grid.count(TileKind::Gate) > 0,
    })
}

fn fast_forward(
    name: &str,
    text: &str,
    ticks: u64,
    seed: Option<u32>,
    direction: Option<Direction>,
    autopilot: bool,
    out: &mut impl Write,
) -> anyhow::Result<SessionSummary> {
    let mut session = GameSession::new(make_source(seed));
    session.load(name, text)?;
    if let Some(direction) = direction {
        session.set_direction(direction);
    }
    let mut pilot = make_source(seed.map(|seed| seed.wrapping_add(1)));
    info!(level = name, ticks, ?seed, autopilot, "fast-forward started");

    emit_events(&mut session, out)?;
    for _ in 0..ticks {
        let Some(report) = session.tick() else {
            break;
        };
        if autopilot && report.player == MovementOutcome::Blocked {
            session.set_direction(random_direction(pilot.as_mut()));
        }
        emit_events(&mut session, out)?;
        if report.outcome.is_some() {
            break;
        }
    }

    let summary = session.summary();
    emit(
        out,
        &SummaryLine {
            kind: "summary",
            summary: summary.clone(),
        },
    )?;
    Ok(summary)
}

async fn play(
    name: &str,
    text: &str,
    speed: TickSpeed,
    seed: Option<u32>,
    budget: Duration,
    out: &mut impl Write,
) -> anyhow::Result<SessionSummary> {
    let mut session = GameSession::new(make_source(seed));
    session.load(name, text)?;
    let session = Arc::new(Mutex::new(session));

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (input_tx, mut input_rx) = mpsc::channel(8);
    let mut driver = SessionDriver::new(session.clone(), speed, event_tx);
    let pilot = spawn_autopilot(
        make_source(seed.map(|seed| seed.wrapping_add(1))),
        speed.interval() * AUTOPILOT_TICKS_PER_TURN,
        input_tx,
    );

    info!(level = name, secs = speed.secs(), "play started");
    driver.start().await;
    let deadline = time::sleep(budget);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                info!(level = name, "time budget elapsed");
                break;
            }
            Some(direction) = input_rx.recv() => {
                driver.set_direction(direction).await;
            }
            event = event_rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                emit(out, &event)?;
                if matches!(event, GameEvent::Outcome { .. }) {
                    break;
                }
            }
        }
    }

    pilot.abort();
    driver.stop().await;
    while let Ok(event) = event_rx.try_recv() {
        emit(out, &event)?;
    }

    let summary = session.lock().await.summary();
    emit(
        out,
        &SummaryLine {
            kind: "summary",
            summary: summary.clone(),
        },
    )?;
    Ok(summary)
}

fn spawn_autopilot(
    mut rng: Box<dyn RandomSource>,
    period: Duration,
    tx: mpsc::Sender<Direction>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval_at(time::Instant::now() + period, period);
        loop {
            interval.tick().await;
            if tx.send(random_direction(rng.as_mut())).await.is_err() {
                break;
            }
        }
    })
}

fn random_direction(rng: &mut dyn RandomSource) -> Direction {
    Direction::ALL[rng.pick_index(Direction::ALL.len())]
}

fn emit(out: &mut impl Write, value: &impl Serialize) -> anyhow::Result<()> {
    writeln!(out, "{}", serde_json::to_string(value)?)?;
    Ok(())
}

fn emit_events(session: &mut GameSession, out: &mut impl Write) -> anyhow::Result<()> {
    for event in session.drain_events() {
        emit(out, &event)?;
    }
    Ok(())
}

fn exit_status(outcome: Option<Outcome>) -> u8 {
    match outcome {
        Some(Outcome::Lost) => 1,
        Some(Outcome::Won) | None => 0,
    }
}

fn parse_direction(value: &str) -> Result<Direction, String> {
    Direction::parse_move(value).ok_or_else(|| format!("unknown direction: {value}"))
}

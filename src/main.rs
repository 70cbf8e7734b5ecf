//! Eightball entry point
//!
//! `play` runs one game from standard input, one shot per line as `x y`
//! (cue velocity). Each response is printed as JSON and the shot's
//! animation is written to the output directory. `replay` renders a stored
//! shot from a history file.

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use eightball::Settings;
use eightball::persistence::{JsonHistory, MemoryHistory, ShotHistory, ShotId};
use eightball::renderer::animation_svg;
use eightball::session::{Session, ShotRequest, StartRequest};

const TABLE_NAME: &str = "table.svg";

#[derive(Parser)]
#[command(name = "eightball")]
#[command(about = "Two-player eight-ball with shot replay", long_about = None)]
struct Cli {
    /// Settings file (JSON); defaults are used when missing
    #[arg(long, global = true, default_value = "eightball.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game, reading one shot per line from stdin
    Play {
        #[arg(long)]
        p1: String,

        #[arg(long)]
        p2: String,

        #[arg(long, default_value = "game")]
        game: String,

        /// Directory the table SVG is written to
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Shot history file; overrides the settings file
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Render a recorded shot
    Replay {
        /// Shot history file
        #[arg(long)]
        history: PathBuf,

        /// Shot id to render
        #[arg(long)]
        shot: u64,

        /// Output SVG file
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut settings = Settings::load_or_default(&cli.settings);

    match cli.command {
        Commands::Play {
            p1,
            p2,
            game,
            out,
            history,
        } => {
            if history.is_some() {
                settings.history_path = history;
            }
            let start = StartRequest { p1, p2, game };
            match settings.history_path.clone() {
                Some(path) => {
                    let history = JsonHistory::open(&path, settings.physics)
                        .with_context(|| format!("opening history {}", path.display()))?;
                    play(Session::new(settings, history)?, &start, &out)
                }
                None => {
                    let history = MemoryHistory::new(settings.physics);
                    play(Session::new(settings, history)?, &start, &out)
                }
            }
        }

        Commands::Replay { history, shot, out } => {
            let history = JsonHistory::open(&history, settings.physics)
                .with_context(|| format!("opening history {}", history.display()))?;
            let frames = history.load(ShotId(shot))?;
            fs::write(&out, animation_svg(&frames))?;
            log::info!("Wrote {} frames to {}", frames.len(), out.display());
            Ok(())
        }
    }
}

fn play<H: ShotHistory>(mut session: Session<H>, start: &StartRequest, out: &Path) -> Result<()> {
    fs::create_dir_all(out)?;
    let table_path = out.join(TABLE_NAME);

    let response = session.start_game(start)?;
    println!("{}", serde_json::to_string(&response)?);
    if let Some(svg) = session.table_svg() {
        fs::write(&table_path, svg)?;
    }

    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let request = match parse_shot(line) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("Skipping input {line:?}: {e}");
                continue;
            }
        };

        let response = session.take_shot(request)?;
        println!("{}", serde_json::to_string(&response)?);
        if !response.animation.is_empty() {
            fs::write(&table_path, &response.animation)?;
        }
        if !response.ongoing {
            break;
        }
    }
    Ok(())
}

fn parse_shot(line: &str) -> Result<ShotRequest> {
    let mut parts = line.split_whitespace();
    let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("expected two numbers");
    };
    Ok(ShotRequest {
        x: x.parse()?,
        y: y.parse()?,
    })
}

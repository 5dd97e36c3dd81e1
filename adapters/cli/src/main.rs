#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Terminal adapter that plays a Rogue Chase session on stdin and stdout.

mod config;
mod render;

use std::{
    cell::RefCell,
    io::{self, BufRead, Write},
    path::PathBuf,
    rc::Rc,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rogue_chase_core::{EventObserver, RawInput, WELCOME_BANNER};
use rogue_chase_dungeon::{Digger, Dungeon};
use rogue_chase_session::{GameSession, SessionPhase};

use crate::render::{Screen, ScreenObserver};

const QUIT_KEY: char = 'q';

/// Command line arguments for the terminal adapter.
#[derive(Debug, Parser)]
#[command(name = "rogue-chase", version, about = "Escape the Borrowmir in a terminal dungeon")]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed overriding the configured one.
    #[arg(long)]
    seed: Option<u64>,

    /// Map width overriding the configured one.
    #[arg(long)]
    width: Option<u32>,

    /// Map height overriding the configured one.
    #[arg(long)]
    height: Option<u32>,

    /// Number of pursuers overriding the configured one.
    #[arg(long)]
    pursuers: Option<usize>,

    /// Disables ANSI colors.
    #[arg(long)]
    no_color: bool,

    /// Log level (off, error, warn, info, debug, trace); `RUST_LOG` wins when set.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Entry point for the Rogue Chase command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let mut file_config = config::load(args.config.as_deref())?;
    let session_config = &mut file_config.session;
    if let Some(seed) = args.seed {
        session_config.seed = seed;
    }
    if let Some(width) = args.width {
        session_config.width = width;
    }
    if let Some(height) = args.height {
        session_config.height = height;
    }
    if let Some(pursuers) = args.pursuers {
        session_config.pursuer_count = pursuers;
    }
    let color = file_config.display.color && !args.no_color;

    let screen = Rc::new(RefCell::new(Screen::new(color)));
    let observers: Vec<Box<dyn EventObserver>> =
        vec![Box::new(ScreenObserver::new(Rc::clone(&screen)))];
    let mut digger = Digger::new(file_config.session.seed);
    let mut session = GameSession::new(file_config.session, &mut digger, Dungeon::new(), observers)
        .context("failed to set up the dungeon")?;
    screen.borrow_mut().load_grid(session.grid());
    info!("session ready with seed {}", session.config().seed);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{WELCOME_BANNER}")?;
    writeln!(
        out,
        "Move with the arrow-style keys (vi keys or numpad digits), space opens a box, {QUIT_KEY} quits."
    )?;

    let mut phase = session.start().context("failed to start the session")?;
    draw(&mut out, &screen, &session)?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read input")?;
        let mut keys = line.chars().peekable();
        if keys.peek().is_none() {
            phase = session
                .handle_input(RawInput::Char('\n'))
                .context("failed to apply input")?;
        }
        for key in keys {
            if key == QUIT_KEY {
                return Ok(());
            }
            phase = session
                .handle_input(RawInput::Char(key))
                .context("failed to apply input")?;
            if matches!(phase, SessionPhase::GameOver { .. }) {
                break;
            }
        }

        draw(&mut out, &screen, &session)?;
        if matches!(phase, SessionPhase::GameOver { .. }) {
            break;
        }
    }

    Ok(())
}

fn draw(
    out: &mut impl Write,
    screen: &Rc<RefCell<Screen>>,
    session: &GameSession<Dungeon>,
) -> Result<()> {
    let stats = session.oracle().stats(session.human());
    write!(out, "{}", screen.borrow().render())?;
    writeln!(
        out,
        "HP {}/{}  moves {}  turns {}",
        stats.hitpoints,
        stats.max_hitpoints,
        stats.moves,
        session.turns_taken()
    )?;
    out.flush()?;
    Ok(())
}

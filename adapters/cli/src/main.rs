#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Trap Labs experience.

mod app;
mod config;
mod terminal;

use std::{
    io::{self, BufRead, Cursor},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use trap_labs_rendering::{Presentation, RenderingBackend};
use trap_labs_system_progress::{HighestLevelStore, JsonFileStore, MemoryStore};
use trap_labs_world::{Config, DEFAULT_TRAP_SEED};

use crate::{app::App, config::FileConfig, terminal::TerminalBackend};

/// Survive the booby-trapped labs one step at a time.
#[derive(Debug, Parser)]
#[command(name = "trap-labs", version)]
struct Args {
    /// TOML file with a seed, a store path and custom levels.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed driving trap placement.
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file keeping the highest level reached.
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Log filter, for example `debug` or `trap_labs_world=info`.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Whitespace separated inputs to play instead of reading stdin.
    #[arg(long)]
    script: Option<String>,
}

/// Entry point for the Trap Labs command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref())?;

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let catalogue = file.catalogue()?;
    let seed = args.seed.or(file.seed).unwrap_or(DEFAULT_TRAP_SEED);
    let world_config = Config::new(catalogue, seed);
    tracing::info!(seed, levels = world_config.catalogue().len(), "booting");

    match args.store.or(file.store) {
        Some(path) => play(world_config, JsonFileStore::new(path), args.script.as_deref()),
        None => play(world_config, MemoryStore::default(), args.script.as_deref()),
    }
}

fn init_logging(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter {directives:?}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn play<S: HighestLevelStore>(config: Config, store: S, script: Option<&str>) -> Result<()> {
    match script {
        Some(script) => run(config, store, Cursor::new(terminal::script_lines(script))),
        None => run(config, store, io::stdin().lock()),
    }
}

fn run<S: HighestLevelStore, R: BufRead>(config: Config, store: S, input: R) -> Result<()> {
    let mut app = App::new(config, store);
    let mut scene = app.scene();
    scene.notes.push(app.opening_note());
    let presentation = Presentation::new(app.banner(), scene);

    let backend = TerminalBackend::new(input, io::stdout().lock());
    backend.run(presentation, |input, scene| {
        let notes = app.handle_input(&input);
        *scene = app.scene();
        scene.notes = notes;
    })
}

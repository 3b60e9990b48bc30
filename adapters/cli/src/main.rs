#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plans a body's route through a seeded arena and
//! sweeps the body along it.

mod arena_code;
mod config;
mod route;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rally_core::{CellCoord, Matrix};
use rally_level_generation::{generate_arena, seed_for_level, ArenaParams};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    config::ScenarioConfig,
    route::{plan, render_ascii, RouteSettings},
};

/// Plans and sweeps a route through a generated or shared arena.
#[derive(Debug, Parser)]
#[command(name = "rally", version)]
struct Cli {
    /// TOML scenario file; built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,
    /// Overrides the campaign phrase the level seed is derived from.
    #[arg(long, value_name = "PHRASE")]
    seed_phrase: Option<String>,
    /// Overrides the level index.
    #[arg(long, value_name = "INDEX")]
    level: Option<u32>,
    /// Loads the arena from a share code instead of generating it.
    #[arg(long, value_name = "CODE")]
    arena_code: Option<String>,
    /// Arena cell the route starts from.
    #[arg(long, value_name = "COLUMN,ROW", value_parser = parse_cell)]
    start: Option<CellCoord>,
    /// Arena cell the route ends at.
    #[arg(long, value_name = "COLUMN,ROW", value_parser = parse_cell)]
    end: Option<CellCoord>,
    /// Skips sweeping the body along the planned route.
    #[arg(long)]
    no_sweep: bool,
    /// Prints the report as JSON instead of an ASCII map.
    #[arg(long)]
    json: bool,
    /// Enables debug logging unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut ScenarioConfig) {
        if let Some(phrase) = &self.seed_phrase {
            config.arena.seed_phrase.clone_from(phrase);
        }
        if let Some(level) = self.level {
            config.arena.level = level;
        }
        if let Some(start) = self.start {
            config.query.start = Some([start.column(), start.row()]);
        }
        if let Some(end) = self.end {
            config.query.end = Some([end.column(), end.row()]);
        }
        if self.no_sweep {
            config.query.sweep = false;
        }
    }
}

/// Entry point for the rally command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.scenario {
        Some(path) => ScenarioConfig::load(path)?,
        None => ScenarioConfig::default(),
    };
    cli.apply_overrides(&mut config);

    let arena = load_arena(&config, cli.arena_code.as_deref())?;
    let settings = RouteSettings::from_config(&config)?;
    let report = plan(&arena, &settings)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{json}");
    } else {
        print!("{}", render_ascii(&arena, &report));
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn load_arena(config: &ScenarioConfig, code: Option<&str>) -> Result<Matrix> {
    if let Some(code) = code {
        let arena = arena_code::decode(code).context("invalid --arena-code")?;
        info!(
            "loaded {}x{} arena from share code",
            arena.columns(),
            arena.rows()
        );
        return Ok(arena);
    }

    let params = ArenaParams {
        columns: config.arena.columns,
        rows: config.arena.rows,
        obstacle_percent: config.arena.obstacle_percent,
    };
    let seed = seed_for_level(&config.arena.seed_phrase, config.arena.level);
    info!(
        "generating level {} of '{}' with seed {seed:#018x}",
        config.arena.level, config.arena.seed_phrase
    );
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_arena(&params, &mut rng).context("failed to generate arena")
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected COLUMN,ROW but got '{value}'"))?;
    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid column '{column}': {error}"))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid row '{row}': {error}"))?;
    Ok(CellCoord::new(column, row))
}

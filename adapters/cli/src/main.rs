#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Cinderfall boss fight.

use std::{collections::BTreeMap, fs, path::PathBuf};

use anyhow::{ensure, Context, Result};
use cinderfall_core::{Event, SimulationConfig};
use cinderfall_system_simulation::Simulation;
use cinderfall_world::query;
use clap::Parser;

/// Headless driver for the Cinderfall arena.
#[derive(Debug, Parser)]
#[command(name = "cinderfall", version, about)]
struct Args {
    /// TOML file overriding the shipped simulation constants.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of fixed ticks to simulate.
    #[arg(long, default_value_t = 3600)]
    ticks: u32,
    /// Seed overriding the configured one.
    #[arg(long)]
    seed: Option<u64>,
    /// Length of one tick in milliseconds.
    #[arg(long, default_value_t = 16.0)]
    dt: f32,
}

/// Entry point for the Cinderfall command-line interface.
fn main() -> Result<()> {
    let _ = env_logger::Builder::from_default_env().try_init();
    let args = Args::parse();
    ensure!(args.dt > 0.0, "tick length must be positive, got {}", args.dt);

    let mut config = load_config(args.config.as_ref())?;
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    config.validate().context("invalid simulation configuration")?;

    let mut simulation = Simulation::new(config);
    println!("{}", query::welcome_banner(simulation.world()));
    let roster = simulation
        .populate_arena()
        .context("failed to populate the arena")?;

    let mut tally: BTreeMap<&'static str, usize> = BTreeMap::new();
    for _ in 0..args.ticks {
        let _ = simulation.step(args.dt);
        for event in simulation.drain_events() {
            *tally.entry(event_kind(&event)).or_default() += 1;
        }
    }

    log::info!("simulated {} ticks of {} ms", args.ticks, args.dt);
    for (kind, count) in &tally {
        println!("{kind:>20}: {count}");
    }
    if let Some(player) = query::player(simulation.world()) {
        println!("player hp: {}", player.state.hp);
    }
    if let Some(boss) = query::bosses(simulation.world())
        .into_iter()
        .find(|boss| boss.id == roster.boss)
    {
        println!(
            "boss: {:?} phase {}, health {}",
            boss.plan.action,
            boss.plan.phase,
            query::combat(simulation.world(), boss.id).map_or(0, |combat| combat.health)
        );
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    parse_config(&contents)
}

fn parse_config(contents: &str) -> Result<SimulationConfig> {
    toml::from_str(contents).context("failed to parse simulation configuration toml")
}

fn event_kind(event: &Event) -> &'static str {
    match event {
        Event::TimeAdvanced { .. } => "time advanced",
        Event::LevelLoaded { .. } => "level loaded",
        Event::ShapeRegistered { .. } => "shape registered",
        Event::EntitySpawned { .. } => "entity spawned",
        Event::EntityDespawned { .. } => "entity despawned",
        Event::EntityDamaged { .. } => "entity damaged",
        Event::EntityDefeated { .. } => "entity defeated",
        Event::HitRejected { .. } => "hit rejected",
        Event::PlayerHurt { .. } => "player hurt",
        Event::PlayerDefeated { .. } => "player defeated",
        Event::CollectableTouched { .. } => "collectable touched",
        Event::OneShotFinished { .. } => "one-shot finished",
        Event::PursuerBlinked { .. } => "pursuer blinked",
        Event::BossActionSelected { .. } => "boss action selected",
        Event::BossActionRejected { .. } => "boss action rejected",
        Event::BossActionCompleted { .. } => "boss action completed",
        Event::BossInterrupted { .. } => "boss interrupted",
        Event::MinionsRequested { .. } => "minions requested",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_configuration_keeps_the_shipped_defaults() {
        let config = parse_config("rng_seed = 42\n[grid]\ncolumns = 12\nrows = 8\n")
            .expect("valid toml");

        assert_eq!(config.rng_seed, 42);
        assert_eq!(config.grid.columns, 12);
        assert_eq!(config.boss, SimulationConfig::default().boss);
    }

    #[test]
    fn malformed_configuration_is_reported() {
        let error = parse_config("rng_seed = \"seven\"").expect_err("type mismatch");
        assert!(error.to_string().contains("simulation configuration"));
    }

    #[test]
    fn oversized_horizon_fails_validation() {
        let config = parse_config("[boss]\nhorizon = 9\n").expect("valid toml");
        assert!(config.validate().is_err());
    }

    #[test]
    fn arguments_fall_back_to_defaults() {
        let args = Args::parse_from(["cinderfall"]);
        assert_eq!(args.ticks, 3600);
        assert!(args.config.is_none());
        assert!(args.seed.is_none());
    }
}

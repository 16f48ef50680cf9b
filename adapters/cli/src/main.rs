#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line driver for Dam Defense.
//!
//! Builds the requested tower layout between waves, starts each wave as soon
//! as the simulation is ready for it and runs until the dam falls, the final
//! stage is cleared or the time limit expires.

mod layout;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use dam_defense_config::{Catalog, GameSettings};
use dam_defense_core::{
    Command, Event, EventKind, GameStatus, Listen, Rejection, TowerLevel, Verdict,
};
use dam_defense_simulation::Simulation;
use dam_defense_world::query;
use tracing_subscriber::EnvFilter;

use crate::layout::TowerPlan;

const DEFAULT_LAYOUT: [&str; 6] = [
    "1:agile",
    "2:capable/waterBomber",
    "3:smart/wizard",
    "0:brave/suit",
    "4:agile/blowgunner",
    "5:smart/iceMage",
];

#[derive(Debug, Parser)]
#[command(name = "dam-defense")]
#[command(about = "Run a Dam Defense session headlessly with a scripted tower layout")]
struct Args {
    /// TOML file overriding the session settings.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Tower plans as SLOT:FAMILY[/UPGRADE], built in the given order.
    #[arg(long = "tower", value_name = "PLAN")]
    towers: Vec<TowerPlan>,
    /// Run at double speed.
    #[arg(long)]
    double_speed: bool,
    /// Frame length in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u32,
    /// Simulated seconds after which the run stops.
    #[arg(long, default_value_t = 3600.0)]
    max_seconds: f32,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let settings = load_settings(args.settings.as_ref())?;
    let catalog = Catalog::load_embedded().context("embedded tables failed to load")?;
    let plans = if args.towers.is_empty() {
        DEFAULT_LAYOUT
            .iter()
            .map(|entry| entry.parse())
            .collect::<Result<Vec<TowerPlan>, _>>()
            .context("built-in layout is malformed")?
    } else {
        args.towers
    };

    let mut simulation = Simulation::new(catalog, settings);
    for kind in EventKind::ALL {
        let _ = simulation.bus_mut().subscribe(kind, log_event);
    }
    simulation.start_session();
    if args.double_speed {
        let _ = simulation.apply(Command::ToggleSpeed)?;
    }

    let frame = args.tick_ms.max(1) as f32 / 1000.0;
    while simulation.state().elapsed < args.max_seconds {
        match simulation.state().status {
            GameStatus::Preparing => {
                build(&mut simulation, &plans)?;
                let verdict = simulation.apply(Command::StartNextWave)?;
                if let Verdict::Rejected(reason) = verdict {
                    tracing::warn!(?reason, "wave refused");
                }
            }
            GameStatus::GameOver | GameStatus::Victory => break,
            GameStatus::Menu | GameStatus::Playing | GameStatus::Paused => {}
        }
        simulation.update(frame)?;
    }

    let hud = query::hud(simulation.state());
    println!("status:  {:?}", hud.status);
    println!("stage:   {} wave {}", hud.stage.get(), hud.wave + 1);
    println!("dam:     {:.0}/{:.0}", hud.dam_hp, hud.dam_max_hp);
    println!("gold:    {}", hud.gold);
    println!("elapsed: {:.1}s", hud.elapsed);
    Ok(())
}

fn load_settings(path: Option<&PathBuf>) -> Result<GameSettings> {
    let Some(path) = path else {
        return Ok(GameSettings::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    GameSettings::from_toml_str(&source)
        .with_context(|| format!("invalid settings in {}", path.display()))
}

/// Places missing towers and applies pending upgrades in plan order, stopping
/// at the first one the ledger cannot cover.
fn build(simulation: &mut Simulation, plans: &[TowerPlan]) -> Result<()> {
    for plan in plans {
        let command = match simulation.state().towers.get(&plan.slot) {
            None => Command::PlaceTower {
                slot: plan.slot,
                family: plan.family,
            },
            Some(tower) => match (tower.level(), plan.upgrade) {
                (TowerLevel::Base, Some(upgrade)) => Command::UpgradeTower {
                    slot: plan.slot,
                    upgrade,
                },
                _ => continue,
            },
        };
        match simulation.apply(command)? {
            Verdict::Applied => {}
            Verdict::Rejected(Rejection::InsufficientGold) => break,
            Verdict::Rejected(reason) => {
                tracing::warn!(slot = plan.slot.get(), ?reason, "tower plan refused");
            }
        }
    }
    Ok(())
}

fn log_event(event: &Event) -> Listen {
    match event {
        Event::DamDamaged { .. } | Event::GoldChanged { .. } => tracing::trace!(?event),
        Event::EnemyKilled { .. } => tracing::debug!(?event),
        _ => tracing::info!(?event),
    }
    Listen::Continue
}

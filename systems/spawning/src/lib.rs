#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed enemy creation from a wave's spawn plan.

use std::collections::{BTreeSet, VecDeque};

use dam_defense_config::{Catalog, WaveConfig};
use dam_defense_core::{EnemyKind, Position, SimulationError, BOSS_FIRST_SPAWN_DELAY};
use dam_defense_world::{Enemy, EnemyFactory};

/// One scheduled spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnEntry {
    /// Kind to spawn.
    pub kind: EnemyKind,
    /// Seconds to wait after the previous spawn.
    pub delay: f32,
}

/// Builds the ordered spawn plan for a wave.
///
/// Entries run weak, mid, strong, then boss; kinds keep table order inside
/// a bracket. The first entry has no delay, the first spawn of each boss kind
/// waits [`BOSS_FIRST_SPAWN_DELAY`], and every other entry waits its kind's
/// spawn interval.
pub fn build_plan(catalog: &Catalog, wave: &WaveConfig) -> Result<Vec<SpawnEntry>, SimulationError> {
    let mut groups = Vec::with_capacity(wave.spawns.len());
    for group in &wave.spawns {
        let config = catalog.enemy(group.enemy)?;
        groups.push((config.category, group.enemy, group.count, config));
    }
    groups.sort_by_key(|(category, ..)| *category);

    let mut plan = Vec::new();
    let mut bosses_seen = BTreeSet::new();
    for (_, kind, count, config) in groups {
        for _ in 0..count {
            let delay = if plan.is_empty() {
                0.0
            } else if config.is_boss && !bosses_seen.contains(&kind) {
                BOSS_FIRST_SPAWN_DELAY
            } else {
                config.spawn_interval
            };
            if config.is_boss {
                let _ = bosses_seen.insert(kind);
            }
            plan.push(SpawnEntry { kind, delay });
        }
    }
    Ok(plan)
}

/// Drains a spawn plan over time.
#[derive(Debug, Default)]
pub struct SpawnSystem {
    plan: VecDeque<SpawnEntry>,
    accumulator: f32,
    spawned: usize,
}

impl SpawnSystem {
    /// Creates an idle spawner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the plan for `wave`, discarding anything still queued.
    pub fn start(&mut self, catalog: &Catalog, wave: &WaveConfig) -> Result<(), SimulationError> {
        self.plan = build_plan(catalog, wave)?.into();
        self.accumulator = 0.0;
        self.spawned = 0;
        tracing::debug!(entries = self.plan.len(), "spawn plan loaded");
        Ok(())
    }

    /// Drops every queued spawn.
    pub fn clear(&mut self) {
        self.plan.clear();
        self.accumulator = 0.0;
    }

    /// Reports whether every planned enemy was spawned.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.plan.is_empty()
    }

    /// Entries still queued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.plan.len()
    }

    /// Enemies spawned since the plan was loaded.
    #[must_use]
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    /// Advances the plan by `dt`, pushing every enemy due into `out`.
    ///
    /// A large `dt` may release several entries at once.
    pub fn update(
        &mut self,
        dt: f32,
        catalog: &Catalog,
        factory: &mut EnemyFactory,
        spawn_point: Position,
        out: &mut Vec<Enemy>,
    ) -> Result<(), SimulationError> {
        if self.plan.is_empty() {
            return Ok(());
        }

        self.accumulator += dt;
        while let Some(entry) = self.plan.front().copied() {
            if self.accumulator < entry.delay {
                break;
            }
            self.accumulator -= entry.delay;
            let _ = self.plan.pop_front();
            let enemy = factory.create(catalog, entry.kind, spawn_point)?;
            tracing::trace!(enemy = %enemy.id(), "enemy spawned");
            out.push(enemy);
            self.spawned += 1;
        }

        if self.plan.is_empty() {
            self.accumulator = 0.0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dam_defense_config::SpawnGroup;

    #[test]
    fn empty_spawner_is_complete() {
        let catalog = Catalog::load_embedded().expect("embedded tables are valid");
        let mut spawner = SpawnSystem::new();
        let mut factory = EnemyFactory::new();
        let mut out = Vec::new();

        spawner
            .update(5.0, &catalog, &mut factory, Position::ZERO, &mut out)
            .expect("nothing to spawn");

        assert!(spawner.is_complete());
        assert!(out.is_empty());
    }

    #[test]
    fn boss_waits_only_on_its_first_spawn() {
        let catalog = Catalog::load_embedded().expect("embedded tables are valid");
        let wave = WaveConfig {
            spawns: vec![
                SpawnGroup {
                    enemy: EnemyKind::RiverTroll,
                    count: 2,
                },
                SpawnGroup {
                    enemy: EnemyKind::Rat,
                    count: 1,
                },
            ],
        };

        let plan = build_plan(&catalog, &wave).expect("kinds exist");

        let troll = catalog.enemy(EnemyKind::RiverTroll).expect("troll exists");
        assert_eq!(
            plan,
            vec![
                SpawnEntry {
                    kind: EnemyKind::Rat,
                    delay: 0.0,
                },
                SpawnEntry {
                    kind: EnemyKind::RiverTroll,
                    delay: BOSS_FIRST_SPAWN_DELAY,
                },
                SpawnEntry {
                    kind: EnemyKind::RiverTroll,
                    delay: troll.spawn_interval,
                },
            ]
        );
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Status effect ticking.

use dam_defense_core::{geometry, Effect, Position, RANGE_UNIT};
use dam_defense_world::Enemy;

/// Advances status effects on every live enemy.
#[derive(Debug, Default)]
pub struct EffectSystem {
    ticks: u64,
}

impl EffectSystem {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decrements every effect by `dt`, applying damage over time and
    /// pruning expired effects.
    pub fn update(&mut self, dt: f32, enemies: &mut [Enemy]) {
        self.ticks = self.ticks.wrapping_add(1);
        let mut killed = 0_usize;
        for enemy in enemies.iter_mut().filter(|enemy| !enemy.is_dead()) {
            enemy.tick_effects(dt);
            if enemy.is_dead() {
                killed += 1;
            }
        }
        if killed > 0 {
            tracing::trace!(tick = self.ticks, killed, "damage over time finished enemies");
        }
    }
}

/// Applies `effect` to every live enemy within `radius` range units of
/// `center`. Returns how many enemies were affected.
pub fn apply_in_radius(enemies: &mut [Enemy], center: Position, radius: f32, effect: Effect) -> usize {
    let reach = radius * RANGE_UNIT;
    let mut affected = 0;
    for enemy in enemies
        .iter_mut()
        .filter(|enemy| !enemy.is_dead())
        .filter(|enemy| geometry::distance(center, enemy.position()) <= reach)
    {
        enemy.apply_effect(effect);
        affected += 1;
    }
    affected
}

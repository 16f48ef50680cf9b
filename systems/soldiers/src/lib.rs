#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Soldier squads: lifecycle tied to summoning towers, blocking melee and
//! stun pulses.

use std::collections::BTreeMap;

use dam_defense_core::{
    calculate_damage, geometry, AttackType, Effect, EffectKind, EnemyStatus, Position, Rejection,
    SlotId, SoldierStatus, Verdict, RANGE_UNIT, SOLDIER_ENGAGE_RANGE,
};
use dam_defense_system_effects::apply_in_radius;
use dam_defense_system_path::PathSystem;
use dam_defense_world::{Enemy, GameState, Soldier, SoldierSquad};

/// Keeps squads in step with tower ownership and runs soldier melee.
#[derive(Debug, Default)]
pub struct SoldierSystem {
    rally_overrides: BTreeMap<SlotId, Position>,
}

impl SoldierSystem {
    /// Creates the system with no player-set rally points.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the rally point of the squad owned by the tower on `slot`.
    ///
    /// Rejected when the slot is empty or its tower does not summon.
    pub fn set_rally_point(&mut self, state: &mut GameState, slot: SlotId, point: Position) -> Verdict {
        let Some(tower) = state.towers.get(&slot) else {
            return Verdict::Rejected(Rejection::NoTower);
        };
        if tower.config().soldiers().is_none() {
            return Verdict::Rejected(Rejection::NotSummoner);
        }
        let _ = self.rally_overrides.insert(slot, point);
        if let Some(squad) = state.squads.get_mut(&slot) {
            squad.set_rally_point(point);
        }
        tracing::debug!(slot = slot.get(), x = point.x, y = point.y, "rally point moved");
        Verdict::Applied
    }

    /// Runs one soldier tick: reconciles squads, then moves, fights,
    /// respawns and pulses every soldier.
    pub fn update(&mut self, dt: f32, path: &PathSystem, state: &mut GameState) {
        self.reconcile(path, state);
        let GameState {
            squads, enemies, ..
        } = state;
        for soldier in squads.values_mut().flat_map(SoldierSquad::soldiers_mut) {
            if soldier.status() == SoldierStatus::Dead {
                let _ = soldier.tick_respawn(dt);
                continue;
            }
            pulse(soldier, dt, enemies);
            match soldier.status() {
                SoldierStatus::MovingToRally => soldier.walk(dt),
                SoldierStatus::Idle => seek(soldier, enemies),
                SoldierStatus::Engaging => fight(soldier, dt, enemies),
                SoldierStatus::Dead => {}
            }
        }
    }

    /// Creates, rebuilds and disbands squads so that every summoning tower
    /// owns exactly one squad matching its identity.
    fn reconcile(&mut self, path: &PathSystem, state: &mut GameState) {
        let GameState {
            towers,
            squads,
            enemies,
            ..
        } = state;

        let orphaned: Vec<SlotId> = squads
            .keys()
            .copied()
            .filter(|slot| {
                towers
                    .get(slot)
                    .map_or(true, |tower| tower.config().soldiers().is_none())
            })
            .collect();
        for slot in orphaned {
            if let Some(squad) = squads.remove(&slot) {
                release_blocks(&squad, enemies);
                tracing::debug!(slot = slot.get(), "squad disbanded");
            }
            let _ = self.rally_overrides.remove(&slot);
        }

        for (slot, tower) in towers.iter() {
            let Some(profile) = tower.config().soldiers() else {
                continue;
            };
            let rally = self
                .rally_overrides
                .get(slot)
                .copied()
                .unwrap_or_else(|| path.nearest_point(tower.position()));
            match squads.get_mut(slot) {
                Some(squad) if squad.signature() == tower.identity() => {
                    if squad.rally_point() != rally {
                        squad.set_rally_point(rally);
                    }
                }
                existing => {
                    if let Some(old) = existing {
                        release_blocks(old, enemies);
                    }
                    let squad = SoldierSquad::new(
                        *slot,
                        tower.identity(),
                        profile,
                        tower.position(),
                        rally,
                    );
                    tracing::debug!(
                        slot = slot.get(),
                        tower = tower.identity().as_str(),
                        soldiers = squad.soldiers().len(),
                        "squad summoned"
                    );
                    let _ = squads.insert(*slot, squad);
                }
            }
        }
    }
}

fn release_blocks(squad: &SoldierSquad, enemies: &mut [Enemy]) {
    for soldier in squad.soldiers() {
        if let Some(enemy) = enemies
            .iter_mut()
            .find(|enemy| enemy.blocked_by() == Some(soldier.key()))
        {
            enemy.release();
        }
    }
}

fn pulse(soldier: &mut Soldier, dt: f32, enemies: &mut [Enemy]) {
    let Some(aura) = soldier.stun_aura() else {
        return;
    };
    if soldier.pulse(dt) {
        let stun = Effect::new(EffectKind::Stun, aura.duration, 0.0);
        let stunned = apply_in_radius(enemies, soldier.position(), aura.radius, stun);
        tracing::trace!(soldier = ?soldier.key(), stunned, "stun pulse");
    }
}

/// Engages the first moving, unstunned enemy near the soldier's post.
fn seek(soldier: &mut Soldier, enemies: &mut [Enemy]) {
    let reach = SOLDIER_ENGAGE_RANGE * RANGE_UNIT;
    let post = soldier.rally_point();
    let candidate = enemies.iter_mut().find(|enemy| {
        !enemy.is_dead()
            && !enemy.is_stunned()
            && enemy.status() == EnemyStatus::Moving
            && geometry::distance(post, enemy.position()) <= reach
    });
    if let Some(enemy) = candidate {
        if enemy.block(soldier.key()) {
            soldier.engage(enemy.id());
        }
    }
}

/// Trades blows with the blocked enemy; drops it once it is gone or dead.
/// A stunned enemy takes hits without answering them.
fn fight(soldier: &mut Soldier, dt: f32, enemies: &mut [Enemy]) {
    let key = soldier.key();
    let target = soldier.target();
    let Some(enemy) = enemies.iter_mut().find(|enemy| {
        Some(enemy.id()) == target && !enemy.is_dead() && enemy.blocked_by() == Some(key)
    }) else {
        let _ = soldier.disengage();
        return;
    };

    if soldier.strike(dt) {
        let profile = soldier.profile();
        let _ = enemy.take_damage(profile.atk, AttackType::Physical);
        if enemy.is_dead() {
            let _ = soldier.disengage();
            return;
        }
    }

    if enemy.is_stunned() {
        return;
    }
    let profile = soldier.profile();
    let blow = calculate_damage(enemy.config().atk, AttackType::Physical, profile.def, profile.mdef);
    let damage = blow * enemy.effective_attack_speed() * dt;
    if soldier.take_damage(damage) {
        enemy.release();
        tracing::trace!(soldier = ?key, enemy = %enemy.id(), "soldier fell");
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tower combat: aura debuffs, attack dispatch, projectile resolution and the
//! dead-enemy sweep.

use dam_defense_core::{
    geometry, EnemyId, Event, ObjectPool, Position, TargetMode, CONE_HALF_ANGLE,
    PROJECTILE_SPEED, RANGE_UNIT,
};
use dam_defense_system_path::PathSystem;
use dam_defense_world::{
    splash_targets, Enemy, Flight, GameState, GoldManager, Launch, Projectile, Splash, Tower,
};

/// Extra flight distance granted to a shot beyond its tower's reach.
const FLIGHT_MARGIN: f32 = 2.0 * RANGE_UNIT;

/// Target data captured before the tower borrows the enemy list mutably.
#[derive(Clone, Copy, Debug)]
struct Aim {
    id: EnemyId,
    position: Position,
    progress: f32,
}

/// Resolves tower attacks against the live enemy list once per tick.
#[derive(Debug, Default)]
pub struct CombatSystem {
    pool: ObjectPool<Projectile>,
    hits: Vec<EnemyId>,
}

impl CombatSystem {
    /// Creates a combat system with an empty projectile pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Projectiles waiting in the pool for reuse.
    #[must_use]
    pub fn pooled_projectiles(&self) -> usize {
        self.pool.available()
    }

    /// Runs one combat tick against `state`.
    ///
    /// Debuffs are recomputed first, then every tower attacks, then
    /// projectiles advance, and finally dead enemies pay out and leave the
    /// live list.
    pub fn update(
        &mut self,
        dt: f32,
        path: &PathSystem,
        state: &mut GameState,
        out_events: &mut Vec<Event>,
    ) {
        refresh_debuffs(state);
        let now = state.elapsed;
        for tower in state.towers.values_mut() {
            tower.update_phase(now);
            self.attack(tower, dt, now, path, &mut state.enemies, &mut state.projectiles);
        }
        self.advance_projectiles(dt, state);
        sweep_dead(state, out_events);
    }

    fn attack(
        &mut self,
        tower: &mut Tower,
        dt: f32,
        now: f32,
        path: &PathSystem,
        enemies: &mut [Enemy],
        projectiles: &mut Vec<Projectile>,
    ) {
        let Some(aim) = tower.find_target(enemies).map(|enemy| Aim {
            id: enemy.id(),
            position: enemy.position(),
            progress: enemy.progress(),
        }) else {
            return;
        };

        match tower.config().target_mode {
            TargetMode::Cone => channel_cone(tower, aim, dt, now, enemies),
            TargetMode::Line => {
                if !tower.can_attack(now) {
                    return;
                }
                tower.record_attack(now);
                projectiles.push(self.fire(tower, aim, 0.0, None));
                let radius = tower.config().aoe_radius.unwrap_or(0.0);
                let span = path.distance_as_progress(radius * RANGE_UNIT);
                self.hits.clear();
                self.hits
                    .extend(tower.find_line_targets(enemies, aim.progress, span));
                strike_all(tower, &self.hits, enemies);
            }
            TargetMode::Single | TargetMode::Aoe => {
                if !tower.can_attack(now) {
                    return;
                }
                tower.record_attack(now);
                let config = tower.config();
                let splash = (config.target_mode == TargetMode::Aoe).then(|| Splash {
                    radius: config.aoe_radius.unwrap_or(0.0),
                    max_targets: config.max_targets,
                });
                projectiles.push(self.fire(tower, aim, config.atk, splash));
            }
        }
    }

    fn fire(&mut self, tower: &Tower, aim: Aim, damage: f32, splash: Option<Splash>) -> Projectile {
        let config = tower.config();
        let mut projectile = self.pool.acquire(Projectile::default);
        projectile.launch(Launch {
            origin: tower.position(),
            target: Some(aim.id),
            direction: aim.position - tower.position(),
            speed: PROJECTILE_SPEED,
            damage,
            attack_type: config.attack_type,
            splash,
            effect: (damage > 0.0).then(|| config.effect()).flatten(),
            max_distance: config.range_in_units() + FLIGHT_MARGIN,
        });
        projectile
    }

    fn advance_projectiles(&mut self, dt: f32, state: &mut GameState) {
        let in_flight = std::mem::take(&mut state.projectiles);
        for mut projectile in in_flight {
            let goal = projectile
                .target()
                .and_then(|id| state.enemy(id))
                .filter(|enemy| !enemy.is_dead())
                .map(Enemy::position);
            match projectile.advance(dt, goal) {
                Flight::Travelling => state.projectiles.push(projectile),
                Flight::Arrived => {
                    if let Some(center) = goal {
                        self.resolve(&projectile, center, &mut state.enemies);
                    }
                    self.pool.release(projectile);
                }
                Flight::Expired => self.pool.release(projectile),
            }
        }
    }

    fn resolve(&mut self, projectile: &Projectile, center: Position, enemies: &mut [Enemy]) {
        if projectile.damage() <= 0.0 {
            return;
        }
        self.hits.clear();
        match (projectile.splash(), projectile.target()) {
            (Some(splash), _) => self.hits.extend(splash_targets(
                enemies,
                center,
                splash.radius,
                splash.max_targets,
            )),
            (None, Some(target)) => self.hits.push(target),
            (None, None) => return,
        }
        for enemy in enemies
            .iter_mut()
            .filter(|enemy| self.hits.contains(&enemy.id()))
        {
            let _ = enemy.take_damage(projectile.damage(), projectile.attack_type());
            if let Some(effect) = projectile.effect() {
                enemy.apply_effect(effect);
            }
        }
    }
}

/// Sets every tower's debuff to the strongest aura reaching it, or zero.
fn refresh_debuffs(state: &mut GameState) {
    for tower in state.towers.values_mut() {
        let debuff = state
            .enemies
            .iter()
            .filter(|enemy| !enemy.is_dead())
            .filter_map(|enemy| {
                let (radius, amount) = enemy.config().attack_speed_aura()?;
                let reach = radius * RANGE_UNIT;
                (geometry::distance(tower.position(), enemy.position()) <= reach).then_some(amount)
            })
            .fold(0.0_f32, f32::max);
        tower.set_attack_speed_debuff(debuff);
    }
}

/// Continuous cone damage; the cooldown only drives the visual phase.
fn channel_cone(tower: &mut Tower, aim: Aim, dt: f32, now: f32, enemies: &mut [Enemy]) {
    if tower.can_attack(now) {
        tower.record_attack(now);
    }
    let config = tower.config();
    let damage = config.atk * tower.effective_attack_speed() * dt;
    let direction = aim.position - tower.position();
    let reach = config.range_in_units();
    for enemy in enemies.iter_mut().filter(|enemy| !enemy.is_dead()) {
        if !geometry::in_cone(
            tower.position(),
            direction,
            enemy.position(),
            CONE_HALF_ANGLE,
            reach,
        ) {
            continue;
        }
        let _ = enemy.take_true_damage(damage);
        if let Some(effect) = config.effect() {
            enemy.apply_effect(effect);
        }
    }
}

fn strike_all(tower: &Tower, hits: &[EnemyId], enemies: &mut [Enemy]) {
    let config = tower.config();
    for enemy in enemies
        .iter_mut()
        .filter(|enemy| hits.contains(&enemy.id()))
    {
        let _ = enemy.take_damage(config.atk, config.attack_type);
        if let Some(effect) = config.effect() {
            enemy.apply_effect(effect);
        }
    }
}

/// Pays out dead enemies, returns them to the factory and keeps survivors.
fn sweep_dead(state: &mut GameState, out_events: &mut Vec<Event>) {
    if !state.enemies.iter().any(Enemy::is_dead) {
        return;
    }
    let GameState {
        enemies,
        gold,
        enemy_factory,
        ..
    } = state;
    let (dead, alive): (Vec<Enemy>, Vec<Enemy>) =
        std::mem::take(enemies).into_iter().partition(Enemy::is_dead);
    *enemies = alive;
    for enemy in dead {
        pay_out(gold, &enemy, out_events);
        enemy_factory.release(enemy);
    }
}

fn pay_out(gold: &mut GoldManager, enemy: &Enemy, out_events: &mut Vec<Event>) {
    let bounty = enemy.config().gold;
    gold.earn(bounty, out_events);
    out_events.push(Event::EnemyKilled {
        enemy: enemy.id(),
        gold_earned: bounty,
    });
    tracing::trace!(enemy = %enemy.id(), bounty, "enemy killed");
}

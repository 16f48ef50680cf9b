//! Enemy entity, its state machine and the pooled factory that creates it.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use dam_defense_config::{Catalog, EnemyConfig};
use dam_defense_core::{
    calculate_damage, true_damage, AttackType, Effect, EffectKind, EnemyId, EnemyKind,
    EnemyStatus, ObjectPool, Poolable, Position, SimulationError, SoldierKey,
    SLOW_ATTACK_SPEED_FACTOR,
};
use dam_defense_system_path::PathSystem;

/// Shared source of enemy sequence numbers.
///
/// Every enemy created or recycled by the same factory draws from one
/// counter, so identifiers stay unique across pool reuse.
#[derive(Clone, Debug, Default)]
pub struct IdSequence(Arc<AtomicU64>);

impl IdSequence {
    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// An enemy walking the path toward the dam.
#[derive(Clone, Debug)]
pub struct Enemy {
    id: EnemyId,
    config: Arc<EnemyConfig>,
    ids: IdSequence,
    hp: f32,
    max_hp: f32,
    progress: f32,
    position: Position,
    status: EnemyStatus,
    effects: Vec<Effect>,
    attack_cooldown: f32,
    blocked_by: Option<SoldierKey>,
}

impl Enemy {
    /// Creates a fresh enemy at `position` with full health.
    #[must_use]
    pub fn new(config: Arc<EnemyConfig>, ids: IdSequence, position: Position) -> Self {
        let id = EnemyId::new(config.kind, ids.next());
        let hp = config.hp;
        Self {
            id,
            config,
            ids,
            hp,
            max_hp: hp,
            progress: 0.0,
            position,
            status: EnemyStatus::Moving,
            effects: Vec::new(),
            attack_cooldown: 0.0,
            blocked_by: None,
        }
    }

    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> EnemyId {
        self.id
    }

    /// Enemy kind.
    #[must_use]
    pub fn kind(&self) -> EnemyKind {
        self.config.kind
    }

    /// Immutable configuration.
    #[must_use]
    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    /// Current health, never negative.
    #[must_use]
    pub fn hp(&self) -> f32 {
        self.hp
    }

    /// Maximum health.
    #[must_use]
    pub fn max_hp(&self) -> f32 {
        self.max_hp
    }

    /// Progress along the path in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// World position derived from progress.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Lifecycle state.
    #[must_use]
    pub fn status(&self) -> EnemyStatus {
        self.status
    }

    /// Active status effects.
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Seconds until the next attack on the blocking soldier.
    #[must_use]
    pub fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    /// Soldier currently blocking the enemy.
    #[must_use]
    pub fn blocked_by(&self) -> Option<SoldierKey> {
        self.blocked_by
    }

    /// Reports whether the enemy is dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.status == EnemyStatus::Dead
    }

    /// Reports whether any stun is active.
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        self.has_effect(EffectKind::Stun)
    }

    fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|effect| effect.kind == kind)
    }

    fn summed(&self, kind: EffectKind) -> f32 {
        self.effects
            .iter()
            .filter(|effect| effect.kind == kind)
            .map(|effect| effect.value)
            .sum()
    }

    /// Base speed reduced by slows, floored at zero.
    #[must_use]
    pub fn effective_speed(&self) -> f32 {
        let factor = (1.0 - self.summed(EffectKind::Slow)).max(0.0);
        self.config.speed * factor
    }

    /// Attack speed reduced by slows at two thirds strength and by attack
    /// speed debuffs, floored at zero.
    #[must_use]
    pub fn effective_attack_speed(&self) -> f32 {
        let slow = (1.0 - self.summed(EffectKind::Slow) * SLOW_ATTACK_SPEED_FACTOR).max(0.0);
        let debuff = (1.0 - self.summed(EffectKind::AttackSpeedDebuff)).max(0.0);
        self.config.attack_speed * slow * debuff
    }

    /// Seconds between attacks; infinite when attack speed is zero.
    #[must_use]
    pub fn attack_interval(&self) -> f32 {
        let speed = self.effective_attack_speed();
        if speed <= 0.0 {
            f32::INFINITY
        } else {
            1.0 / speed
        }
    }

    /// Attaches an effect, refreshing an existing one of the same kind.
    pub fn apply_effect(&mut self, effect: Effect) {
        if self.is_dead() {
            return;
        }
        match self
            .effects
            .iter_mut()
            .find(|active| active.kind == effect.kind)
        {
            Some(active) => *active = effect,
            None => self.effects.push(effect),
        }
    }

    /// Applies mitigated damage and returns the amount dealt.
    pub fn take_damage(&mut self, amount: f32, attack_type: AttackType) -> f32 {
        if self.is_dead() {
            return 0.0;
        }
        let damage = calculate_damage(amount, attack_type, self.config.def, self.config.mdef);
        self.lose_hp(damage)
    }

    /// Applies unmitigated damage and returns the amount dealt.
    pub fn take_true_damage(&mut self, amount: f32) -> f32 {
        if self.is_dead() {
            return 0.0;
        }
        self.lose_hp(true_damage(amount))
    }

    /// Kills the enemy outright.
    pub fn kill(&mut self) {
        let _ = self.take_true_damage(self.hp);
    }

    fn lose_hp(&mut self, damage: f32) -> f32 {
        let dealt = damage.min(self.hp);
        self.hp -= dealt;
        if self.hp <= 0.0 {
            self.hp = 0.0;
            self.status = EnemyStatus::Dead;
            self.blocked_by = None;
        }
        dealt
    }

    /// Lets a soldier claim the enemy. Fails unless the enemy is moving and
    /// unclaimed.
    pub fn block(&mut self, soldier: SoldierKey) -> bool {
        if self.status != EnemyStatus::Moving || self.blocked_by.is_some() {
            return false;
        }
        self.status = EnemyStatus::Blocked;
        self.blocked_by = Some(soldier);
        self.attack_cooldown = self.attack_interval();
        true
    }

    /// Clears the block; a blocked enemy resumes moving.
    pub fn release(&mut self) {
        self.blocked_by = None;
        if self.status == EnemyStatus::Blocked {
            self.status = EnemyStatus::Moving;
        }
    }

    /// Advances every effect by `dt`; poison and burn deal true damage.
    ///
    /// Runs regardless of stun so that stuns expire.
    pub fn tick_effects(&mut self, dt: f32) {
        if self.is_dead() {
            return;
        }
        let damage: f32 = self
            .effects
            .iter()
            .filter(|effect| matches!(effect.kind, EffectKind::Poison | EffectKind::Burn))
            .map(|effect| effect.value * dt)
            .sum();
        for effect in &mut self.effects {
            effect.duration -= dt;
        }
        self.effects.retain(|effect| effect.duration > 0.0);
        if damage > 0.0 {
            let _ = self.take_true_damage(damage);
        }
    }

    /// Runs one tick of movement or attacking and returns the damage dealt
    /// to the dam.
    ///
    /// Stunned and dead enemies do nothing.
    pub fn update(&mut self, dt: f32, path: &PathSystem) -> f32 {
        if self.is_dead() || self.is_stunned() {
            return 0.0;
        }
        match self.status {
            EnemyStatus::Moving => {
                self.progress += path.speed_as_progress(self.effective_speed()) * dt;
                if self.progress >= 1.0 {
                    self.progress = 1.0;
                    self.status = EnemyStatus::AttackingDam;
                }
                self.position = path.position_at_progress(self.progress);
                0.0
            }
            EnemyStatus::Blocked => {
                if self.blocked_by.is_none() {
                    self.status = EnemyStatus::Moving;
                    return 0.0;
                }
                self.attack_cooldown -= dt;
                if self.attack_cooldown <= 0.0 {
                    self.attack_cooldown += self.attack_interval();
                }
                0.0
            }
            EnemyStatus::AttackingDam => {
                self.config.atk * self.effective_attack_speed() * dt
            }
            EnemyStatus::Dead => 0.0,
        }
    }

    /// Places the enemy at the start of the path.
    pub fn place_at(&mut self, position: Position) {
        self.position = position;
    }
}

impl Poolable for Enemy {
    fn reset(&mut self) {
        self.id = EnemyId::new(self.config.kind, self.ids.next());
        self.hp = self.config.hp;
        self.max_hp = self.config.hp;
        self.progress = 0.0;
        self.position = Position::ZERO;
        self.status = EnemyStatus::Moving;
        self.effects.clear();
        self.attack_cooldown = 0.0;
        self.blocked_by = None;
    }
}

/// Creates enemies from the catalog, recycling dead ones per kind.
#[derive(Debug, Default)]
pub struct EnemyFactory {
    pools: BTreeMap<EnemyKind, ObjectPool<Enemy>>,
    ids: IdSequence,
}

impl EnemyFactory {
    /// Creates a factory with empty pools.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces an enemy of `kind` standing at `position`.
    pub fn create(
        &mut self,
        catalog: &Catalog,
        kind: EnemyKind,
        position: Position,
    ) -> Result<Enemy, SimulationError> {
        let config = catalog.enemy(kind)?;
        let ids = &self.ids;
        let mut enemy = self
            .pools
            .entry(kind)
            .or_default()
            .acquire(|| Enemy::new(Arc::clone(config), ids.clone(), position));
        enemy.place_at(position);
        Ok(enemy)
    }

    /// Returns a removed enemy to its pool.
    pub fn release(&mut self, enemy: Enemy) {
        self.pools.entry(enemy.kind()).or_default().release(enemy);
    }

    /// Number of recycled enemies of `kind` waiting for reuse.
    #[must_use]
    pub fn pooled(&self, kind: EnemyKind) -> usize {
        self.pools.get(&kind).map_or(0, ObjectPool::available)
    }
}

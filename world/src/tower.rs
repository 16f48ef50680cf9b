//! Tower entity: targeting, attack cadence and upgrades.

use std::{cmp::Ordering, sync::Arc};

use dam_defense_config::TowerConfig;
use dam_defense_core::{
    geometry, AttackPhase, EnemyId, Position, SlotId, TowerFamily, TowerIdentity, TowerLevel,
    FIRING_PHASE_DURATION, MIN_TOWER_ATTACK_SPEED, RANGE_UNIT,
};

use crate::Enemy;

/// A tower standing on a map slot.
#[derive(Clone, Debug)]
pub struct Tower {
    slot: SlotId,
    position: Position,
    config: Arc<TowerConfig>,
    level: TowerLevel,
    total_cost: u32,
    last_attack_time: Option<f32>,
    attack_phase: AttackPhase,
    attack_speed_debuff: f32,
}

impl Tower {
    /// Builds a base tower; its total cost starts at the base cost.
    #[must_use]
    pub fn new(slot: SlotId, position: Position, config: Arc<TowerConfig>) -> Self {
        Self {
            slot,
            position,
            level: config.identity.level(),
            total_cost: config.cost,
            config,
            last_attack_time: None,
            attack_phase: AttackPhase::Idle,
            attack_speed_debuff: 0.0,
        }
    }

    /// Slot the tower stands on.
    #[must_use]
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Fixed world position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &TowerConfig {
        &self.config
    }

    /// Identity of the active configuration.
    #[must_use]
    pub fn identity(&self) -> TowerIdentity {
        self.config.identity
    }

    /// Family of the tower.
    #[must_use]
    pub fn family(&self) -> TowerFamily {
        self.config.identity.family()
    }

    /// Upgrade level.
    #[must_use]
    pub fn level(&self) -> TowerLevel {
        self.level
    }

    /// Gold invested so far, base cost plus upgrades.
    #[must_use]
    pub fn total_cost(&self) -> u32 {
        self.total_cost
    }

    /// Visual attack phase.
    #[must_use]
    pub fn attack_phase(&self) -> AttackPhase {
        self.attack_phase
    }

    /// Attack speed removed by nearby aura enemies this tick.
    #[must_use]
    pub fn attack_speed_debuff(&self) -> f32 {
        self.attack_speed_debuff
    }

    /// Replaces the aura debuff computed for this tick.
    pub fn set_attack_speed_debuff(&mut self, debuff: f32) {
        self.attack_speed_debuff = debuff.max(0.0);
    }

    /// Configured attack speed minus debuff, floored at the minimum.
    #[must_use]
    pub fn effective_attack_speed(&self) -> f32 {
        (self.config.attack_speed - self.attack_speed_debuff).max(MIN_TOWER_ATTACK_SPEED)
    }

    /// Reports whether an attack is legal at `now`.
    #[must_use]
    pub fn can_attack(&self, now: f32) -> bool {
        let speed = self.effective_attack_speed();
        if speed <= 0.0 {
            return false;
        }
        self.last_attack_time
            .map_or(true, |last| now - last >= 1.0 / speed)
    }

    /// Stamps an attack at `now` and enters the firing phase.
    pub fn record_attack(&mut self, now: f32) {
        self.last_attack_time = Some(now);
        self.attack_phase = AttackPhase::Firing;
    }

    /// Advances the visual phase: firing, then cooldown, then idle once the
    /// next attack is legal.
    pub fn update_phase(&mut self, now: f32) {
        self.attack_phase = match (self.attack_phase, self.last_attack_time) {
            (AttackPhase::Firing, Some(last)) if now - last >= FIRING_PHASE_DURATION => {
                AttackPhase::Cooldown
            }
            (AttackPhase::Cooldown, _) if self.can_attack(now) => AttackPhase::Idle,
            (phase, _) => phase,
        };
    }

    /// Live enemy within range that is furthest along the path.
    ///
    /// Ties keep the first enemy encountered.
    #[must_use]
    pub fn find_target<'a>(&self, enemies: &'a [Enemy]) -> Option<&'a Enemy> {
        let reach = self.config.range_in_units();
        enemies
            .iter()
            .filter(|enemy| !enemy.is_dead())
            .filter(|enemy| geometry::distance(self.position, enemy.position()) <= reach)
            .fold(None, |best: Option<&Enemy>, enemy| match best {
                Some(current) if enemy.progress() <= current.progress() => Some(current),
                _ => Some(enemy),
            })
    }

    /// Live enemies within the splash radius of `center`, furthest first,
    /// truncated to the target cap.
    #[must_use]
    pub fn find_aoe_targets(&self, enemies: &[Enemy], center: Position) -> Vec<EnemyId> {
        let radius = self.config.aoe_radius.unwrap_or(0.0);
        splash_targets(enemies, center, radius, self.config.max_targets)
    }

    /// Live enemies on the path stretch that ends at `progress` and extends
    /// `span` backwards, furthest first, truncated to the target cap.
    #[must_use]
    pub fn find_line_targets(&self, enemies: &[Enemy], progress: f32, span: f32) -> Vec<EnemyId> {
        let start = progress - span;
        let mut hits: Vec<&Enemy> = enemies
            .iter()
            .filter(|enemy| !enemy.is_dead())
            .filter(|enemy| (start..=progress).contains(&enemy.progress()))
            .collect();
        by_descending_progress(&mut hits);
        self.cap(hits)
    }

    fn cap(&self, hits: Vec<&Enemy>) -> Vec<EnemyId> {
        capped(hits, self.config.max_targets)
    }

    /// Swaps in an upgrade configuration and adds its cost to the total.
    pub fn apply_upgrade(&mut self, config: Arc<TowerConfig>) {
        self.total_cost += config.cost;
        self.level = config.identity.level();
        self.config = config;
    }
}

/// Live enemies within `radius` range units of `center`, furthest along the
/// path first, truncated to `max_targets`.
#[must_use]
pub fn splash_targets(
    enemies: &[Enemy],
    center: Position,
    radius: f32,
    max_targets: Option<u32>,
) -> Vec<EnemyId> {
    let reach = radius * RANGE_UNIT;
    let mut hits: Vec<&Enemy> = enemies
        .iter()
        .filter(|enemy| !enemy.is_dead())
        .filter(|enemy| geometry::distance(center, enemy.position()) <= reach)
        .collect();
    by_descending_progress(&mut hits);
    capped(hits, max_targets)
}

fn capped(hits: Vec<&Enemy>, max_targets: Option<u32>) -> Vec<EnemyId> {
    let limit = max_targets.map_or(usize::MAX, |max| max as usize);
    hits.into_iter().take(limit).map(Enemy::id).collect()
}

fn by_descending_progress(enemies: &mut [&Enemy]) {
    enemies.sort_by(|a, b| {
        b.progress()
            .partial_cmp(&a.progress())
            .unwrap_or(Ordering::Equal)
    });
}

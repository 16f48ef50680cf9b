#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state for Dam Defense.
//!
//! [`GameState`] owns every entity collection. Systems mutate it in a fixed
//! order each tick; adapters only ever read it through [`query`].

use std::collections::BTreeMap;

use dam_defense_config::GameSettings;
use dam_defense_core::{EnemyId, Event, GameSpeed, GameStatus, SlotId, StageId};

pub mod economy;
pub mod enemy;
pub mod projectile;
pub mod soldier;
pub mod tower;

pub use economy::GoldManager;
pub use enemy::{Enemy, EnemyFactory, IdSequence};
pub use projectile::{Flight, Launch, Projectile, Splash};
pub use soldier::{Soldier, SoldierSquad};
pub use tower::{splash_targets, Tower};

/// Aggregate root of a play session.
#[derive(Debug)]
pub struct GameState {
    /// Gold ledger.
    pub gold: GoldManager,
    /// Remaining dam health.
    pub dam_hp: f32,
    /// Maximum dam health.
    pub dam_max_hp: f32,
    /// Stage being played.
    pub stage: StageId,
    /// Zero-based wave index inside the stage.
    pub wave: u32,
    /// Session status.
    pub status: GameStatus,
    /// Status to restore when unpausing.
    pub resume_status: Option<GameStatus>,
    /// Speed multiplier.
    pub speed: GameSpeed,
    /// Towers keyed by slot; at most one per slot.
    pub towers: BTreeMap<SlotId, Tower>,
    /// Live enemies in spawn order.
    pub enemies: Vec<Enemy>,
    /// Projectiles in flight.
    pub projectiles: Vec<Projectile>,
    /// Soldier squads keyed by the owning tower's slot.
    pub squads: BTreeMap<SlotId, SoldierSquad>,
    /// Simulated seconds since the session started.
    pub elapsed: f32,
    /// Pooled enemy factory.
    pub enemy_factory: EnemyFactory,
}

impl GameState {
    /// Creates a session in the menu with the configured starting values.
    #[must_use]
    pub fn new(settings: &GameSettings) -> Self {
        Self {
            gold: GoldManager::new(settings.initial_gold),
            dam_hp: settings.dam_max_hp,
            dam_max_hp: settings.dam_max_hp,
            stage: StageId::new(1),
            wave: 0,
            status: GameStatus::Menu,
            resume_status: None,
            speed: GameSpeed::Normal,
            towers: BTreeMap::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            squads: BTreeMap::new(),
            elapsed: 0.0,
            enemy_factory: EnemyFactory::new(),
        }
    }

    /// Live enemy with the given identifier.
    #[must_use]
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id() == id)
    }

    /// Mutable live enemy with the given identifier.
    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id() == id)
    }

    /// Reports whether ticks advance the simulation.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.status, GameStatus::Preparing | GameStatus::Playing)
    }

    /// Applies the damage dealt to the dam during one tick.
    ///
    /// Emits `DamDamaged`, and `GameOver` once when health reaches zero.
    /// Returns `true` when the dam fell.
    pub fn damage_dam(&mut self, damage: f32, out_events: &mut Vec<Event>) -> bool {
        if damage <= 0.0 || self.status == GameStatus::GameOver {
            return self.status == GameStatus::GameOver;
        }
        self.dam_hp = (self.dam_hp - damage).max(0.0);
        out_events.push(Event::DamDamaged {
            damage,
            remaining_hp: self.dam_hp,
        });
        if self.dam_hp > 0.0 {
            return false;
        }
        tracing::debug!(elapsed = self.elapsed, "dam destroyed");
        self.status = GameStatus::GameOver;
        out_events.push(Event::GameOver);
        true
    }
}

/// Read-only snapshots for presentation layers.
pub mod query {
    use dam_defense_core::{
        AttackPhase, Effect, EnemyId, EnemyKind, EnemyStatus, GameSpeed, GameStatus, Position,
        SlotId, SoldierKey, SoldierStatus, StageId, TowerIdentity, TowerLevel,
    };

    use super::GameState;

    /// Snapshot of an enemy.
    #[derive(Clone, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Identifier.
        pub id: EnemyId,
        /// Kind.
        pub kind: EnemyKind,
        /// World position.
        pub position: Position,
        /// Path progress.
        pub progress: f32,
        /// Current health.
        pub hp: f32,
        /// Maximum health.
        pub max_hp: f32,
        /// Lifecycle state.
        pub status: EnemyStatus,
        /// Active effects for icon overlays.
        pub effects: Vec<Effect>,
        /// Render scale.
        pub size_multiplier: f32,
    }

    /// Snapshot of a tower.
    #[derive(Clone, Debug, PartialEq)]
    pub struct TowerSnapshot {
        /// Slot the tower stands on.
        pub slot: SlotId,
        /// Active identity.
        pub identity: TowerIdentity,
        /// Upgrade level.
        pub level: TowerLevel,
        /// World position.
        pub position: Position,
        /// Visual attack phase.
        pub attack_phase: AttackPhase,
        /// Gold invested.
        pub total_cost: u32,
    }

    /// Snapshot of a soldier.
    #[derive(Clone, Debug, PartialEq)]
    pub struct SoldierSnapshot {
        /// Address of the soldier.
        pub key: SoldierKey,
        /// World position.
        pub position: Position,
        /// Current health.
        pub hp: f32,
        /// Maximum health.
        pub max_hp: f32,
        /// Lifecycle state.
        pub status: SoldierStatus,
    }

    /// Snapshot of a projectile in flight.
    #[derive(Clone, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// World position.
        pub position: Position,
        /// Homing target.
        pub target: Option<EnemyId>,
    }

    /// Heads-up display values.
    #[derive(Clone, Debug, PartialEq)]
    pub struct Hud {
        /// Gold balance.
        pub gold: u32,
        /// Remaining dam health.
        pub dam_hp: f32,
        /// Maximum dam health.
        pub dam_max_hp: f32,
        /// Stage being played.
        pub stage: StageId,
        /// Zero-based wave index.
        pub wave: u32,
        /// Session status.
        pub status: GameStatus,
        /// Speed multiplier.
        pub speed: GameSpeed,
        /// Simulated seconds.
        pub elapsed: f32,
    }

    /// Live enemies in spawn order.
    #[must_use]
    pub fn enemies(state: &GameState) -> Vec<EnemySnapshot> {
        state
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id(),
                kind: enemy.kind(),
                position: enemy.position(),
                progress: enemy.progress(),
                hp: enemy.hp(),
                max_hp: enemy.max_hp(),
                status: enemy.status(),
                effects: enemy.effects().to_vec(),
                size_multiplier: enemy.config().size_multiplier,
            })
            .collect()
    }

    /// Towers in slot order.
    #[must_use]
    pub fn towers(state: &GameState) -> Vec<TowerSnapshot> {
        state
            .towers
            .values()
            .map(|tower| TowerSnapshot {
                slot: tower.slot(),
                identity: tower.identity(),
                level: tower.level(),
                position: tower.position(),
                attack_phase: tower.attack_phase(),
                total_cost: tower.total_cost(),
            })
            .collect()
    }

    /// Soldiers of every squad in slot then index order.
    #[must_use]
    pub fn soldiers(state: &GameState) -> Vec<SoldierSnapshot> {
        state
            .squads
            .values()
            .flat_map(|squad| squad.soldiers())
            .map(|soldier| SoldierSnapshot {
                key: soldier.key(),
                position: soldier.position(),
                hp: soldier.hp(),
                max_hp: soldier.max_hp(),
                status: soldier.status(),
            })
            .collect()
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(state: &GameState) -> Vec<ProjectileSnapshot> {
        state
            .projectiles
            .iter()
            .filter(|projectile| projectile.is_active())
            .map(|projectile| ProjectileSnapshot {
                position: projectile.position(),
                target: projectile.target(),
            })
            .collect()
    }

    /// Remaining dam health as a fraction of its maximum.
    #[must_use]
    pub fn dam_ratio(state: &GameState) -> f32 {
        state.dam_hp / state.dam_max_hp.max(1.0)
    }

    /// Heads-up display values.
    #[must_use]
    pub fn hud(state: &GameState) -> Hud {
        Hud {
            gold: state.gold.balance(),
            dam_hp: state.dam_hp,
            dam_max_hp: state.dam_max_hp,
            stage: state.stage,
            wave: state.wave,
            status: state.status,
            speed: state.speed,
            elapsed: state.elapsed,
        }
    }
}

//! Soldiers summoned by barracks towers and the squads that own them.

use std::f32::consts::TAU;

use dam_defense_config::{SoldierProfile, StunAura};
use dam_defense_core::{
    geometry, EnemyId, Position, SlotId, SoldierKey, SoldierStatus, TowerIdentity,
    SOLDIER_ARRIVAL_DISTANCE, SOLDIER_MOVE_SPEED,
};

/// Distance between a squad member's post and the squad rally point.
pub const SQUAD_SPREAD: f32 = 14.0;

/// A melee unit that blocks one enemy at a time.
#[derive(Clone, Debug, PartialEq)]
pub struct Soldier {
    key: SoldierKey,
    profile: SoldierProfile,
    hp: f32,
    position: Position,
    spawn_point: Position,
    rally_point: Position,
    status: SoldierStatus,
    target: Option<EnemyId>,
    attack_cooldown: f32,
    respawn_timer: f32,
    stun_cooldown: f32,
}

impl Soldier {
    /// Creates a soldier at `spawn_point` walking toward `rally_point`.
    #[must_use]
    pub fn new(
        key: SoldierKey,
        profile: &SoldierProfile,
        spawn_point: Position,
        rally_point: Position,
    ) -> Self {
        Self {
            key,
            hp: profile.hp,
            stun_cooldown: profile.stun_aura.map_or(0.0, |aura| aura.cooldown),
            profile: profile.clone(),
            position: spawn_point,
            spawn_point,
            rally_point,
            status: SoldierStatus::MovingToRally,
            target: None,
            attack_cooldown: 0.0,
            respawn_timer: 0.0,
        }
    }

    /// Address of the soldier.
    #[must_use]
    pub fn key(&self) -> SoldierKey {
        self.key
    }

    /// Combat profile.
    #[must_use]
    pub fn profile(&self) -> &SoldierProfile {
        &self.profile
    }

    /// Current health.
    #[must_use]
    pub fn hp(&self) -> f32 {
        self.hp
    }

    /// Maximum health.
    #[must_use]
    pub fn max_hp(&self) -> f32 {
        self.profile.hp
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Post the soldier returns to.
    #[must_use]
    pub fn rally_point(&self) -> Position {
        self.rally_point
    }

    /// Lifecycle state.
    #[must_use]
    pub fn status(&self) -> SoldierStatus {
        self.status
    }

    /// Enemy being blocked.
    #[must_use]
    pub fn target(&self) -> Option<EnemyId> {
        self.target
    }

    /// Seconds until revival while dead.
    #[must_use]
    pub fn respawn_timer(&self) -> f32 {
        self.respawn_timer
    }

    /// Stun aura carried by the soldier.
    #[must_use]
    pub fn stun_aura(&self) -> Option<StunAura> {
        self.profile.stun_aura
    }

    /// Moves the post; idle soldiers walk to it.
    pub fn set_rally_point(&mut self, point: Position) {
        self.rally_point = point;
        if self.status == SoldierStatus::Idle {
            self.status = SoldierStatus::MovingToRally;
        }
    }

    /// Walks toward the rally point and becomes idle on arrival.
    pub fn walk(&mut self, dt: f32) {
        if self.status != SoldierStatus::MovingToRally {
            return;
        }
        self.position = geometry::step_toward(self.position, self.rally_point, SOLDIER_MOVE_SPEED * dt);
        if geometry::distance(self.position, self.rally_point) <= SOLDIER_ARRIVAL_DISTANCE {
            self.status = SoldierStatus::Idle;
        }
    }

    /// Starts blocking `enemy`; the first blow lands immediately.
    pub fn engage(&mut self, enemy: EnemyId) {
        self.status = SoldierStatus::Engaging;
        self.target = Some(enemy);
        self.attack_cooldown = 0.0;
    }

    /// Drops the current target and heads back to the post.
    pub fn disengage(&mut self) -> Option<EnemyId> {
        let target = self.target.take();
        if self.status == SoldierStatus::Engaging {
            self.status = SoldierStatus::MovingToRally;
        }
        target
    }

    /// Runs the attack cooldown; returns `true` when a blow lands.
    pub fn strike(&mut self, dt: f32) -> bool {
        if self.profile.attack_speed <= 0.0 {
            return false;
        }
        self.attack_cooldown -= dt;
        if self.attack_cooldown > 0.0 {
            return false;
        }
        self.attack_cooldown += 1.0 / self.profile.attack_speed;
        true
    }

    /// Takes damage; returns `true` when the blow kills the soldier, which
    /// also drops its target.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.status == SoldierStatus::Dead {
            return false;
        }
        self.hp = (self.hp - amount.max(0.0)).max(0.0);
        if self.hp > 0.0 {
            return false;
        }
        self.status = SoldierStatus::Dead;
        self.respawn_timer = self.profile.respawn_time;
        self.target = None;
        true
    }

    /// Counts down the respawn timer; returns `true` on revival.
    pub fn tick_respawn(&mut self, dt: f32) -> bool {
        if self.status != SoldierStatus::Dead {
            return false;
        }
        self.respawn_timer = (self.respawn_timer - dt).max(0.0);
        if self.respawn_timer > 0.0 || self.hp > 0.0 {
            return false;
        }
        self.hp = self.profile.hp;
        self.position = self.spawn_point;
        self.status = SoldierStatus::MovingToRally;
        self.attack_cooldown = 0.0;
        true
    }

    /// Runs the stun aura cooldown; returns `true` when a pulse fires.
    pub fn pulse(&mut self, dt: f32) -> bool {
        let Some(aura) = self.profile.stun_aura else {
            return false;
        };
        if self.status == SoldierStatus::Dead {
            return false;
        }
        self.stun_cooldown -= dt;
        if self.stun_cooldown > 0.0 {
            return false;
        }
        self.stun_cooldown += aura.cooldown;
        true
    }
}

/// Fixed-size group of soldiers owned by one tower slot.
#[derive(Clone, Debug, PartialEq)]
pub struct SoldierSquad {
    slot: SlotId,
    signature: TowerIdentity,
    rally_point: Position,
    soldiers: Vec<Soldier>,
}

impl SoldierSquad {
    /// Summons a squad at `spawn_point` posted around `rally_point`.
    #[must_use]
    pub fn new(
        slot: SlotId,
        signature: TowerIdentity,
        profile: &SoldierProfile,
        spawn_point: Position,
        rally_point: Position,
    ) -> Self {
        let count = profile.count as usize;
        let soldiers = (0..count)
            .map(|index| {
                Soldier::new(
                    SoldierKey { slot, index },
                    profile,
                    spawn_point,
                    rally_point + post_offset(index, count),
                )
            })
            .collect();
        Self {
            slot,
            signature,
            rally_point,
            soldiers,
        }
    }

    /// Owning slot.
    #[must_use]
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Identity of the tower that summoned the squad.
    #[must_use]
    pub fn signature(&self) -> TowerIdentity {
        self.signature
    }

    /// Shared rally point.
    #[must_use]
    pub fn rally_point(&self) -> Position {
        self.rally_point
    }

    /// Members in index order.
    #[must_use]
    pub fn soldiers(&self) -> &[Soldier] {
        &self.soldiers
    }

    /// Mutable members in index order.
    pub fn soldiers_mut(&mut self) -> &mut [Soldier] {
        &mut self.soldiers
    }

    /// Moves the squad's rally point, keeping each member's offset.
    pub fn set_rally_point(&mut self, point: Position) {
        self.rally_point = point;
        let count = self.soldiers.len();
        for (index, soldier) in self.soldiers.iter_mut().enumerate() {
            soldier.set_rally_point(point + post_offset(index, count));
        }
    }

    /// Enemies currently blocked by the squad.
    pub fn blocked_enemies(&self) -> impl Iterator<Item = EnemyId> + '_ {
        self.soldiers.iter().filter_map(Soldier::target)
    }
}

fn post_offset(index: usize, count: usize) -> Position {
    if count <= 1 {
        return Position::ZERO;
    }
    let angle = TAU * index as f32 / count as f32;
    Position::new(angle.cos(), angle.sin()) * SQUAD_SPREAD
}

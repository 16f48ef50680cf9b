#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dam Defense simulation.
//!
//! This crate defines the vocabulary that connects adapters, the authoritative
//! game state, and the per-concern systems. Adapters submit [`Command`] values
//! describing desired mutations, the simulation executes them against the
//! systems, and every state change worth presenting is announced as an
//! [`Event`] through the [`EventBus`]. Expected player mistakes surface as a
//! [`Verdict::Rejected`], while caller bugs surface as a [`SimulationError`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod bus;
pub mod geometry;
pub mod pool;

pub use bus::{BusHandle, EventBus, Listen, SubscriptionId};
pub use glam::Vec2;
pub use pool::{ObjectPool, Poolable};

/// Plain 2D point measured in world units.
pub type Position = Vec2;

/// Number of world units spanned by one unit of configured range.
pub const RANGE_UNIT: f32 = 40.0;
/// World units travelled per second by one unit of configured enemy speed.
pub const DISTANCE_PER_SPEED_UNIT: f32 = 40.0;
/// Travel speed of tower projectiles in world units per second.
pub const PROJECTILE_SPEED: f32 = 420.0;
/// Distance at which a homing projectile counts as having reached its target.
pub const PROJECTILE_HIT_DISTANCE: f32 = 5.0;
/// Travel speed of soldiers walking toward their rally point.
pub const SOLDIER_MOVE_SPEED: f32 = 90.0;
/// Distance at which a soldier counts as having arrived at its rally point.
pub const SOLDIER_ARRIVAL_DISTANCE: f32 = 2.0;
/// Engagement radius around a rally point, expressed in range units.
pub const SOLDIER_ENGAGE_RANGE: f32 = 1.5;
/// Delay applied to the first spawn of any boss type within a wave.
pub const BOSS_FIRST_SPAWN_DELAY: f32 = 3.0;
/// Share of a tower's cumulative cost returned when it is sold.
pub const REFUND_RATIO: f32 = 0.5;
/// Time a tower stays in [`AttackPhase::Firing`] after releasing an attack.
pub const FIRING_PHASE_DURATION: f32 = 0.15;
/// Half of the opening angle of cone attacks, in radians.
pub const CONE_HALF_ANGLE: f32 = std::f32::consts::FRAC_PI_6;
/// Portion of a movement slow that also applies to enemy attack speed.
pub const SLOW_ATTACK_SPEED_FACTOR: f32 = 2.0 / 3.0;
/// Lower bound applied to a tower's effective attack speed.
pub const MIN_TOWER_ATTACK_SPEED: f32 = 0.1;
/// Number of waves that make up every stage.
pub const WAVES_PER_STAGE: u32 = 3;

/// Damage channel of an attack, deciding which defence stat mitigates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttackType {
    /// Mitigated by the defender's `def`.
    Physical,
    /// Mitigated by the defender's `mdef`.
    Magic,
}

/// Shape of a tower's attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetMode {
    /// Homing projectile damaging only the primary target.
    Single,
    /// Homing projectile splashing around the primary target on impact.
    Aoe,
    /// Instant strike along the path behind the primary target.
    Line,
    /// Continuous channel hitting everything inside a cone.
    Cone,
}

/// Status effects that can be attached to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectKind {
    /// Reduces movement speed multiplicatively by `value`.
    Slow,
    /// Freezes every per-tick behaviour of the enemy.
    Stun,
    /// Deals `value` true damage per second.
    Poison,
    /// Deals `value` true damage per second.
    Burn,
    /// Reduces attack speed multiplicatively by `value`.
    AttackSpeedDebuff,
}

/// Timed status effect carried by an enemy or a projectile payload.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    /// Kind of effect.
    #[serde(rename = "type")]
    pub kind: EffectKind,
    /// Remaining lifetime in seconds.
    pub duration: f32,
    /// Magnitude, interpreted per [`EffectKind`].
    pub value: f32,
    /// Whether damage from this effect bypasses defences.
    #[serde(default)]
    pub ignores_armor: bool,
}

impl Effect {
    /// Creates a new effect descriptor.
    #[must_use]
    pub const fn new(kind: EffectKind, duration: f32, value: f32) -> Self {
        Self {
            kind,
            duration,
            value,
            ignores_armor: false,
        }
    }
}

/// Base tower families that can be placed on an empty slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TowerFamily {
    /// Fast single-target physical shooter.
    Agile,
    /// Barracks that summons a squad of soldiers.
    Brave,
    /// Slow physical artillery with splash damage.
    Capable,
    /// Magic single-target caster.
    Smart,
}

impl TowerFamily {
    /// Every family in table order.
    pub const ALL: [TowerFamily; 4] = [Self::Agile, Self::Brave, Self::Capable, Self::Smart];

    /// Identifier used by the static tower table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Agile => "agile",
            Self::Brave => "brave",
            Self::Capable => "capable",
            Self::Smart => "smart",
        }
    }
}

impl FromStr for TowerFamily {
    type Err = UnknownIdentifier;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.as_str() == value)
            .ok_or_else(|| UnknownIdentifier(value.to_owned()))
    }
}

/// Upgrade branches; every branch belongs to exactly one base family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeKind {
    /// Agile branch applying poison.
    Blowgunner,
    /// Agile branch striking along the path.
    LogRoller,
    /// Brave branch with sturdier soldiers.
    Barbarian,
    /// Brave branch whose soldiers periodically stun.
    Suit,
    /// Capable branch with slowing splash.
    WaterBomber,
    /// Capable branch channelling a burning cone.
    DragonTamer,
    /// Smart branch hitting several enemies at once.
    Wizard,
    /// Smart branch channelling a slowing cone.
    IceMage,
}

impl UpgradeKind {
    /// Every upgrade branch in table order.
    pub const ALL: [UpgradeKind; 8] = [
        Self::Blowgunner,
        Self::LogRoller,
        Self::Barbarian,
        Self::Suit,
        Self::WaterBomber,
        Self::DragonTamer,
        Self::Wizard,
        Self::IceMage,
    ];

    /// Base family this branch upgrades from.
    #[must_use]
    pub const fn base_family(self) -> TowerFamily {
        match self {
            Self::Blowgunner | Self::LogRoller => TowerFamily::Agile,
            Self::Barbarian | Self::Suit => TowerFamily::Brave,
            Self::WaterBomber | Self::DragonTamer => TowerFamily::Capable,
            Self::Wizard | Self::IceMage => TowerFamily::Smart,
        }
    }

    /// Identifier used by the static tower table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blowgunner => "blowgunner",
            Self::LogRoller => "logRoller",
            Self::Barbarian => "barbarian",
            Self::Suit => "suit",
            Self::WaterBomber => "waterBomber",
            Self::DragonTamer => "dragonTamer",
            Self::Wizard => "wizard",
            Self::IceMage => "iceMage",
        }
    }
}

impl FromStr for UpgradeKind {
    type Err = UnknownIdentifier;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownIdentifier(value.to_owned()))
    }
}

/// Resolved identity of a tower configuration row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerIdentity {
    /// Unupgraded tower of the given family.
    Base(TowerFamily),
    /// Upgraded tower together with the family it grew from.
    Upgrade {
        /// Branch that was applied.
        kind: UpgradeKind,
        /// Family the branch belongs to.
        base: TowerFamily,
    },
}

impl TowerIdentity {
    /// Builds the identity of an upgrade branch.
    #[must_use]
    pub const fn upgrade(kind: UpgradeKind) -> Self {
        Self::Upgrade {
            kind,
            base: kind.base_family(),
        }
    }

    /// Family the tower belongs to, regardless of upgrade state.
    #[must_use]
    pub const fn family(self) -> TowerFamily {
        match self {
            Self::Base(family) => family,
            Self::Upgrade { base, .. } => base,
        }
    }

    /// Level tag derived from the identity.
    #[must_use]
    pub const fn level(self) -> TowerLevel {
        match self {
            Self::Base(_) => TowerLevel::Base,
            Self::Upgrade { kind, .. } => TowerLevel::Upgraded(kind),
        }
    }

    /// Identifier used by the static tower table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base(family) => family.as_str(),
            Self::Upgrade { kind, .. } => kind.as_str(),
        }
    }
}

impl fmt::Display for TowerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upgrade level of a placed tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerLevel {
    /// No upgrade applied yet.
    Base,
    /// The given branch has been applied; no further upgrades exist.
    Upgraded(UpgradeKind),
}

/// Enemy types available to wave scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnemyKind {
    /// Weak, fast swarm enemy.
    Rat,
    /// Weak enemy with light armour.
    Frog,
    /// Mid-tier gnawer.
    Beaver,
    /// Mid-tier charger.
    Boar,
    /// Heavily armoured enemy.
    ArmoredCrab,
    /// Strong enemy whose aura slows nearby towers.
    Anaconda,
    /// Strong enemy resistant to magic.
    GhostEel,
    /// Boss.
    RiverTroll,
    /// Final boss with a tower-slowing aura.
    CrocodileKing,
}

impl EnemyKind {
    /// Every enemy kind in table order.
    pub const ALL: [EnemyKind; 9] = [
        Self::Rat,
        Self::Frog,
        Self::Beaver,
        Self::Boar,
        Self::ArmoredCrab,
        Self::Anaconda,
        Self::GhostEel,
        Self::RiverTroll,
        Self::CrocodileKing,
    ];

    /// Identifier used by the static enemy table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rat => "rat",
            Self::Frog => "frog",
            Self::Beaver => "beaver",
            Self::Boar => "boar",
            Self::ArmoredCrab => "armoredCrab",
            Self::Anaconda => "anaconda",
            Self::GhostEel => "ghostEel",
            Self::RiverTroll => "riverTroll",
            Self::CrocodileKing => "crocodileKing",
        }
    }
}

/// Strength bracket used to order a wave's spawn plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnemyCategory {
    /// Spawned first.
    Weak,
    /// Spawned after the weak enemies.
    Mid,
    /// Spawned after the mid enemies.
    Strong,
    /// Spawned last.
    Boss,
}

/// Error produced when a textual identifier matches no known variant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown identifier `{0}`")]
pub struct UnknownIdentifier(pub String);

/// Unique identifier of an enemy instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId {
    kind: EnemyKind,
    sequence: u64,
}

impl EnemyId {
    /// Creates an identifier from a kind and sequence number.
    #[must_use]
    pub const fn new(kind: EnemyKind, sequence: u64) -> Self {
        Self { kind, sequence }
    }

    /// Enemy kind encoded in the identifier.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Monotonic sequence number encoded in the identifier.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.as_str(), self.sequence)
    }
}

/// Identifier of a fixed tower slot on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(u32);

impl SlotId {
    /// Creates a new slot identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One-based stage number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(u32);

impl StageId {
    /// Creates a new stage identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Identifier of the following stage.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Address of a soldier inside the squad owned by a tower slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoldierKey {
    /// Slot of the tower owning the squad.
    pub slot: SlotId,
    /// Index of the soldier within its squad.
    pub index: usize,
}

/// Lifecycle state of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyStatus {
    /// Advancing along the path.
    Moving,
    /// Held in place by a soldier.
    Blocked,
    /// Reached the dam and is damaging it.
    AttackingDam,
    /// Terminal.
    Dead,
}

/// Visual attack phase of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttackPhase {
    /// Ready and waiting for a target.
    Idle,
    /// Just released an attack.
    Firing,
    /// Waiting for the attack interval to elapse.
    Cooldown,
}

/// Lifecycle state of a soldier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoldierStatus {
    /// Standing at the rally point, scanning for enemies.
    Idle,
    /// Walking toward the rally point.
    MovingToRally,
    /// Blocking and fighting an enemy.
    Engaging,
    /// Waiting to respawn.
    Dead,
}

/// Top-level state of a play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// No session started yet.
    Menu,
    /// Between waves.
    Preparing,
    /// A wave is running.
    Playing,
    /// Frozen by the player.
    Paused,
    /// The dam fell.
    GameOver,
    /// Every stage was cleared.
    Victory,
}

/// Simulation speed multiplier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameSpeed {
    /// Real time.
    #[default]
    Normal,
    /// Twice real time.
    Double,
}

impl GameSpeed {
    /// Factor applied to frame time before it reaches the simulation.
    #[must_use]
    pub const fn multiplier(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Double => 2.0,
        }
    }

    /// The other speed.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Double,
            Self::Double => Self::Normal,
        }
    }
}

/// State of the wave currently being fought.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaveState {
    /// Waiting for the player to start the next wave.
    Preparing,
    /// Enemies are still being spawned.
    Spawning,
    /// Every enemy was spawned; some are still alive.
    InProgress,
    /// Every spawned enemy is gone.
    Cleared,
}

/// Commands that express every permissible mutation requested by adapters.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Places a base tower of the given family on an empty slot.
    PlaceTower {
        /// Slot receiving the tower.
        slot: SlotId,
        /// Family of the tower to build.
        family: TowerFamily,
    },
    /// Sells the tower standing on the slot.
    SellTower {
        /// Slot holding the tower.
        slot: SlotId,
    },
    /// Applies an upgrade branch to the tower standing on the slot.
    UpgradeTower {
        /// Slot holding the tower.
        slot: SlotId,
        /// Branch to apply.
        upgrade: UpgradeKind,
    },
    /// Starts the next scripted wave.
    StartNextWave,
    /// Switches between normal and double speed.
    ToggleSpeed,
    /// Pauses or resumes the simulation.
    TogglePause,
    /// Moves the rally point of the squad owned by the slot's tower.
    SetRallyPoint {
        /// Slot holding the summoning tower.
        slot: SlotId,
        /// New rally point in world units.
        point: Position,
    },
    /// Debug-only operations.
    Debug(DebugCommand),
}

/// Debug-only commands used by tooling and tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DebugCommand {
    /// Credits gold to the ledger.
    GrantGold {
        /// Amount to credit.
        amount: u32,
    },
    /// Restores the dam to full health.
    ResetDamHp,
    /// Kills every live enemy; rewards flow through the regular sweep.
    KillAllEnemies,
    /// Forces a specific speed multiplier.
    ForceSpeed {
        /// Speed to apply.
        speed: GameSpeed,
    },
    /// Clears the running wave without rewards.
    SkipWave,
    /// Clears the remainder of the current stage without rewards.
    SkipStage,
}

/// Events broadcast by the simulation after state changes.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The gold balance changed.
    GoldChanged {
        /// Signed change; negative for spending.
        amount: i64,
        /// Balance after the change.
        total: u32,
    },
    /// An enemy died and paid out its bounty.
    EnemyKilled {
        /// Identifier of the dead enemy.
        enemy: EnemyId,
        /// Gold credited for the kill.
        gold_earned: u32,
    },
    /// A tower was placed.
    TowerPlaced {
        /// Slot receiving the tower.
        slot: SlotId,
        /// Identity of the new tower.
        tower: TowerIdentity,
        /// Gold debited.
        cost: u32,
    },
    /// A tower was sold.
    TowerSold {
        /// Slot that held the tower.
        slot: SlotId,
        /// Identity of the sold tower.
        tower: TowerIdentity,
        /// Gold credited.
        refund: u32,
    },
    /// A tower was upgraded.
    TowerUpgraded {
        /// Slot holding the tower.
        slot: SlotId,
        /// Branch applied.
        upgrade: UpgradeKind,
        /// Gold debited.
        cost: u32,
    },
    /// A wave started spawning.
    WaveStart {
        /// Stage the wave belongs to.
        stage: StageId,
        /// Zero-based wave index inside the stage.
        wave: u32,
    },
    /// A wave was cleared.
    WaveEnd {
        /// Stage the wave belongs to.
        stage: StageId,
        /// Zero-based wave index inside the stage.
        wave: u32,
    },
    /// A stage started.
    StageStart {
        /// Stage that started.
        stage: StageId,
    },
    /// A stage ended.
    StageEnd {
        /// Stage that ended.
        stage: StageId,
    },
    /// The dam took damage during a tick.
    DamDamaged {
        /// Damage dealt during the tick.
        damage: f32,
        /// Dam health after the damage.
        remaining_hp: f32,
    },
    /// The dam fell.
    GameOver,
    /// The final stage was cleared.
    Victory {
        /// Final score in `0..=100`.
        score: u32,
        /// Star rating in `1..=3`.
        stars: u8,
    },
}

impl Event {
    /// Discriminant used for subscriptions.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::GoldChanged { .. } => EventKind::GoldChanged,
            Self::EnemyKilled { .. } => EventKind::EnemyKilled,
            Self::TowerPlaced { .. } => EventKind::TowerPlaced,
            Self::TowerSold { .. } => EventKind::TowerSold,
            Self::TowerUpgraded { .. } => EventKind::TowerUpgraded,
            Self::WaveStart { .. } => EventKind::WaveStart,
            Self::WaveEnd { .. } => EventKind::WaveEnd,
            Self::StageStart { .. } => EventKind::StageStart,
            Self::StageEnd { .. } => EventKind::StageEnd,
            Self::DamDamaged { .. } => EventKind::DamDamaged,
            Self::GameOver => EventKind::GameOver,
            Self::Victory { .. } => EventKind::Victory,
        }
    }
}

/// Payload-free discriminant of [`Event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// See [`Event::GoldChanged`].
    GoldChanged,
    /// See [`Event::EnemyKilled`].
    EnemyKilled,
    /// See [`Event::TowerPlaced`].
    TowerPlaced,
    /// See [`Event::TowerSold`].
    TowerSold,
    /// See [`Event::TowerUpgraded`].
    TowerUpgraded,
    /// See [`Event::WaveStart`].
    WaveStart,
    /// See [`Event::WaveEnd`].
    WaveEnd,
    /// See [`Event::StageStart`].
    StageStart,
    /// See [`Event::StageEnd`].
    StageEnd,
    /// See [`Event::DamDamaged`].
    DamDamaged,
    /// See [`Event::GameOver`].
    GameOver,
    /// See [`Event::Victory`].
    Victory,
}

impl EventKind {
    /// Every event kind.
    pub const ALL: [EventKind; 12] = [
        Self::GoldChanged,
        Self::EnemyKilled,
        Self::TowerPlaced,
        Self::TowerSold,
        Self::TowerUpgraded,
        Self::WaveStart,
        Self::WaveEnd,
        Self::StageStart,
        Self::StageEnd,
        Self::DamDamaged,
        Self::GameOver,
        Self::Victory,
    ];
}

/// Reasons an otherwise well-formed command may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    /// The slot already holds a tower.
    SlotOccupied,
    /// The ledger cannot cover the cost.
    InsufficientGold,
    /// The slot holds no tower.
    NoTower,
    /// The tower already carries an upgrade.
    AlreadyUpgraded,
    /// The branch is not available to the tower's family.
    UpgradeUnavailable,
    /// The tower does not summon soldiers.
    NotSummoner,
    /// The wave system is not waiting for a new wave.
    WaveNotReady,
    /// The command does not apply in the current game status.
    InvalidStatus,
}

/// Outcome of a command that did not hit a programmer error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The command mutated state.
    Applied,
    /// The command was refused without mutating state.
    Rejected(Rejection),
}

impl Verdict {
    /// Reports whether the command mutated state.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

impl From<Result<(), Rejection>> for Verdict {
    fn from(result: Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Self::Applied,
            Err(rejection) => Self::Rejected(rejection),
        }
    }
}

/// Caller bugs that can never legitimately occur with config-driven call sites.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    /// The map defines no slot with the given identifier.
    #[error("slot {0:?} does not exist on the map")]
    UnknownSlot(SlotId),
    /// The catalog holds no configuration for the tower identity.
    #[error("no tower configuration for `{0}`")]
    UnknownTower(TowerIdentity),
    /// The catalog holds no configuration for the enemy kind.
    #[error("no enemy configuration for `{}`", .0.as_str())]
    UnknownEnemy(EnemyKind),
    /// The catalog holds no configuration for the stage.
    #[error("no stage configuration for stage {}", .0.get())]
    UnknownStage(StageId),
}

/// Computes mitigated hit damage, never below one.
///
/// Physical hits are reduced by `def`, everything else by `mdef`.
#[must_use]
pub fn calculate_damage(amount: f32, attack_type: AttackType, def: f32, mdef: f32) -> f32 {
    let mitigation = match attack_type {
        AttackType::Physical => def,
        AttackType::Magic => mdef,
    };
    (amount - mitigation).max(1.0)
}

/// Computes unmitigated damage, never below zero.
#[must_use]
pub fn true_damage(amount: f32) -> f32 {
    amount.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_damage_uses_def() {
        assert_eq!(calculate_damage(20.0, AttackType::Physical, 5.0, 50.0), 15.0);
    }

    #[test]
    fn magic_damage_uses_mdef() {
        assert_eq!(calculate_damage(20.0, AttackType::Magic, 50.0, 8.0), 12.0);
    }

    #[test]
    fn mitigated_damage_never_drops_below_one() {
        assert_eq!(calculate_damage(3.0, AttackType::Physical, 40.0, 0.0), 1.0);
        assert_eq!(calculate_damage(0.0, AttackType::Magic, 0.0, 0.0), 1.0);
    }

    #[test]
    fn true_damage_floors_at_zero() {
        assert_eq!(true_damage(-4.0), 0.0);
        assert_eq!(true_damage(2.5), 2.5);
    }

    #[test]
    fn upgrade_identity_carries_its_family() {
        let identity = TowerIdentity::upgrade(UpgradeKind::DragonTamer);
        assert_eq!(identity.family(), TowerFamily::Capable);
        assert_eq!(
            identity.level(),
            TowerLevel::Upgraded(UpgradeKind::DragonTamer)
        );
        assert_eq!(identity.as_str(), "dragonTamer");
    }

    #[test]
    fn identifiers_parse_from_table_names() {
        assert_eq!("smart".parse::<TowerFamily>(), Ok(TowerFamily::Smart));
        assert_eq!("logRoller".parse::<UpgradeKind>(), Ok(UpgradeKind::LogRoller));
        assert_eq!(
            "knight".parse::<UpgradeKind>(),
            Err(UnknownIdentifier("knight".to_owned()))
        );
    }

    #[test]
    fn every_family_has_one_or_two_branches() {
        for family in TowerFamily::ALL {
            let branches = UpgradeKind::ALL
                .iter()
                .filter(|kind| kind.base_family() == family)
                .count();
            assert!((1..=2).contains(&branches), "{family:?} has {branches}");
        }
    }

    #[test]
    fn enemy_id_renders_kind_and_sequence() {
        assert_eq!(EnemyId::new(EnemyKind::ArmoredCrab, 7).to_string(), "armoredCrab-7");
    }

    #[test]
    fn speed_toggles_between_multipliers() {
        assert_eq!(GameSpeed::Normal.toggled(), GameSpeed::Double);
        assert_eq!(GameSpeed::Double.toggled().multiplier(), 1.0);
    }

    #[test]
    fn verdict_converts_from_result() {
        assert!(Verdict::from(Ok(())).is_applied());
        assert_eq!(
            Verdict::from(Err(Rejection::NoTower)),
            Verdict::Rejected(Rejection::NoTower)
        );
    }

    proptest::proptest! {
        #[test]
        fn mitigated_damage_is_at_least_one(
            amount in -100.0f32..1000.0,
            def in 0.0f32..200.0,
            mdef in 0.0f32..200.0,
        ) {
            for attack_type in [AttackType::Physical, AttackType::Magic] {
                let damage = calculate_damage(amount, attack_type, def, mdef);
                proptest::prop_assert!(damage >= 1.0);
                proptest::prop_assert!(damage <= amount.max(1.0));
            }
        }
    }
}

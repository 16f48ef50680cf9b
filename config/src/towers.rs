//! Tower table schema and validation.

use std::{collections::BTreeMap, sync::Arc};

use dam_defense_core::{
    AttackType, Effect, TargetMode, TowerFamily, TowerIdentity, UpgradeKind, RANGE_UNIT,
};
use serde::Deserialize;

use crate::{parse_table, require_non_negative, require_positive, ConfigError, Table, TOWER_ROWS};

/// Special behaviour attached to a tower row.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", deny_unknown_fields)]
pub enum TowerSpecial {
    /// Every hit applies the effect.
    Effect {
        /// Effect applied on hit.
        effect: Effect,
    },
    /// The tower keeps a squad of soldiers on the path.
    Summon {
        /// Squad profile.
        soldiers: SoldierProfile,
    },
}

/// Stats of the soldiers summoned by a barracks tower.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SoldierProfile {
    /// Number of soldiers in the squad.
    pub count: u32,
    /// Maximum health.
    pub hp: f32,
    /// Damage per hit.
    pub atk: f32,
    /// Hits per second.
    pub attack_speed: f32,
    /// Physical defence.
    pub def: f32,
    /// Magic defence.
    pub mdef: f32,
    /// Seconds between death and revival.
    pub respawn_time: f32,
    /// Periodic area stun, if the squad carries one.
    #[serde(default)]
    pub stun_aura: Option<StunAura>,
}

/// Periodic stun emitted around each soldier of a squad.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StunAura {
    /// Seconds between pulses.
    pub cooldown: f32,
    /// Stun duration applied per pulse.
    pub duration: f32,
    /// Pulse radius in range units.
    pub radius: f32,
}

/// Validated configuration of one tower level.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerConfig {
    /// Resolved identity of the row.
    pub identity: TowerIdentity,
    /// 1 for base towers, 2 for upgrades.
    pub tier: u8,
    /// Gold needed to build (base) or apply (upgrade).
    pub cost: u32,
    /// Damage channel.
    pub attack_type: AttackType,
    /// Damage per hit, or per second of channelling for cone towers.
    pub atk: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Targeting radius in range units.
    pub range: f32,
    /// Attack shape.
    pub target_mode: TargetMode,
    /// Upper bound on enemies hit by area attacks.
    pub max_targets: Option<u32>,
    /// Splash radius (aoe) or strike length (line) in range units.
    pub aoe_radius: Option<f32>,
    /// Optional special behaviour.
    pub special: Option<TowerSpecial>,
}

impl TowerConfig {
    /// Targeting radius in world units.
    #[must_use]
    pub fn range_in_units(&self) -> f32 {
        self.range * RANGE_UNIT
    }

    /// Effect applied on hit, if any.
    #[must_use]
    pub fn effect(&self) -> Option<Effect> {
        match &self.special {
            Some(TowerSpecial::Effect { effect }) => Some(*effect),
            _ => None,
        }
    }

    /// Soldier profile, if the tower summons a squad.
    #[must_use]
    pub fn soldiers(&self) -> Option<&SoldierProfile> {
        match &self.special {
            Some(TowerSpecial::Summon { soldiers }) => Some(soldiers),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum TowerRole {
    Base,
    Upgrade,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct TowerRow {
    id: String,
    family: TowerFamily,
    role: TowerRole,
    tier: u8,
    cost: u32,
    attack_type: AttackType,
    atk: f32,
    attack_speed: f32,
    range: f32,
    target_mode: TargetMode,
    #[serde(default)]
    max_targets: Option<u32>,
    #[serde(default)]
    aoe_radius: Option<f32>,
    #[serde(default)]
    special: Option<TowerSpecial>,
}

pub(crate) fn parse(json: &str) -> Result<BTreeMap<TowerIdentity, Arc<TowerConfig>>, ConfigError> {
    let rows: Vec<TowerRow> = parse_table(Table::Towers, json)?;
    if rows.len() != TOWER_ROWS {
        return Err(ConfigError::RowCount {
            table: Table::Towers,
            expected: TOWER_ROWS,
            found: rows.len(),
        });
    }

    let mut towers = BTreeMap::new();
    for row in rows {
        let config = validate(row)?;
        let id = config.identity.as_str();
        if towers.insert(config.identity, Arc::new(config)).is_some() {
            return Err(ConfigError::DuplicateId {
                table: Table::Towers,
                id: id.to_owned(),
            });
        }
    }

    for family in TowerFamily::ALL {
        if !towers.contains_key(&TowerIdentity::Base(family)) {
            return Err(ConfigError::UnknownId {
                table: Table::Towers,
                id: format!("missing base row `{}`", family.as_str()),
            });
        }
    }

    Ok(towers)
}

fn resolve_identity(row: &TowerRow) -> Result<TowerIdentity, ConfigError> {
    let (identity, expected) = match row.role {
        TowerRole::Base => {
            let family: TowerFamily = row.id.parse().map_err(|_| ConfigError::UnknownId {
                table: Table::Towers,
                id: row.id.clone(),
            })?;
            (TowerIdentity::Base(family), family)
        }
        TowerRole::Upgrade => {
            let kind: UpgradeKind = row.id.parse().map_err(|_| ConfigError::UnknownId {
                table: Table::Towers,
                id: row.id.clone(),
            })?;
            (TowerIdentity::upgrade(kind), kind.base_family())
        }
    };

    if expected != row.family {
        return Err(ConfigError::FamilyMismatch {
            id: row.id.clone(),
            declared: row.family.as_str(),
            expected: expected.as_str(),
        });
    }

    let tier_matches = match row.role {
        TowerRole::Base => row.tier == 1,
        TowerRole::Upgrade => row.tier == 2,
    };
    if !tier_matches {
        return Err(invalid(&row.id, "tier", "base rows are tier 1, upgrades tier 2"));
    }

    Ok(identity)
}

fn validate(row: TowerRow) -> Result<TowerConfig, ConfigError> {
    let identity = resolve_identity(&row)?;
    let id = row.id.as_str();

    if row.cost == 0 {
        return Err(invalid(id, "cost", "must be greater than zero"));
    }
    require_non_negative(Table::Towers, id, "atk", row.atk)?;
    require_positive(Table::Towers, id, "attackSpeed", row.attack_speed)?;
    require_positive(Table::Towers, id, "range", row.range)?;
    if let Some(radius) = row.aoe_radius {
        require_positive(Table::Towers, id, "aoeRadius", radius)?;
    }
    if row.max_targets == Some(0) {
        return Err(invalid(id, "maxTargets", "must be at least one"));
    }
    if matches!(row.target_mode, TargetMode::Aoe | TargetMode::Line) && row.aoe_radius.is_none() {
        return Err(invalid(id, "aoeRadius", "required by aoe and line towers"));
    }

    match &row.special {
        Some(TowerSpecial::Effect { effect }) => {
            require_positive(Table::Towers, id, "effect.duration", effect.duration)?;
            require_non_negative(Table::Towers, id, "effect.value", effect.value)?;
        }
        Some(TowerSpecial::Summon { soldiers }) => {
            if soldiers.count == 0 {
                return Err(invalid(id, "soldiers.count", "must be at least one"));
            }
            require_positive(Table::Towers, id, "soldiers.hp", soldiers.hp)?;
            require_non_negative(Table::Towers, id, "soldiers.atk", soldiers.atk)?;
            require_positive(Table::Towers, id, "soldiers.attackSpeed", soldiers.attack_speed)?;
            require_non_negative(Table::Towers, id, "soldiers.respawnTime", soldiers.respawn_time)?;
            if let Some(aura) = soldiers.stun_aura {
                require_positive(Table::Towers, id, "stunAura.cooldown", aura.cooldown)?;
                require_positive(Table::Towers, id, "stunAura.duration", aura.duration)?;
                require_positive(Table::Towers, id, "stunAura.radius", aura.radius)?;
            }
        }
        None => {}
    }

    Ok(TowerConfig {
        identity,
        tier: row.tier,
        cost: row.cost,
        attack_type: row.attack_type,
        atk: row.atk,
        attack_speed: row.attack_speed,
        range: row.range,
        target_mode: row.target_mode,
        max_targets: row.max_targets,
        aoe_radius: row.aoe_radius,
        special: row.special,
    })
}

fn invalid(id: &str, field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidField {
        table: Table::Towers,
        id: id.to_owned(),
        field,
        reason,
    }
}

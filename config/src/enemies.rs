//! Enemy table schema and validation.

use std::{collections::BTreeMap, sync::Arc};

use dam_defense_core::{EnemyCategory, EnemyKind};
use serde::Deserialize;

use crate::{parse_table, require_non_negative, require_positive, ConfigError, Table, ENEMY_ROWS};

/// Special behaviour attached to an enemy row.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", deny_unknown_fields)]
pub enum EnemySpecial {
    /// Slows the attack speed of every tower within `radius`.
    AttackSpeedAura {
        /// Aura radius in range units.
        radius: f32,
        /// Multiplicative attack speed reduction in `0..1`.
        amount: f32,
    },
}

/// Validated configuration of an enemy kind.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnemyConfig {
    /// Kind described by the row.
    #[serde(rename = "id")]
    pub kind: EnemyKind,
    /// Maximum health.
    pub hp: f32,
    /// Path speed in speed units.
    pub speed: f32,
    /// Damage per hit against soldiers and the dam.
    pub atk: f32,
    /// Hits per second.
    pub attack_speed: f32,
    /// Physical defence.
    pub def: f32,
    /// Magic defence.
    pub mdef: f32,
    /// Bounty paid on death.
    pub gold: u32,
    /// Whether the enemy is a boss.
    pub is_boss: bool,
    /// Render scale.
    pub size_multiplier: f32,
    /// Seconds between consecutive spawns of this kind.
    pub spawn_interval: f32,
    /// Strength bracket used to order spawns.
    pub category: EnemyCategory,
    /// Optional special behaviour.
    #[serde(default)]
    pub special: Option<EnemySpecial>,
}

impl EnemyConfig {
    /// Radius and strength of the tower-slowing aura, if present.
    #[must_use]
    pub fn attack_speed_aura(&self) -> Option<(f32, f32)> {
        match self.special {
            Some(EnemySpecial::AttackSpeedAura { radius, amount }) => Some((radius, amount)),
            None => None,
        }
    }
}

pub(crate) fn parse(json: &str) -> Result<BTreeMap<EnemyKind, Arc<EnemyConfig>>, ConfigError> {
    let rows: Vec<EnemyConfig> = parse_table(Table::Enemies, json)?;
    if rows.len() != ENEMY_ROWS {
        return Err(ConfigError::RowCount {
            table: Table::Enemies,
            expected: ENEMY_ROWS,
            found: rows.len(),
        });
    }

    let mut enemies = BTreeMap::new();
    for row in rows {
        validate(&row)?;
        let kind = row.kind;
        if enemies.insert(kind, Arc::new(row)).is_some() {
            return Err(ConfigError::DuplicateId {
                table: Table::Enemies,
                id: kind.as_str().to_owned(),
            });
        }
    }
    Ok(enemies)
}

fn validate(row: &EnemyConfig) -> Result<(), ConfigError> {
    let id = row.kind.as_str();
    require_positive(Table::Enemies, id, "hp", row.hp)?;
    require_positive(Table::Enemies, id, "speed", row.speed)?;
    require_non_negative(Table::Enemies, id, "atk", row.atk)?;
    require_positive(Table::Enemies, id, "attackSpeed", row.attack_speed)?;
    require_non_negative(Table::Enemies, id, "def", row.def)?;
    require_non_negative(Table::Enemies, id, "mdef", row.mdef)?;
    require_positive(Table::Enemies, id, "sizeMultiplier", row.size_multiplier)?;
    require_positive(Table::Enemies, id, "spawnInterval", row.spawn_interval)?;

    if row.is_boss != (row.category == EnemyCategory::Boss) {
        return Err(ConfigError::InvalidField {
            table: Table::Enemies,
            id: id.to_owned(),
            field: "isBoss",
            reason: "must be set exactly for boss category rows",
        });
    }

    if let Some((radius, amount)) = row.attack_speed_aura() {
        require_positive(Table::Enemies, id, "special.radius", radius)?;
        if !(0.0..1.0).contains(&amount) {
            return Err(ConfigError::InvalidField {
                table: Table::Enemies,
                id: id.to_owned(),
                field: "special.amount",
                reason: "must lie in 0..1",
            });
        }
    }
    Ok(())
}

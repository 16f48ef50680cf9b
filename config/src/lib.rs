#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static configuration tables for Dam Defense.
//!
//! Tower, enemy, stage, map and text tables are parsed from JSON and
//! validated against a fixed schema before a [`Catalog`] is handed out.
//! Any violation is a hard [`ConfigError`]; the simulation never runs on a
//! partially valid catalog.

use std::{collections::BTreeMap, fmt, sync::Arc};

use dam_defense_core::{
    EnemyKind, SimulationError, SlotId, StageId, TowerFamily, TowerIdentity, UpgradeKind,
};

pub mod enemies;
pub mod map;
pub mod settings;
pub mod stages;
pub mod texts;
pub mod towers;

pub use enemies::{EnemyConfig, EnemySpecial};
pub use map::{GridLayout, MapConfig, TowerSlot};
pub use settings::GameSettings;
pub use stages::{SpawnGroup, StageConfig, WaveConfig};
pub use texts::TextTable;
pub use towers::{SoldierProfile, StunAura, TowerConfig, TowerSpecial};

/// Number of rows the tower table must define.
pub const TOWER_ROWS: usize = 12;
/// Number of rows the enemy table must define.
pub const ENEMY_ROWS: usize = 9;
/// Number of stages the stage table must define.
pub const STAGE_ROWS: usize = 10;
/// Number of tower slots the map must define.
pub const TOWER_SLOTS: usize = 6;

/// JSON sources for every table, in the order they are validated.
#[derive(Clone, Copy, Debug)]
pub struct CatalogSources<'a> {
    /// Tower table.
    pub towers: &'a str,
    /// Enemy table.
    pub enemies: &'a str,
    /// Stage table.
    pub stages: &'a str,
    /// Map table.
    pub map: &'a str,
    /// Localized text table.
    pub texts: &'a str,
}

impl CatalogSources<'static> {
    /// Tables shipped with the crate.
    pub const EMBEDDED: Self = Self {
        towers: include_str!("../data/towers.json"),
        enemies: include_str!("../data/enemies.json"),
        stages: include_str!("../data/stages.json"),
        map: include_str!("../data/map.json"),
        texts: include_str!("../data/texts.json"),
    };
}

/// Table a configuration error originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Table {
    /// Tower table.
    Towers,
    /// Enemy table.
    Enemies,
    /// Stage table.
    Stages,
    /// Map table.
    Map,
    /// Localized text table.
    Texts,
    /// Runtime settings.
    Settings,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Towers => "tower",
            Self::Enemies => "enemy",
            Self::Stages => "stage",
            Self::Map => "map",
            Self::Texts => "text",
            Self::Settings => "settings",
        };
        f.write_str(name)
    }
}

/// Schema violations detected while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A table is not well-formed JSON or does not match the row shape.
    #[error("failed to parse {table} table")]
    Json {
        /// Offending table.
        table: Table,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },
    /// The settings file is not valid TOML.
    #[error("failed to parse settings")]
    Settings(#[from] toml::de::Error),
    /// A table holds the wrong number of rows.
    #[error("{table} table must contain {expected} rows, found {found}")]
    RowCount {
        /// Offending table.
        table: Table,
        /// Required row count.
        expected: usize,
        /// Actual row count.
        found: usize,
    },
    /// A row uses an identifier the schema does not know.
    #[error("{table} table references unknown id `{id}`")]
    UnknownId {
        /// Offending table.
        table: Table,
        /// Identifier as written.
        id: String,
    },
    /// An identifier appears more than once.
    #[error("{table} table defines `{id}` more than once")]
    DuplicateId {
        /// Offending table.
        table: Table,
        /// Repeated identifier.
        id: String,
    },
    /// A tower row declares a family its id does not belong to.
    #[error("tower `{id}` is declared as family `{declared}` but belongs to `{expected}`")]
    FamilyMismatch {
        /// Row identifier.
        id: String,
        /// Family written in the row.
        declared: &'static str,
        /// Family implied by the identifier.
        expected: &'static str,
    },
    /// A field holds a value outside its allowed range.
    #[error("{table} row `{id}` has invalid {field}: {reason}")]
    InvalidField {
        /// Offending table.
        table: Table,
        /// Row identifier.
        id: String,
        /// Field name.
        field: &'static str,
        /// Constraint that was violated.
        reason: &'static str,
    },
    /// A stage does not define exactly three waves.
    #[error("stage {stage} must define exactly 3 waves, found {found}")]
    WaveCount {
        /// Stage number.
        stage: u32,
        /// Number of waves found.
        found: usize,
    },
    /// Stage ids do not run `1..=N` in order.
    #[error("stage ids must run from 1 in order; expected {expected}, found {found}")]
    StageOrder {
        /// Expected identifier at this position.
        expected: u32,
        /// Identifier found.
        found: u32,
    },
    /// The path polyline is too short.
    #[error("map needs at least 2 waypoints, found {found}")]
    TooFewWaypoints {
        /// Number of waypoints found.
        found: usize,
    },
    /// The text table defines no locale.
    #[error("text table defines no locale")]
    EmptyTexts,
    /// A locale lacks a key another locale defines.
    #[error("locale `{locale}` is missing text key `{key}`")]
    MissingText {
        /// Locale lacking the key.
        locale: String,
        /// Missing key.
        key: String,
    },
}

/// Validated, immutable lookup tables injected into the simulation.
#[derive(Debug)]
pub struct Catalog {
    towers: BTreeMap<TowerIdentity, Arc<TowerConfig>>,
    enemies: BTreeMap<EnemyKind, Arc<EnemyConfig>>,
    stages: Vec<StageConfig>,
    map: MapConfig,
    texts: TextTable,
}

impl Catalog {
    /// Loads and validates the tables embedded in the crate.
    pub fn load_embedded() -> Result<Self, ConfigError> {
        Self::from_json(&CatalogSources::EMBEDDED)
    }

    /// Parses and validates every table.
    pub fn from_json(sources: &CatalogSources<'_>) -> Result<Self, ConfigError> {
        let towers = towers::parse(sources.towers)?;
        let enemies = enemies::parse(sources.enemies)?;
        let stages = stages::parse(sources.stages)?;
        let map = map::parse(sources.map)?;
        let texts = texts::parse(sources.texts)?;
        tracing::debug!(
            towers = towers.len(),
            enemies = enemies.len(),
            stages = stages.len(),
            waypoints = map.waypoints.len(),
            "configuration catalog validated"
        );
        Ok(Self {
            towers,
            enemies,
            stages,
            map,
            texts,
        })
    }

    /// Configuration of the tower with the given identity.
    pub fn tower(&self, identity: TowerIdentity) -> Result<&Arc<TowerConfig>, SimulationError> {
        self.towers
            .get(&identity)
            .ok_or(SimulationError::UnknownTower(identity))
    }

    /// Configuration of the unupgraded tower of a family.
    pub fn base_tower(&self, family: TowerFamily) -> Result<&Arc<TowerConfig>, SimulationError> {
        self.tower(TowerIdentity::Base(family))
    }

    /// Configuration of an upgrade branch.
    pub fn upgrade_tower(&self, kind: UpgradeKind) -> Result<&Arc<TowerConfig>, SimulationError> {
        self.tower(TowerIdentity::upgrade(kind))
    }

    /// Upgrade branches the tower table defines for a family.
    #[must_use]
    pub fn upgrades_for(&self, family: TowerFamily) -> Vec<UpgradeKind> {
        self.towers
            .keys()
            .filter_map(|identity| match *identity {
                TowerIdentity::Upgrade { kind, base } if base == family => Some(kind),
                _ => None,
            })
            .collect()
    }

    /// Iterator over every tower configuration in identity order.
    pub fn towers(&self) -> impl Iterator<Item = &Arc<TowerConfig>> {
        self.towers.values()
    }

    /// Configuration of an enemy kind.
    pub fn enemy(&self, kind: EnemyKind) -> Result<&Arc<EnemyConfig>, SimulationError> {
        self.enemies
            .get(&kind)
            .ok_or(SimulationError::UnknownEnemy(kind))
    }

    /// Iterator over every enemy configuration in kind order.
    pub fn enemies(&self) -> impl Iterator<Item = &Arc<EnemyConfig>> {
        self.enemies.values()
    }

    /// Configuration of a stage.
    pub fn stage(&self, stage: StageId) -> Result<&StageConfig, SimulationError> {
        let index = usize::try_from(stage.get())
            .ok()
            .and_then(|number| number.checked_sub(1))
            .ok_or(SimulationError::UnknownStage(stage))?;
        self.stages
            .get(index)
            .ok_or(SimulationError::UnknownStage(stage))
    }

    /// Every stage in play order.
    #[must_use]
    pub fn stages(&self) -> &[StageConfig] {
        &self.stages
    }

    /// Identifier of the last stage.
    #[must_use]
    pub fn final_stage(&self) -> StageId {
        StageId::new(u32::try_from(self.stages.len()).unwrap_or(u32::MAX))
    }

    /// Static map layout.
    #[must_use]
    pub fn map(&self) -> &MapConfig {
        &self.map
    }

    /// Position of a tower slot.
    pub fn slot(&self, slot: SlotId) -> Result<&TowerSlot, SimulationError> {
        self.map.slot(slot).ok_or(SimulationError::UnknownSlot(slot))
    }

    /// Localized text table.
    #[must_use]
    pub fn texts(&self) -> &TextTable {
        &self.texts
    }

    /// Localized text for `key`, if the locale defines it.
    #[must_use]
    pub fn text(&self, locale: &str, key: &str) -> Option<&str> {
        self.texts.get(locale, key)
    }
}

pub(crate) fn parse_table<T>(table: Table, json: &str) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(json).map_err(|source| ConfigError::Json { table, source })
}

pub(crate) fn require_positive(
    table: Table,
    id: &str,
    field: &'static str,
    value: f32,
) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidField {
            table,
            id: id.to_owned(),
            field,
            reason: "must be a finite number greater than zero",
        })
    }
}

pub(crate) fn require_non_negative(
    table: Table,
    id: &str,
    field: &'static str,
    value: f32,
) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidField {
            table,
            id: id.to_owned(),
            field,
            reason: "must be a finite number no smaller than zero",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_matches_schema_counts() {
        let catalog = Catalog::load_embedded().expect("embedded tables are valid");
        assert_eq!(catalog.towers().count(), TOWER_ROWS);
        assert_eq!(catalog.enemies().count(), ENEMY_ROWS);
        assert_eq!(catalog.stages().len(), STAGE_ROWS);
        assert_eq!(catalog.map().tower_slots.len(), TOWER_SLOTS);
        assert_eq!(catalog.final_stage(), StageId::new(10));
    }

    #[test]
    fn stage_lookup_rejects_zero_and_overflow() {
        let catalog = Catalog::load_embedded().expect("embedded tables are valid");
        assert!(catalog.stage(StageId::new(1)).is_ok());
        assert_eq!(
            catalog.stage(StageId::new(0)).err(),
            Some(SimulationError::UnknownStage(StageId::new(0)))
        );
        assert_eq!(
            catalog.stage(StageId::new(11)).err(),
            Some(SimulationError::UnknownStage(StageId::new(11)))
        );
    }

    #[test]
    fn unknown_slot_is_a_simulation_error() {
        let catalog = Catalog::load_embedded().expect("embedded tables are valid");
        assert_eq!(
            catalog.slot(SlotId::new(42)).err(),
            Some(SimulationError::UnknownSlot(SlotId::new(42)))
        );
    }
}

//! Stage scripts: ten stages of three waves each.

use dam_defense_core::{EnemyKind, StageId, WAVES_PER_STAGE};
use serde::Deserialize;

use crate::{parse_table, ConfigError, Table, STAGE_ROWS};

/// Number of enemies of one kind spawned by a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpawnGroup {
    /// Enemy kind.
    pub enemy: EnemyKind,
    /// Number of enemies.
    pub count: u32,
}

/// Enemy composition of a single wave.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveConfig {
    /// Spawn groups in table order.
    pub spawns: Vec<SpawnGroup>,
}

impl WaveConfig {
    /// Total number of enemies the wave spawns.
    #[must_use]
    pub fn total_enemies(&self) -> u32 {
        self.spawns.iter().map(|group| group.count).sum()
    }
}

/// Script of a stage.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StageConfig {
    /// One-based stage number.
    pub id: StageId,
    /// Gold credited when the stage is cleared.
    #[serde(default)]
    pub bonus_gold: Option<u32>,
    /// Exactly three waves.
    pub waves: Vec<WaveConfig>,
}

impl StageConfig {
    /// Wave at a zero-based index.
    #[must_use]
    pub fn wave(&self, index: u32) -> Option<&WaveConfig> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.waves.get(index))
    }
}

pub(crate) fn parse(json: &str) -> Result<Vec<StageConfig>, ConfigError> {
    let stages: Vec<StageConfig> = parse_table(Table::Stages, json)?;
    if stages.len() != STAGE_ROWS {
        return Err(ConfigError::RowCount {
            table: Table::Stages,
            expected: STAGE_ROWS,
            found: stages.len(),
        });
    }

    let mut expected = StageId::new(1);
    for stage in &stages {
        if stage.id != expected {
            return Err(ConfigError::StageOrder {
                expected: expected.get(),
                found: stage.id.get(),
            });
        }
        if stage.waves.len() != WAVES_PER_STAGE as usize {
            return Err(ConfigError::WaveCount {
                stage: stage.id.get(),
                found: stage.waves.len(),
            });
        }
        for wave in &stage.waves {
            if wave.total_enemies() == 0 {
                return Err(ConfigError::InvalidField {
                    table: Table::Stages,
                    id: stage.id.get().to_string(),
                    field: "waves.spawns",
                    reason: "every wave must spawn at least one enemy",
                });
            }
        }
        expected = expected.next();
    }
    Ok(stages)
}

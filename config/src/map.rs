//! Static map layout: path waypoints, tower slots, the dam and the iso grid.

use std::collections::BTreeSet;

use dam_defense_core::{Position, SlotId};
use serde::Deserialize;

use crate::{parse_table, require_positive, ConfigError, Table, TOWER_SLOTS};

/// Fixed location a tower can be built on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSlot {
    /// Slot identifier.
    pub id: SlotId,
    /// World position of the slot.
    pub position: Position,
}

/// Isometric grid parameters used by renderers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    /// Width of a tile in world units.
    pub tile_width: f32,
    /// Height of a tile in world units.
    pub tile_height: f32,
    /// Screen position of tile `(0, 0)`.
    pub origin: Position,
}

/// Validated map layout.
#[derive(Clone, Debug, PartialEq)]
pub struct MapConfig {
    /// Path polyline from spawn to dam.
    pub waypoints: Vec<Position>,
    /// Tower slots in table order.
    pub tower_slots: Vec<TowerSlot>,
    /// Position of the dam.
    pub dam: Position,
    /// Isometric grid parameters.
    pub grid: GridLayout,
}

impl MapConfig {
    /// Looks up a slot by identifier.
    #[must_use]
    pub fn slot(&self, id: SlotId) -> Option<&TowerSlot> {
        self.tower_slots.iter().find(|slot| slot.id == id)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PointRow {
    x: f32,
    y: f32,
}

impl From<PointRow> for Position {
    fn from(point: PointRow) -> Self {
        Position::new(point.x, point.y)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SlotRow {
    id: SlotId,
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GridRow {
    tile_width: f32,
    tile_height: f32,
    origin_x: f32,
    origin_y: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct MapRow {
    waypoints: Vec<PointRow>,
    tower_slots: Vec<SlotRow>,
    dam: PointRow,
    grid: GridRow,
}

pub(crate) fn parse(json: &str) -> Result<MapConfig, ConfigError> {
    let row: MapRow = parse_table(Table::Map, json)?;

    if row.waypoints.len() < 2 {
        return Err(ConfigError::TooFewWaypoints {
            found: row.waypoints.len(),
        });
    }
    if row.tower_slots.len() != TOWER_SLOTS {
        return Err(ConfigError::RowCount {
            table: Table::Map,
            expected: TOWER_SLOTS,
            found: row.tower_slots.len(),
        });
    }

    let mut seen = BTreeSet::new();
    let mut tower_slots = Vec::with_capacity(row.tower_slots.len());
    for slot in row.tower_slots {
        if !seen.insert(slot.id) {
            return Err(ConfigError::DuplicateId {
                table: Table::Map,
                id: slot.id.get().to_string(),
            });
        }
        tower_slots.push(TowerSlot {
            id: slot.id,
            position: Position::new(slot.x, slot.y),
        });
    }

    require_positive(Table::Map, "grid", "tileWidth", row.grid.tile_width)?;
    require_positive(Table::Map, "grid", "tileHeight", row.grid.tile_height)?;

    Ok(MapConfig {
        waypoints: row.waypoints.into_iter().map(Position::from).collect(),
        tower_slots,
        dam: row.dam.into(),
        grid: GridLayout {
            tile_width: row.grid.tile_width,
            tile_height: row.grid.tile_height,
            origin: Position::new(row.grid.origin_x, row.grid.origin_y),
        },
    })
}

//! Isometric grid to screen projection.

use dam_defense_config::GridLayout;
use dam_defense_core::Position;
use glam::{IVec2, Vec2};

/// Diamond-tile isometric projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsoGrid {
    half_width: f32,
    half_height: f32,
    origin: Position,
}

impl IsoGrid {
    /// Creates a projection with the given tile size and screen origin.
    #[must_use]
    pub fn new(tile_width: f32, tile_height: f32, origin: Position) -> Self {
        Self {
            half_width: tile_width / 2.0,
            half_height: tile_height / 2.0,
            origin,
        }
    }

    /// Screen position of the top corner of grid coordinate `grid`.
    #[must_use]
    pub fn grid_to_screen(&self, grid: Vec2) -> Position {
        Position::new(
            self.origin.x + (grid.x - grid.y) * self.half_width,
            self.origin.y + (grid.x + grid.y) * self.half_height,
        )
    }

    /// Fractional grid coordinate under `screen`.
    #[must_use]
    pub fn screen_to_grid(&self, screen: Position) -> Vec2 {
        let dx = (screen.x - self.origin.x) / self.half_width;
        let dy = (screen.y - self.origin.y) / self.half_height;
        Vec2::new((dx + dy) / 2.0, (dy - dx) / 2.0)
    }

    /// Tile containing `screen`.
    #[must_use]
    pub fn screen_to_cell(&self, screen: Position) -> IVec2 {
        self.screen_to_grid(screen).floor().as_ivec2()
    }
}

impl From<GridLayout> for IsoGrid {
    fn from(layout: GridLayout) -> Self {
        Self::new(layout.tile_width, layout.tile_height, layout.origin)
    }
}

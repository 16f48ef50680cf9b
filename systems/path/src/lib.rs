#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Path geometry: maps scalar progress along the waypoint polyline to world
//! positions and back.

use dam_defense_config::{MapConfig, TowerSlot};
use dam_defense_core::{geometry, Position, DISTANCE_PER_SPEED_UNIT, RANGE_UNIT};

pub mod grid;

pub use grid::IsoGrid;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Segment {
    start: Position,
    end: Position,
    length: f32,
    offset: f32,
}

/// Precomputed polyline that enemies walk from spawn to dam.
#[derive(Clone, Debug, PartialEq)]
pub struct PathSystem {
    waypoints: Vec<Position>,
    segments: Vec<Segment>,
    total_length: f32,
    tower_slots: Vec<TowerSlot>,
    dam: Position,
}

impl PathSystem {
    /// Builds the path described by the map table.
    #[must_use]
    pub fn new(map: &MapConfig) -> Self {
        let mut path = Self::from_waypoints(map.waypoints.clone());
        path.tower_slots = map.tower_slots.clone();
        path.dam = map.dam;
        path
    }

    /// Builds a path from bare waypoints, without slots; the dam sits on the
    /// last waypoint.
    #[must_use]
    pub fn from_waypoints(waypoints: Vec<Position>) -> Self {
        let mut segments = Vec::with_capacity(waypoints.len().saturating_sub(1));
        let mut offset = 0.0;
        for pair in waypoints.windows(2) {
            let length = geometry::distance(pair[0], pair[1]);
            segments.push(Segment {
                start: pair[0],
                end: pair[1],
                length,
                offset,
            });
            offset += length;
        }
        if offset <= 0.0 {
            tracing::warn!(
                waypoints = waypoints.len(),
                "path has zero length; enemies will not advance"
            );
        }
        let dam = waypoints.last().copied().unwrap_or_default();
        Self {
            waypoints,
            segments,
            total_length: offset,
            tower_slots: Vec::new(),
            dam,
        }
    }

    /// Total polyline length in world units.
    #[must_use]
    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    /// World position at `progress`, clamped to `[0, 1]`.
    ///
    /// The endpoints map exactly onto the first and last waypoints.
    #[must_use]
    pub fn position_at_progress(&self, progress: f32) -> Position {
        let first = self.waypoints.first().copied().unwrap_or_default();
        let last = self.waypoints.last().copied().unwrap_or_default();
        let progress = progress.clamp(0.0, 1.0);
        if progress <= 0.0 || self.total_length <= 0.0 {
            return first;
        }
        if progress >= 1.0 {
            return last;
        }

        let travelled = progress * self.total_length;
        self.segments
            .iter()
            .filter(|segment| segment.length > 0.0)
            .find(|segment| travelled <= segment.offset + segment.length)
            .map_or(last, |segment| {
                let t = (travelled - segment.offset) / segment.length;
                geometry::lerp(segment.start, segment.end, t)
            })
    }

    /// Progress of the path point closest to `position`.
    ///
    /// Zero-length segments are ignored.
    #[must_use]
    pub fn progress_at_position(&self, position: Position) -> f32 {
        if self.total_length <= 0.0 {
            return 0.0;
        }

        let mut best_distance = f32::INFINITY;
        let mut best_travelled = 0.0;
        for segment in self.segments.iter().filter(|segment| segment.length > 0.0) {
            let axis = segment.end - segment.start;
            let scalar = ((position - segment.start).dot(axis) / axis.length_squared())
                .clamp(0.0, 1.0);
            let projected = segment.start + axis * scalar;
            let distance = geometry::distance(position, projected);
            if distance < best_distance {
                best_distance = distance;
                best_travelled = segment.offset + scalar * segment.length;
            }
        }
        best_travelled / self.total_length
    }

    /// Point on the path closest to `position`.
    #[must_use]
    pub fn nearest_point(&self, position: Position) -> Position {
        self.position_at_progress(self.progress_at_position(position))
    }

    /// Converts a speed in speed units per second into progress per second.
    #[must_use]
    pub fn speed_as_progress(&self, speed: f32) -> f32 {
        if self.total_length <= 0.0 {
            return 0.0;
        }
        speed * DISTANCE_PER_SPEED_UNIT / self.total_length
    }

    /// Converts a world-unit distance into a progress delta.
    #[must_use]
    pub fn distance_as_progress(&self, distance: f32) -> f32 {
        if self.total_length <= 0.0 {
            return 0.0;
        }
        distance / self.total_length
    }

    /// Copy of the tower slot layout.
    #[must_use]
    pub fn tower_slots(&self) -> Vec<TowerSlot> {
        self.tower_slots.clone()
    }

    /// Position of the dam.
    #[must_use]
    pub fn dam_position(&self) -> Position {
        self.dam
    }

    /// Copy of the waypoint polyline.
    #[must_use]
    pub fn waypoints(&self) -> Vec<Position> {
        self.waypoints.clone()
    }

    /// Reports whether `to` lies within `range` range units of `from`.
    #[must_use]
    pub fn is_in_range(from: Position, to: Position, range: f32) -> bool {
        geometry::distance(from, to) <= range * RANGE_UNIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elbow() -> PathSystem {
        PathSystem::from_waypoints(vec![
            Position::new(0.0, 0.0),
            Position::new(100.0, 0.0),
            Position::new(100.0, 100.0),
        ])
    }

    #[test]
    fn endpoints_map_to_first_and_last_waypoints() {
        let path = elbow();
        assert_eq!(path.position_at_progress(0.0), Position::new(0.0, 0.0));
        assert_eq!(path.position_at_progress(-3.0), Position::new(0.0, 0.0));
        assert_eq!(path.position_at_progress(1.0), Position::new(100.0, 100.0));
        assert_eq!(path.position_at_progress(7.0), Position::new(100.0, 100.0));
    }

    #[test]
    fn midpoint_lands_on_the_corner() {
        let path = elbow();
        assert_eq!(path.total_length(), 200.0);
        assert_eq!(path.position_at_progress(0.5), Position::new(100.0, 0.0));
        assert_eq!(path.position_at_progress(0.75), Position::new(100.0, 50.0));
    }

    #[test]
    fn off_path_points_project_onto_the_nearest_segment() {
        let path = elbow();
        let progress = path.progress_at_position(Position::new(50.0, 20.0));
        assert!((progress - 0.25).abs() < 1e-5);
        assert_eq!(
            path.nearest_point(Position::new(130.0, 60.0)),
            Position::new(100.0, 60.0)
        );
    }

    #[test]
    fn degenerate_segments_are_skipped() {
        let path = PathSystem::from_waypoints(vec![
            Position::new(0.0, 0.0),
            Position::new(0.0, 0.0),
            Position::new(40.0, 0.0),
        ]);
        assert_eq!(path.position_at_progress(0.5), Position::new(20.0, 0.0));
        assert!((path.progress_at_position(Position::new(10.0, 5.0)) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn zero_length_path_yields_zero_progress() {
        let path = PathSystem::from_waypoints(vec![Position::new(5.0, 5.0); 2]);
        assert_eq!(path.speed_as_progress(3.0), 0.0);
        assert_eq!(path.progress_at_position(Position::new(9.0, 9.0)), 0.0);
        assert_eq!(path.position_at_progress(0.5), Position::new(5.0, 5.0));
    }

    #[test]
    fn speed_converts_through_distance_per_speed_unit() {
        let path = elbow();
        assert!((path.speed_as_progress(1.0) - DISTANCE_PER_SPEED_UNIT / 200.0).abs() < 1e-6);
    }

    #[test]
    fn range_is_measured_in_range_units() {
        let origin = Position::ZERO;
        assert!(PathSystem::is_in_range(origin, Position::new(RANGE_UNIT, 0.0), 1.0));
        assert!(!PathSystem::is_in_range(origin, Position::new(RANGE_UNIT + 0.5, 0.0), 1.0));
    }
}

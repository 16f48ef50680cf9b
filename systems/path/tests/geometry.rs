use dam_defense_config::Catalog;
use dam_defense_core::Position;
use dam_defense_system_path::{IsoGrid, PathSystem};
use proptest::prelude::*;

fn polyline() -> impl Strategy<Value = Vec<Position>> {
    prop::collection::vec((1.0f32..200.0, -1.0f32..1.0, -1.0f32..1.0), 1..6).prop_map(
        |steps| {
            let mut cursor = Position::new(0.0, 0.0);
            let mut points = vec![cursor];
            for (length, dx, dy) in steps {
                let mut direction = Position::new(dx, dy).normalize_or_zero();
                if direction == Position::ZERO {
                    direction = Position::X;
                }
                cursor += direction * length;
                points.push(cursor);
            }
            points
        },
    )
}

proptest! {
    #[test]
    fn endpoints_are_exact(points in polyline()) {
        let path = PathSystem::from_waypoints(points.clone());
        prop_assert_eq!(path.position_at_progress(0.0), points[0]);
        prop_assert_eq!(path.position_at_progress(1.0), *points.last().unwrap());
    }

    #[test]
    fn distance_travelled_grows_with_progress(points in polyline(), a in 0.0f32..1.0, b in 0.0f32..1.0) {
        let path = PathSystem::from_waypoints(points);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let from = path.position_at_progress(low);
        let to = path.position_at_progress(high);
        let chord = from.distance(to);
        let along = (high - low) * path.total_length();
        prop_assert!(chord <= along + 1e-2, "chord {} exceeds arc {}", chord, along);
    }

    #[test]
    fn small_progress_steps_move_a_small_distance(points in polyline(), p in 0.0f32..0.99) {
        let path = PathSystem::from_waypoints(points);
        let step = 0.01;
        let gap = path
            .position_at_progress(p)
            .distance(path.position_at_progress(p + step));
        prop_assert!(gap <= step * path.total_length() + 1e-2);
    }

    #[test]
    fn progress_round_trips_on_straight_paths(length in 10.0f32..2000.0, p in 0.0f32..1.0) {
        let path = PathSystem::from_waypoints(vec![
            Position::new(0.0, 0.0),
            Position::new(length, 0.0),
        ]);
        let back = path.progress_at_position(path.position_at_progress(p));
        prop_assert!((back - p).abs() < 1e-3);
    }

    #[test]
    fn iso_projection_round_trips(x in -50.0f32..50.0, y in -50.0f32..50.0) {
        let grid = IsoGrid::new(64.0, 32.0, Position::new(480.0, 32.0));
        let cell = glam::Vec2::new(x, y);
        let back = grid.screen_to_grid(grid.grid_to_screen(cell));
        prop_assert!((back - cell).length() < 1e-2);
    }
}

#[test]
fn shipped_map_path_is_fourteen_hundred_units_long() {
    let catalog = Catalog::load_embedded().expect("embedded tables are valid");
    let path = PathSystem::new(catalog.map());

    assert_eq!(path.total_length(), 1400.0);
    assert_eq!(path.tower_slots().len(), 6);
    assert_eq!(path.dam_position(), Position::new(920.0, 480.0));
    assert_eq!(path.position_at_progress(0.0), Position::new(0.0, 320.0));
    assert_eq!(path.position_at_progress(1.0), Position::new(880.0, 480.0));
}

#[test]
fn interior_waypoints_round_trip_on_the_shipped_map() {
    let catalog = Catalog::load_embedded().expect("embedded tables are valid");
    let path = PathSystem::new(catalog.map());

    for progress in [0.1, 0.3, 0.5, 0.7, 0.9] {
        let back = path.progress_at_position(path.position_at_progress(progress));
        assert!(
            (back - progress).abs() < 1e-4,
            "progress {progress} came back as {back}",
        );
    }
}

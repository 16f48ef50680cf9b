//! Small vector helpers shared by the path, combat and soldier systems.

use crate::Position;

/// Euclidean distance between two points.
#[must_use]
pub fn distance(from: Position, to: Position) -> f32 {
    from.distance(to)
}

/// Linear interpolation between two points; `t` is not clamped.
#[must_use]
pub fn lerp(from: Position, to: Position, t: f32) -> Position {
    from.lerp(to, t)
}

/// Unit vector pointing along `vector`, or zero for a zero-length input.
#[must_use]
pub fn normalize(vector: Position) -> Position {
    vector.normalize_or_zero()
}

/// Moves `from` toward `to` by at most `max_step`, never overshooting.
#[must_use]
pub fn step_toward(from: Position, to: Position, max_step: f32) -> Position {
    let offset = to - from;
    let length = offset.length();
    if length <= max_step || length <= f32::EPSILON {
        return to;
    }
    from + offset * (max_step / length)
}

/// Reports whether `point` lies inside the cone opening from `apex` along
/// `direction` with the given half-angle and radius.
///
/// A point coinciding with the apex is inside. A zero direction matches
/// nothing else.
#[must_use]
pub fn in_cone(
    apex: Position,
    direction: Position,
    point: Position,
    half_angle: f32,
    radius: f32,
) -> bool {
    let offset = point - apex;
    let length = offset.length();
    if length > radius {
        return false;
    }
    if length <= f32::EPSILON {
        return true;
    }
    let axis = normalize(direction);
    if axis == Position::ZERO {
        return false;
    }
    let cosine = axis.dot(offset / length).clamp(-1.0, 1.0);
    cosine.acos() <= half_angle
}

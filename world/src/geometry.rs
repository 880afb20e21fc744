//! Continuous-map geometry helpers shared by the decision stages and the navigator.

use fleet_policy_core::Position;
use glam::DVec2;

fn to_vec(position: Position) -> DVec2 {
    DVec2::new(position.x(), position.y())
}

fn to_position(vector: DVec2) -> Position {
    Position::new(vector.x, vector.y)
}

/// Point on the ray from `target` toward `from`, `target_radius + gap` away from the target centre.
///
/// A negative `gap` lands inside the target's rim. When `from` coincides with
/// the target centre the ray points along the positive x axis.
#[must_use]
pub fn approach_point(from: Position, target: Position, target_radius: f64, gap: f64) -> Position {
    let centre = to_vec(target);
    let direction = (to_vec(from) - centre).try_normalize().unwrap_or(DVec2::X);
    to_position(centre + direction * (target_radius + gap))
}

/// Mean of the provided positions, `None` for an empty set.
#[must_use]
pub fn centroid<I>(positions: I) -> Option<Position>
where
    I: IntoIterator<Item = Position>,
{
    let mut sum = DVec2::ZERO;
    let mut count = 0_u32;
    for position in positions {
        sum += to_vec(position);
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(to_position(sum / f64::from(count)))
}

/// Reflection of `centre` through `from`: the point diametrically opposite the centre.
#[must_use]
pub fn anti_centroid(from: Position, centre: Position) -> Position {
    to_position(to_vec(from) * 2.0 - to_vec(centre))
}

/// Reports whether the segment `start..end` passes within `radius` of `centre`.
#[must_use]
pub fn segment_hits_circle(start: Position, end: Position, centre: Position, radius: f64) -> bool {
    let start = to_vec(start);
    let segment = to_vec(end) - start;
    let centre = to_vec(centre);

    let length_sq = segment.length_squared();
    if length_sq == 0.0 {
        return start.distance(centre) <= radius;
    }

    let t = ((centre - start).dot(segment) / length_sq).min(1.0);
    if t < 0.0 {
        return false;
    }

    (start + segment * t).distance(centre) <= radius
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Position, x: f64, y: f64) {
        assert!(
            (actual.x() - x).abs() < 1e-9 && (actual.y() - y).abs() < 1e-9,
            "expected ({x}, {y}), got ({}, {})",
            actual.x(),
            actual.y()
        );
    }

    #[test]
    fn approach_point_stops_short_of_rim() {
        let point = approach_point(Position::new(20.0, 0.0), Position::new(0.0, 0.0), 3.0, 2.0);
        assert_close(point, 5.0, 0.0);
    }

    #[test]
    fn negative_gap_lands_inside_rim() {
        let point = approach_point(Position::new(0.0, -20.0), Position::new(0.0, 0.0), 3.0, -1.0);
        assert_close(point, 0.0, -2.0);
    }

    #[test]
    fn anti_centroid_mirrors_through_source() {
        let away = anti_centroid(Position::new(10.0, 10.0), Position::new(12.0, 9.0));
        assert_close(away, 8.0, 11.0);
    }

    #[test]
    fn centroid_of_nothing_is_none() {
        assert!(centroid(std::iter::empty()).is_none());
    }

    #[test]
    fn segment_clears_circle_behind_start() {
        let start = Position::new(0.0, 0.0);
        let end = Position::new(10.0, 0.0);
        assert!(segment_hits_circle(start, end, Position::new(5.0, 1.0), 1.5));
        assert!(!segment_hits_circle(start, end, Position::new(5.0, 3.0), 1.5));
        assert!(!segment_hits_circle(start, end, Position::new(-5.0, 0.0), 1.5));
    }
}

//! Straight-line navigator with angular corrections around obstacles.

use fleet_policy_core::{
    Command, Navigator, Position, Targetable, Unit, WorldSnapshot, FORECAST_FUDGE,
};

use crate::geometry::segment_hits_circle;

/// Navigator that tries the direct heading first and then sweeps it
/// counter-clockwise in fixed steps until a clear line is found.
///
/// Planets are always treated as obstacles; other units only when the caller
/// asks for them to be avoided. An obstacle whose padded body already contains
/// the destination is ignored, which lets callers aim at a point inside a
/// target. When every correction is exhausted the navigator refuses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectNavigator {
    max_corrections: u32,
    angular_step_degrees: f64,
}

impl Default for DirectNavigator {
    fn default() -> Self {
        Self {
            max_corrections: 90,
            angular_step_degrees: 1.0,
        }
    }
}

impl DirectNavigator {
    /// Creates a navigator with an explicit correction budget and step size.
    #[must_use]
    pub fn new(max_corrections: u32, angular_step_degrees: f64) -> Self {
        Self {
            max_corrections,
            angular_step_degrees,
        }
    }

    /// Replaces the number of heading corrections attempted before refusing.
    #[must_use]
    pub fn with_max_corrections(mut self, max_corrections: u32) -> Self {
        self.max_corrections = max_corrections;
        self
    }

    /// Number of heading corrections attempted before refusing.
    #[must_use]
    pub fn max_corrections(&self) -> u32 {
        self.max_corrections
    }

    fn path_is_clear(
        &self,
        unit: &Unit,
        target: Position,
        avoid_units: bool,
        snapshot: &WorldSnapshot,
    ) -> bool {
        let planets = snapshot.planets.iter().map(|planet| obstacle(planet));
        let units = snapshot
            .units
            .iter()
            .filter(|_| avoid_units)
            .filter(|other| other.id != unit.id)
            .map(|other| obstacle(other));

        planets.chain(units).all(|(centre, radius)| {
            if centre.distance_to(target) <= radius {
                return true;
            }
            !segment_hits_circle(unit.position, target, centre, radius)
        })
    }
}

fn obstacle<T: Targetable>(entity: &T) -> (Position, f64) {
    (entity.position(), entity.radius() + FORECAST_FUDGE)
}

impl Navigator for DirectNavigator {
    fn move_toward(
        &self,
        unit: &Unit,
        destination: Position,
        max_speed: f64,
        avoid_units: bool,
        snapshot: &WorldSnapshot,
    ) -> Option<Command> {
        let origin = unit.position;
        let distance = origin.distance_to(destination);
        let heading = origin.angle_to(destination).to_degrees();

        for correction in 0..=self.max_corrections {
            let angle = heading + f64::from(correction) * self.angular_step_degrees;
            let radians = angle.to_radians();
            let target = Position::new(
                origin.x() + radians.cos() * distance,
                origin.y() + radians.sin() * distance,
            );
            if !self.path_is_clear(unit, target, avoid_units, snapshot) {
                continue;
            }

            let magnitude = distance.min(max_speed).max(0.0).floor() as u32;
            let angle = (angle.rem_euclid(360.0).round() as u32) % 360;
            return Some(Command::Thrust {
                unit: unit.id,
                magnitude,
                angle,
            });
        }

        None
    }
}

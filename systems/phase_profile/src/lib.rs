#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Phase profiles and the selector that picks one per turn.
//!
//! Every tuning value the decision stages consult lives in a [`PhaseProfile`].
//! Profiles are grouped into an ordered [`PhaseTable`] of bands; the first band
//! whose condition matches the turn number and fleet size wins, and the last
//! band doubles as the fallback. In the built-in table the fallback is the
//! opening phase, the earliest one, used until a later phase's condition
//! holds. The built-in table reproduces the tuned values, and alternative
//! tables can be loaded from TOML.

use fleet_policy_core::PlanetId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a phase table.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The TOML document could not be parsed into a table.
    #[error("failed to parse phase table: {0}")]
    Parse(#[from] toml::de::Error),
    /// The table contained no bands.
    #[error("phase table must contain at least one band")]
    Empty,
    /// A band carried an out-of-range value.
    #[error("band `{band}` is invalid: {reason}")]
    InvalidBand {
        /// Name of the offending band.
        band: String,
        /// Description of the violated constraint.
        reason: &'static str,
    },
}

/// Engagement distance that is either fixed or scaled to the map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reach {
    /// Constant distance in world units.
    Fixed {
        /// Distance in world units.
        distance: f64,
    },
    /// Fraction of the larger map dimension, never below `floor`.
    MapScaled {
        /// Multiplier applied to the larger map dimension.
        factor: f64,
        /// Lower bound on the resolved distance.
        #[serde(default)]
        floor: f64,
    },
}

impl Reach {
    /// Creates a fixed reach.
    #[must_use]
    pub const fn fixed(distance: f64) -> Self {
        Self::Fixed { distance }
    }

    /// Resolves the reach for a map whose larger dimension is `map_span`.
    #[must_use]
    pub fn resolve(&self, map_span: f64) -> f64 {
        match *self {
            Self::Fixed { distance } => distance,
            Self::MapScaled { factor, floor } => (factor * map_span).max(floor),
        }
    }

    fn is_valid(&self) -> bool {
        match *self {
            Self::Fixed { distance } => distance >= 0.0,
            Self::MapScaled { factor, floor } => factor >= 0.0 && floor >= 0.0,
        }
    }
}

/// How the evaluated units are chosen from the eligible fleet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSampling {
    /// Keep the first `max_units` eligible units in identifier order.
    SortedPrefix,
    /// Draw `max_units` eligible units with a per-turn seeded generator.
    SeededSample,
}

/// Percentages of the behaviour roll space assigned to each optional stage.
///
/// A unit whose roll is strictly below a percentage is admitted to that stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorMix {
    /// Admission threshold for planet destruction.
    pub destroy_planet: u8,
    /// Admission threshold for expansion.
    pub expansion: u8,
    /// Admission threshold for ramming docked enemy units.
    pub collide_docked: u8,
    /// Admission threshold for harassing docked enemy units.
    pub harass_docked: u8,
}

impl BehaviorMix {
    fn is_valid(&self) -> bool {
        [
            self.destroy_planet,
            self.expansion,
            self.collide_docked,
            self.harass_docked,
        ]
        .iter()
        .all(|percent| *percent <= 100)
    }
}

/// Immutable tuning bundle consulted by every stage for one turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseProfile {
    /// Wall-clock budget for the turn, in seconds.
    pub time_budget_secs: f64,
    /// Fraction of the maximum speed used for ordinary moves.
    pub speed_fraction: f64,
    /// Ceiling on units evaluated and commands issued in one turn.
    pub max_units: usize,
    /// One in this many units checks for docking each turn.
    pub dock_check_ratio: u32,
    /// Radius within which enemy units are engaged defensively.
    pub defensive_radius: f64,
    /// Reach of the anti-ship fallback search.
    pub ship_reach: Reach,
    /// Reach of planet destruction and owned-planet expansion searches.
    pub planet_reach: Reach,
    /// Radius within which unowned planets are considered for expansion.
    pub expansion_radius: f64,
    /// Reach used to find enemy planets whose docked units are targeted.
    pub docked_target_reach: Reach,
    /// Drops oversubscribed unowned planets from expansion candidates.
    pub diversify_expansion: bool,
    /// Units avoid each other only while the moving population is at most this size.
    pub avoid_units_threshold: usize,
    /// Order in which eligible units are evaluated.
    pub sampling: UnitSampling,
    /// Planets never chosen as expansion targets.
    #[serde(default)]
    pub excluded_planets: Vec<PlanetId>,
    /// Behaviour class thresholds.
    pub behavior: BehaviorMix,
}

impl PhaseProfile {
    fn validate(&self) -> Result<(), &'static str> {
        if !(self.time_budget_secs > 0.0) {
            return Err("time budget must be positive");
        }
        if !(self.speed_fraction > 0.0 && self.speed_fraction <= 1.0) {
            return Err("speed fraction must lie in (0, 1]");
        }
        if self.max_units == 0 {
            return Err("max units must be at least one");
        }
        if self.defensive_radius < 0.0 || self.expansion_radius < 0.0 {
            return Err("radii must not be negative");
        }
        if !(self.ship_reach.is_valid()
            && self.planet_reach.is_valid()
            && self.docked_target_reach.is_valid())
        {
            return Err("reach values must not be negative");
        }
        if !self.behavior.is_valid() {
            return Err("behaviour percentages must not exceed 100");
        }
        Ok(())
    }
}

/// Profile together with the condition under which it applies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseBand {
    /// Label reported in turn summaries.
    pub name: String,
    /// Band matches only once the turn number exceeds this value.
    pub after_turn: u32,
    /// When set, band matches only while the fleet is larger than this.
    #[serde(default)]
    pub more_than_units: Option<usize>,
    /// Tuning applied while the band is active.
    pub profile: PhaseProfile,
}

impl PhaseBand {
    /// Reports whether the band applies to the given turn and fleet size.
    #[must_use]
    pub fn matches(&self, turn: u32, fleet: usize) -> bool {
        turn > self.after_turn && self.more_than_units.map_or(true, |limit| fleet > limit)
    }
}

/// Ordered, non-empty list of phase bands.
///
/// The first matching band wins and the last band is the fallback, applied to
/// any turn no other band claims. In the built-in table the bands run from the
/// latest phase to the earliest, so the fallback is the opening phase rather
/// than the most conservative profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableFile", into = "TableFile")]
pub struct PhaseTable {
    bands: Vec<PhaseBand>,
    fallback: PhaseBand,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TableFile {
    bands: Vec<PhaseBand>,
}

impl TryFrom<TableFile> for PhaseTable {
    type Error = ProfileError;

    fn try_from(file: TableFile) -> Result<Self, Self::Error> {
        Self::new(file.bands)
    }
}

impl From<PhaseTable> for TableFile {
    fn from(table: PhaseTable) -> Self {
        let mut bands = table.bands;
        bands.push(table.fallback);
        Self { bands }
    }
}

impl PhaseTable {
    /// Validates `bands` and builds a table. The last band is the fallback.
    pub fn new(mut bands: Vec<PhaseBand>) -> Result<Self, ProfileError> {
        for band in &bands {
            band.profile
                .validate()
                .map_err(|reason| ProfileError::InvalidBand {
                    band: band.name.clone(),
                    reason,
                })?;
        }
        let fallback = bands.pop().ok_or(ProfileError::Empty)?;
        Ok(Self { bands, fallback })
    }

    /// Parses and validates a table from a TOML document with `[[bands]]` entries.
    pub fn from_toml_str(contents: &str) -> Result<Self, ProfileError> {
        let file: TableFile = toml::from_str(contents)?;
        Self::new(file.bands)
    }

    /// Renders the table as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(&TableFile::from(self.clone()))
    }

    /// Band applying to `turn` with `fleet` undocked units.
    #[must_use]
    pub fn select_band(&self, turn: u32, fleet: usize) -> &PhaseBand {
        self.bands
            .iter()
            .find(|band| band.matches(turn, fleet))
            .unwrap_or(&self.fallback)
    }

    /// Profile applying to `turn` with `fleet` undocked units.
    #[must_use]
    pub fn select(&self, turn: u32, fleet: usize) -> &PhaseProfile {
        &self.select_band(turn, fleet).profile
    }

    /// Bands in evaluation order, fallback last.
    pub fn bands(&self) -> impl Iterator<Item = &PhaseBand> + '_ {
        self.bands.iter().chain(std::iter::once(&self.fallback))
    }
}

impl Default for PhaseTable {
    fn default() -> Self {
        let standard = |time_budget_secs: f64,
                        speed_fraction: f64,
                        max_units: usize,
                        dock_check_ratio: u32| PhaseProfile {
            time_budget_secs,
            speed_fraction,
            max_units,
            dock_check_ratio,
            defensive_radius: 10.0,
            ship_reach: Reach::fixed(100.0),
            planet_reach: Reach::fixed(100.0),
            expansion_radius: 100.0,
            docked_target_reach: Reach::fixed(100.0),
            diversify_expansion: false,
            avoid_units_threshold: 100,
            sampling: UnitSampling::SortedPrefix,
            excluded_planets: Vec::new(),
            behavior: BehaviorMix {
                destroy_planet: 0,
                expansion: 0,
                collide_docked: 0,
                harass_docked: 0,
            },
        };

        let late = PhaseProfile {
            defensive_radius: 6.0,
            ship_reach: Reach::fixed(50.0),
            planet_reach: Reach::MapScaled {
                factor: 1.0,
                floor: 1000.0,
            },
            docked_target_reach: Reach::fixed(1000.0),
            diversify_expansion: true,
            behavior: BehaviorMix {
                destroy_planet: 25,
                expansion: 40,
                collide_docked: 60,
                harass_docked: 70,
            },
            ..standard(1.8, 0.4, 40, 4)
        };

        let mid = PhaseProfile {
            defensive_radius: 7.0,
            planet_reach: Reach::MapScaled {
                factor: 0.5,
                floor: 0.0,
            },
            docked_target_reach: Reach::fixed(150.0),
            behavior: BehaviorMix {
                destroy_planet: 15,
                expansion: 30,
                collide_docked: 55,
                harass_docked: 80,
            },
            ..standard(1.8, 0.5, 60, 3)
        };

        let developing = PhaseProfile {
            behavior: BehaviorMix {
                destroy_planet: 0,
                expansion: 50,
                collide_docked: 65,
                harass_docked: 90,
            },
            ..standard(1.8, 0.95, 100, 2)
        };

        let expansion = PhaseProfile {
            ship_reach: Reach::fixed(50.0),
            planet_reach: Reach::fixed(200.0),
            behavior: BehaviorMix {
                destroy_planet: 0,
                expansion: 75,
                collide_docked: 0,
                harass_docked: 95,
            },
            ..standard(1.9, 1.0, 100, 1)
        };

        let opening = PhaseProfile {
            defensive_radius: 20.0,
            ship_reach: Reach::fixed(50.0),
            diversify_expansion: true,
            sampling: UnitSampling::SeededSample,
            excluded_planets: (0..4).map(PlanetId::new).collect(),
            behavior: BehaviorMix {
                destroy_planet: 0,
                expansion: 90,
                collide_docked: 0,
                harass_docked: 0,
            },
            ..standard(1.9, 1.0, 100, 1)
        };

        let band = |name: &str,
                    after_turn: u32,
                    more_than_units: Option<usize>,
                    profile: PhaseProfile| PhaseBand {
            name: name.to_owned(),
            after_turn,
            more_than_units,
            profile,
        };

        Self {
            bands: vec![
                band("late", 200, Some(100), late),
                band("mid", 100, Some(100), mid),
                band("developing", 50, None, developing),
                band("expansion", 10, None, expansion),
            ],
            fallback: band("opening", 0, None, opening),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PhaseTable, Reach, UnitSampling};

    #[test]
    fn selection_is_idempotent() {
        let table = PhaseTable::default();
        for (turn, fleet) in [(1, 3), (60, 40), (150, 150), (400, 400)] {
            assert_eq!(table.select(turn, fleet), table.select(turn, fleet));
        }
    }

    #[test]
    fn late_band_requires_both_turn_and_fleet() {
        let table = PhaseTable::default();
        assert_eq!(table.select_band(201, 101).name, "late");
        assert_eq!(table.select_band(200, 101).name, "mid");
        assert_eq!(table.select_band(201, 100).name, "developing");
    }

    #[test]
    fn early_turns_fall_back_to_opening() {
        let table = PhaseTable::default();
        let band = table.select_band(1, 3);
        assert_eq!(band.name, "opening");
        assert_eq!(band.profile.sampling, UnitSampling::SeededSample);
        assert_eq!(band.profile.excluded_planets.len(), 4);
        assert_eq!(table.select_band(11, 3).name, "expansion");
        assert_eq!(table.select_band(51, 3).name, "developing");
        let last = table.bands().last().expect("fallback band");
        assert_eq!(last.name, "opening");
        assert_eq!(last.after_turn, 0);
    }

    #[test]
    fn map_scaled_reach_respects_floor() {
        let reach = Reach::MapScaled {
            factor: 0.5,
            floor: 120.0,
        };
        assert!((reach.resolve(384.0) - 192.0).abs() < f64::EPSILON);
        assert!((reach.resolve(160.0) - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_tables_are_rejected() {
        assert!(PhaseTable::new(Vec::new()).is_err());
    }
}

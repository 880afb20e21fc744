#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the fleet policy engine.
//!
//! This crate defines the value types that flow between adapters, the
//! per-turn world view, and the pure decision systems. Adapters obtain a
//! [`WorldSnapshot`] from a [`SnapshotSource`], systems read it and respond
//! exclusively with [`Command`] batches, and the batch is handed to a
//! [`CommandEmitter`] once per turn. Nothing in this crate mutates a snapshot;
//! every action is expressed as a command.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum thrust magnitude a unit may apply in a single turn.
pub const MAX_SPEED: f64 = 7.0;

/// Collision radius of every unit.
pub const SHIP_RADIUS: f64 = 0.5;

/// Distance beyond a planet's rim within which a unit may start docking.
pub const DOCK_RADIUS: f64 = 4.0;

/// Padding added around obstacles when testing whether a straight path is clear.
pub const FORECAST_FUDGE: f64 = SHIP_RADIUS + 0.1;

/// Identifier assigned to a player taking part in the match.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a unit. Stable across turns.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a planet.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlanetId(u32);

impl PlanetId {
    /// Creates a new planet identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Point on the continuous game map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    /// Creates a new position from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Heading from `self` toward `other` in radians, measured from the positive x axis.
    #[must_use]
    pub fn angle_to(self, other: Position) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

/// Docking lifecycle of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockingStatus {
    /// Free to move.
    Undocked,
    /// Attaching to a planet.
    Docking,
    /// Attached and producing.
    Docked,
    /// Detaching from a planet.
    Undocking,
}

/// Mobile entity owned by a player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Identifier that remains stable across turns.
    pub id: UnitId,
    /// Player controlling the unit.
    pub owner: PlayerId,
    /// Current location of the unit's centre.
    pub position: Position,
    /// Docking lifecycle stage.
    pub docking: DockingStatus,
}

impl Unit {
    /// Reports whether the unit is free to move this turn.
    #[must_use]
    pub fn is_undocked(&self) -> bool {
        self.docking == DockingStatus::Undocked
    }

    /// Reports whether the unit is close enough to `planet` to begin docking.
    #[must_use]
    pub fn can_dock(&self, planet: &Planet) -> bool {
        self.position.distance_to(planet.position) <= planet.radius + DOCK_RADIUS + SHIP_RADIUS
    }
}

/// Stationary capturable entity with finite docking capacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Identifier of the planet.
    pub id: PlanetId,
    /// Location of the planet's centre.
    pub position: Position,
    /// Radius of the planet's body.
    pub radius: f64,
    /// Player owning the planet, if any.
    pub owner: Option<PlayerId>,
    /// Total docking slots offered by the planet.
    pub docking_spots: u32,
    /// Units currently docked at the planet.
    #[serde(default)]
    pub docked_units: Vec<UnitId>,
}

impl Planet {
    /// Number of units currently occupying docking slots.
    #[must_use]
    pub fn docked_count(&self) -> u32 {
        u32::try_from(self.docked_units.len()).unwrap_or(u32::MAX)
    }

    /// Docking slots not occupied at snapshot time.
    #[must_use]
    pub fn free_spots(&self) -> u32 {
        self.docking_spots.saturating_sub(self.docked_count())
    }

    /// Reports whether every docking slot is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_spots() == 0
    }

    /// Reports whether any player owns the planet.
    #[must_use]
    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }
}

/// Entity that can be located and attributed to an owner for target searches.
pub trait Targetable {
    /// Location used for distance comparisons.
    fn position(&self) -> Position;

    /// Owner of the entity, `None` when unowned.
    fn owner(&self) -> Option<PlayerId>;

    /// Body radius used when computing approach points.
    fn radius(&self) -> f64;
}

impl Targetable for Unit {
    fn position(&self) -> Position {
        self.position
    }

    fn owner(&self) -> Option<PlayerId> {
        Some(self.owner)
    }

    fn radius(&self) -> f64 {
        SHIP_RADIUS
    }
}

impl Targetable for Planet {
    fn position(&self) -> Position {
        self.position
    }

    fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    fn radius(&self) -> f64 {
        self.radius
    }
}

impl<T: Targetable + ?Sized> Targetable for &T {
    fn position(&self) -> Position {
        (**self).position()
    }

    fn owner(&self) -> Option<PlayerId> {
        (**self).owner()
    }

    fn radius(&self) -> f64 {
        (**self).radius()
    }
}

/// Everything visible to one player during one turn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Player the engine is deciding for.
    pub me: PlayerId,
    /// Width of the map in world units.
    pub width: f64,
    /// Height of the map in world units.
    pub height: f64,
    /// Every unit on the map, friendly and hostile.
    #[serde(default)]
    pub units: Vec<Unit>,
    /// Every planet on the map.
    #[serde(default)]
    pub planets: Vec<Planet>,
}

/// Instruction issued to a single unit for the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Moves the unit along a heading.
    Thrust {
        /// Unit receiving the order.
        unit: UnitId,
        /// Whole units of distance to travel, never above [`MAX_SPEED`].
        magnitude: u32,
        /// Heading in whole degrees within `0..360`.
        angle: u32,
    },
    /// Starts docking the unit at a planet.
    Dock {
        /// Unit receiving the order.
        unit: UnitId,
        /// Planet to dock at.
        planet: PlanetId,
    },
}

impl Command {
    /// Unit the command is addressed to.
    #[must_use]
    pub const fn unit(&self) -> UnitId {
        match self {
            Self::Thrust { unit, .. } | Self::Dock { unit, .. } => *unit,
        }
    }

    /// Reports whether the command is a dock order.
    #[must_use]
    pub const fn is_dock(&self) -> bool {
        matches!(self, Self::Dock { .. })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thrust {
                unit,
                magnitude,
                angle,
            } => write!(f, "t {} {} {}", unit.get(), magnitude, angle),
            Self::Dock { unit, planet } => write!(f, "d {} {}", unit.get(), planet.get()),
        }
    }
}

/// Movement collaborator that turns a desired destination into a thrust command.
///
/// Implementations may refuse by returning `None` when no legal path exists
/// within their own search budget. A refusal is an ordinary outcome, not an
/// error.
pub trait Navigator {
    /// Attempts to produce a movement command carrying `unit` toward `destination`.
    fn move_toward(
        &self,
        unit: &Unit,
        destination: Position,
        max_speed: f64,
        avoid_units: bool,
        snapshot: &WorldSnapshot,
    ) -> Option<Command>;

    /// Produces a dock command. Callers verify adjacency and capacity first.
    fn dock(&self, unit: &Unit, planet: &Planet) -> Command {
        Command::Dock {
            unit: unit.id,
            planet: planet.id,
        }
    }
}

/// Supplies one world snapshot per turn.
pub trait SnapshotSource {
    /// Blocks until the next snapshot is available.
    ///
    /// Returns `Ok(None)` once the match has ended.
    fn next_snapshot(&mut self) -> Result<Option<WorldSnapshot>, TransportError>;
}

/// Transmits the commands decided for a turn.
pub trait CommandEmitter {
    /// Sends the ordered command batch. Called exactly once per turn, even when empty.
    fn emit(&mut self, commands: &[Command]) -> Result<(), TransportError>;
}

/// Failures reported by the transport collaborators.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection to the judge is gone.
    #[error("transport closed")]
    Closed,
    /// A snapshot or acknowledgement could not be interpreted.
    #[error("malformed payload: {0}")]
    Malformed(String),
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Reports whether the session cannot continue after this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Closed | Self::Io(_))
    }
}

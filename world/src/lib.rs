#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Read-only per-turn world view for the fleet policy engine.
//!
//! A [`World`] wraps one [`WorldSnapshot`] for the duration of a turn. It is
//! never mutated after construction: systems read it through the [`query`]
//! functions and respond with commands.

mod geometry;
mod navigation;

use std::collections::HashMap;

use fleet_policy_core::{PlanetId, UnitId, WorldSnapshot};

pub use geometry::{anti_centroid, approach_point, centroid, segment_hits_circle};
pub use navigation::DirectNavigator;

/// Indexed, read-only view over the snapshot received for the current turn.
#[derive(Debug)]
pub struct World {
    snapshot: WorldSnapshot,
    unit_index: HashMap<UnitId, usize>,
    planet_index: HashMap<PlanetId, usize>,
}

impl World {
    /// Builds the turn view, ordering units and planets by identifier.
    #[must_use]
    pub fn new(mut snapshot: WorldSnapshot) -> Self {
        snapshot.units.sort_by_key(|unit| unit.id);
        snapshot.planets.sort_by_key(|planet| planet.id);

        let unit_index = snapshot
            .units
            .iter()
            .enumerate()
            .map(|(index, unit)| (unit.id, index))
            .collect();
        let planet_index = snapshot
            .planets
            .iter()
            .enumerate()
            .map(|(index, planet)| (planet.id, index))
            .collect();

        Self {
            snapshot,
            unit_index,
            planet_index,
        }
    }
}

/// Query functions that provide read-only access to the turn view.
pub mod query {
    use fleet_policy_core::{Planet, PlanetId, PlayerId, Position, Unit, UnitId, WorldSnapshot};

    use super::World;

    /// Player the engine decides for.
    #[must_use]
    pub fn me(world: &World) -> PlayerId {
        world.snapshot.me
    }

    /// Underlying snapshot, ordered by identifier.
    #[must_use]
    pub fn snapshot(world: &World) -> &WorldSnapshot {
        &world.snapshot
    }

    /// Larger of the map's two dimensions.
    #[must_use]
    pub fn map_span(world: &World) -> f64 {
        world.snapshot.width.max(world.snapshot.height)
    }

    /// Looks up a unit by identifier.
    #[must_use]
    pub fn unit(world: &World, id: UnitId) -> Option<&Unit> {
        world
            .unit_index
            .get(&id)
            .and_then(|index| world.snapshot.units.get(*index))
    }

    /// Looks up a planet by identifier.
    #[must_use]
    pub fn planet(world: &World, id: PlanetId) -> Option<&Planet> {
        world
            .planet_index
            .get(&id)
            .and_then(|index| world.snapshot.planets.get(*index))
    }

    /// Every unit controlled by the engine's player, in identifier order.
    pub fn my_units(world: &World) -> impl Iterator<Item = &Unit> + '_ {
        let me = me(world);
        world.snapshot.units.iter().filter(move |unit| unit.owner == me)
    }

    /// Controlled units that are free to move, in identifier order.
    pub fn my_undocked_units(world: &World) -> impl Iterator<Item = &Unit> + '_ {
        my_units(world).filter(|unit| unit.is_undocked())
    }

    /// Every unit controlled by another player, in identifier order.
    pub fn enemy_units(world: &World) -> impl Iterator<Item = &Unit> + '_ {
        let me = me(world);
        world.snapshot.units.iter().filter(move |unit| unit.owner != me)
    }

    /// Every planet on the map, in identifier order.
    pub fn planets(world: &World) -> impl Iterator<Item = &Planet> + '_ {
        world.snapshot.planets.iter()
    }

    /// First planet, by identifier, that `unit` may dock at right now.
    ///
    /// A planet qualifies when the unit is adjacent to it and it is either
    /// unowned or owned by the engine's player with at least one free slot.
    #[must_use]
    pub fn dockable_planet<'w>(world: &'w World, unit: &Unit) -> Option<&'w Planet> {
        let me = me(world);
        planets(world).find(|planet| {
            if !unit.can_dock(planet) {
                return false;
            }
            match planet.owner {
                None => true,
                Some(owner) => owner == me && !planet.is_full(),
            }
        })
    }

    /// Mean position of every controlled unit, `None` when the player has no units.
    #[must_use]
    pub fn my_centroid(world: &World) -> Option<Position> {
        super::centroid(my_units(world).map(|unit| unit.position))
    }

    /// Partitions the turn view into the candidate sets the decision stages search.
    #[must_use]
    pub fn roster(world: &World) -> Roster<'_> {
        let me = me(world);
        let mut roster = Roster::default();

        for unit in &world.snapshot.units {
            if unit.owner == me {
                continue;
            }
            roster.enemy_units.push(unit);
            if unit.is_undocked() {
                roster.enemy_undocked += 1;
            } else {
                roster.enemy_docked += 1;
            }
        }

        for planet in &world.snapshot.planets {
            match planet.owner {
                None => roster.unowned_planets.push(planet),
                Some(owner) if owner == me => roster.owned_planets.push(planet),
                Some(_) => roster.enemy_planets.push(planet),
            }
        }

        roster
    }

    /// Candidate sets derived once per turn, each ordered by identifier.
    #[derive(Clone, Debug, Default)]
    pub struct Roster<'w> {
        /// Units controlled by other players.
        pub enemy_units: Vec<&'w Unit>,
        /// Number of enemy units that are docking, docked or undocking.
        pub enemy_docked: usize,
        /// Number of enemy units free to move.
        pub enemy_undocked: usize,
        /// Planets owned by the engine's player.
        pub owned_planets: Vec<&'w Planet>,
        /// Planets owned by nobody.
        pub unowned_planets: Vec<&'w Planet>,
        /// Planets owned by another player.
        pub enemy_planets: Vec<&'w Planet>,
    }
}

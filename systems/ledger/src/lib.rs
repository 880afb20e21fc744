#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-turn docking capacity and targeting contention bookkeeping.
//!
//! The ledger is rebuilt from the planet set at the start of every turn and
//! dropped when the turn ends. It never reads the world again after
//! construction: reservations made earlier in the turn are the only thing that
//! changes its answers.

use std::collections::BTreeMap;

use fleet_policy_core::{Planet, PlanetId};

/// Tracks remaining dock slots and expansion contention for one turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceLedger {
    entries: BTreeMap<PlanetId, LedgerEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LedgerEntry {
    remaining: u32,
    targeted: u32,
    spots: u32,
    unowned: bool,
}

impl ResourceLedger {
    /// Seeds the ledger with each planet's free docking capacity.
    #[must_use]
    pub fn new<'a, I>(planets: I) -> Self
    where
        I: IntoIterator<Item = &'a Planet>,
    {
        let entries = planets
            .into_iter()
            .map(|planet| {
                (
                    planet.id,
                    LedgerEntry {
                        remaining: planet.free_spots(),
                        targeted: 0,
                        spots: planet.docking_spots,
                        unowned: !planet.is_owned(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Claims one docking slot on `planet` for this turn.
    ///
    /// Returns `false` without changing anything when no slot remains or the
    /// planet is unknown.
    pub fn reserve_dock(&mut self, planet: PlanetId) -> bool {
        match self.entries.get_mut(&planet) {
            Some(entry) if entry.remaining > 0 => {
                entry.remaining -= 1;
                true
            }
            _ => false,
        }
    }

    /// Records that one more unit has been sent toward `planet` this turn.
    pub fn note_targeted(&mut self, planet: PlanetId) {
        if let Some(entry) = self.entries.get_mut(&planet) {
            entry.targeted = entry.targeted.saturating_add(1);
        }
    }

    /// Docking slots still available on `planet` this turn.
    #[must_use]
    pub fn remaining(&self, planet: PlanetId) -> u32 {
        self.entries.get(&planet).map_or(0, |entry| entry.remaining)
    }

    /// Units already sent toward `planet` this turn.
    #[must_use]
    pub fn targeted(&self, planet: PlanetId) -> u32 {
        self.entries.get(&planet).map_or(0, |entry| entry.targeted)
    }

    /// Reports whether an unowned planet has drawn more units than it has slots.
    ///
    /// Oversubscribed planets are dropped from expansion candidates for the
    /// rest of the turn when diversification is enabled.
    #[must_use]
    pub fn is_oversubscribed(&self, planet: PlanetId) -> bool {
        self.entries
            .get(&planet)
            .is_some_and(|entry| entry.unowned && entry.targeted > entry.spots)
    }
}

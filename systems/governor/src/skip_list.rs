use std::collections::BTreeSet;

use fleet_policy_core::UnitId;

/// Units that found nothing to do on the previous turn.
///
/// Entries survive exactly one turn boundary: the governor reads the list
/// while preparing a turn, clears it, and refills it from that turn's
/// no-work outcomes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkipList {
    units: BTreeSet<UnitId>,
}

impl SkipList {
    /// Reports whether `unit` sits out the current turn.
    #[must_use]
    pub fn contains(&self, unit: UnitId) -> bool {
        self.units.contains(&unit)
    }

    /// Marks `unit` to sit out the next turn.
    pub fn record(&mut self, unit: UnitId) {
        let _ = self.units.insert(unit);
    }

    /// Forgets every entry.
    pub fn clear(&mut self) {
        self.units.clear();
    }

    /// Number of listed units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Reports whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Listed units in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.iter().copied()
    }
}

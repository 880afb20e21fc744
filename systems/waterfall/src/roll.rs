//! Deterministic per-unit rolls that spread behaviour classes across the fleet.

use fleet_policy_core::UnitId;

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Stable 64-bit hash of a unit identifier.
#[must_use]
pub fn behavior_hash(unit: UnitId) -> u64 {
    splitmix64(u64::from(unit.get()))
}

/// Stable value in `0..100` used to admit a unit into percentage-gated stages.
#[must_use]
pub fn behavior_roll(unit: UnitId) -> u8 {
    (behavior_hash(unit) % 100) as u8
}

/// Reports whether `unit` checks for docking on `turn` when one in `ratio` units does.
///
/// The hash mixes the turn in, so every unit is admitted on some turn.
#[must_use]
pub fn dock_admitted(unit: UnitId, turn: u32, ratio: u32) -> bool {
    if ratio <= 1 {
        return true;
    }
    let mixed = splitmix64(u64::from(unit.get()) ^ (u64::from(turn) << 32));
    mixed % u64::from(ratio) == 0
}

#[cfg(test)]
mod tests {
    use super::{behavior_hash, behavior_roll, dock_admitted, splitmix64};
    use fleet_policy_core::UnitId;

    #[test]
    fn splitmix_matches_reference_values() {
        assert_eq!(splitmix64(0), 0xe220_a839_7b1d_cdaf);
        assert_eq!(splitmix64(1), 0x910a_2dec_8902_5cc1);
    }

    #[test]
    fn rolls_are_stable_and_bounded() {
        for id in 0..500 {
            let unit = UnitId::new(id);
            assert_eq!(behavior_hash(unit), behavior_hash(unit));
            assert!(behavior_roll(unit) < 100);
        }
    }

    #[test]
    fn rolls_spread_across_the_range() {
        let below_half = (0..1000)
            .filter(|id| behavior_roll(UnitId::new(*id)) < 50)
            .count();
        assert!((400..600).contains(&below_half), "got {below_half}");
    }

    #[test]
    fn unit_ratio_admits_everyone() {
        assert!((0..50).all(|id| dock_admitted(UnitId::new(id), 7, 1)));
        assert!((0..50).all(|id| dock_admitted(UnitId::new(id), 7, 0)));
    }

    #[test]
    fn every_unit_is_eventually_admitted() {
        for id in 0..20 {
            let unit = UnitId::new(id);
            assert!((1..200).any(|turn| dock_admitted(unit, turn, 4)));
        }
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure nearest-target search shared by every decision stage.

use fleet_policy_core::Targetable;

/// Returns the candidate closest to `source` that lies strictly within `max_range`.
///
/// Candidates owned by the same player as `source` are skipped; two unowned
/// entities count as sharing an owner. When several candidates are equally
/// close the first one encountered wins, so callers that need a stable
/// result pass candidates in identifier order.
pub fn find_nearest<S, C, I>(source: &S, candidates: I, max_range: f64) -> Option<C>
where
    S: Targetable + ?Sized,
    C: Targetable,
    I: IntoIterator<Item = C>,
{
    let origin = source.position();
    let owner = source.owner();

    let mut best: Option<Best<C>> = None;
    for candidate in candidates {
        if candidate.owner() == owner {
            continue;
        }

        let distance = origin.distance_to(candidate.position());
        let bound = best.as_ref().map_or(max_range, |current| current.distance);
        if distance < bound {
            best = Some(Best {
                distance,
                candidate,
            });
        }
    }

    best.map(|best| best.candidate)
}

struct Best<C> {
    distance: f64,
    candidate: C,
}

use fleet_policy_core::{
    Command, Navigator, Planet, PlayerId, Position, Targetable, Unit, MAX_SPEED, SHIP_RADIUS,
};
use fleet_policy_system_ledger::ResourceLedger;
use fleet_policy_system_targeting::find_nearest;
use fleet_policy_world::{anti_centroid, approach_point, query};

use crate::roll::{behavior_hash, behavior_roll, dock_admitted};
use crate::{Decision, DecisionContext, Outcome, Stage};

const ENGAGE_GAP: f64 = 2.0;
const EXPANSION_GAP: f64 = 2.0;
const IMPACT_GAP: f64 = -1.0;
const COLLIDE_GAP: f64 = 0.0;

pub(crate) enum Flow {
    Continue,
    Emit(Command),
    Halt(Decision),
}

pub(crate) struct Step<'a, 'w> {
    pub(crate) unit: &'a Unit,
    pub(crate) context: &'a DecisionContext<'w>,
    pub(crate) ledger: &'a mut ResourceLedger,
    pub(crate) navigator: &'a dyn Navigator,
    pub(crate) refusals: u32,
}

impl Step<'_, '_> {
    pub(crate) fn finish(self, decision: Decision) -> Outcome {
        Outcome {
            decision,
            refusals: self.refusals,
        }
    }

    fn cruise_speed(&self) -> f64 {
        self.context.profile.speed_fraction * MAX_SPEED
    }

    fn roll_admits(&self, percent: u8) -> bool {
        behavior_roll(self.unit.id) < percent
    }

    /// Asks the navigator for a move, counting a refusal when it declines.
    fn steer(&mut self, destination: Position, speed: f64, avoid_units: bool) -> Option<Command> {
        let command = self.navigator.move_toward(
            self.unit,
            destination,
            speed,
            avoid_units,
            query::snapshot(self.context.world),
        );
        if command.is_none() {
            self.refusals += 1;
        }
        command
    }
}

pub(crate) fn run(stage: Stage, step: &mut Step<'_, '_>) -> Flow {
    match stage {
        Stage::Opening => opening(step),
        Stage::Defensive => defensive(step),
        Stage::Dock => dock(step),
        Stage::DestroyPlanet => destroy_planet(step),
        Stage::Expansion => expansion(step),
        Stage::AntiShip => anti_ship(step),
    }
}

fn opening(step: &mut Step<'_, '_>) -> Flow {
    if step.context.turn != 1 {
        return Flow::Continue;
    }
    let Some(centre) = step.context.centroid else {
        return Flow::Continue;
    };

    let destination = anti_centroid(step.unit.position, centre);
    match step.steer(destination, MAX_SPEED, false) {
        Some(command) => Flow::Emit(command),
        None => Flow::Halt(Decision::Refused {
            stage: Stage::Opening,
        }),
    }
}

fn defensive(step: &mut Step<'_, '_>) -> Flow {
    let context = step.context;
    let Some(enemy) = find_nearest(
        step.unit,
        context.roster.enemy_units.iter().copied(),
        context.profile.defensive_radius,
    ) else {
        return Flow::Continue;
    };

    let destination = approach_point(step.unit.position, enemy.position, SHIP_RADIUS, ENGAGE_GAP);
    let speed = step.cruise_speed();
    step.steer(destination, speed, context.avoid_units)
        .map_or(Flow::Continue, Flow::Emit)
}

fn dock(step: &mut Step<'_, '_>) -> Flow {
    let context = step.context;
    if !dock_admitted(step.unit.id, context.turn, context.profile.dock_check_ratio) {
        return Flow::Continue;
    }
    let Some(planet) = query::dockable_planet(context.world, step.unit) else {
        return Flow::Continue;
    };

    if step.ledger.reserve_dock(planet.id) {
        Flow::Emit(step.navigator.dock(step.unit, planet))
    } else {
        Flow::Halt(Decision::DockWait)
    }
}

fn destroy_planet(step: &mut Step<'_, '_>) -> Flow {
    let context = step.context;
    if !step.roll_admits(context.profile.behavior.destroy_planet) {
        return Flow::Continue;
    }
    let Some(planet) = find_nearest(
        step.unit,
        context.roster.enemy_planets.iter().copied(),
        context.planet_reach,
    ) else {
        return Flow::Continue;
    };

    let destination = approach_point(step.unit.position, planet.position, planet.radius, IMPACT_GAP);
    step.steer(destination, MAX_SPEED, false)
        .map_or(Flow::Continue, Flow::Emit)
}

fn expansion(step: &mut Step<'_, '_>) -> Flow {
    let context = step.context;
    let profile = context.profile;
    if !step.roll_admits(profile.behavior.expansion) {
        return Flow::Continue;
    }

    let allowed = |planet: &&Planet| !profile.excluded_planets.contains(&planet.id);
    let ledger = &*step.ledger;
    let unowned = context
        .roster
        .unowned_planets
        .iter()
        .copied()
        .filter(allowed)
        .filter(|planet| !(profile.diversify_expansion && ledger.is_oversubscribed(planet.id)));

    let target = find_nearest(step.unit, unowned, profile.expansion_radius).or_else(|| {
        let spare = context
            .roster
            .owned_planets
            .iter()
            .copied()
            .filter(allowed)
            .filter(|planet| ledger.remaining(planet.id) > ledger.targeted(planet.id));
        find_nearest(&Anchor::at(step.unit.position), spare, context.planet_reach)
    });
    let Some(planet) = target else {
        return Flow::Continue;
    };

    let destination =
        approach_point(step.unit.position, planet.position, planet.radius, EXPANSION_GAP);
    let speed = step.cruise_speed();
    match step.steer(destination, speed, context.avoid_units) {
        Some(command) => {
            step.ledger.note_targeted(planet.id);
            Flow::Emit(command)
        }
        None => Flow::Continue,
    }
}

fn anti_ship(step: &mut Step<'_, '_>) -> Flow {
    let context = step.context;
    let behavior = context.profile.behavior;
    let docked_enemies = context.roster.enemy_docked > 0;

    let mut victim = None;
    if docked_enemies && step.roll_admits(behavior.collide_docked) {
        victim = docked_victim(step);
        if let Some(target) = victim {
            let destination =
                approach_point(step.unit.position, target.position, SHIP_RADIUS, COLLIDE_GAP);
            let speed = step.cruise_speed();
            if let Some(command) = step.steer(destination, speed, false) {
                return Flow::Emit(command);
            }
        }
    }

    if victim.is_none() && docked_enemies && step.roll_admits(behavior.harass_docked) {
        victim = docked_victim(step);
    }

    if victim.is_none() {
        victim = find_nearest(
            step.unit,
            context.roster.enemy_units.iter().copied(),
            context.ship_reach,
        );
    }

    let Some(target) = victim else {
        return Flow::Halt(Decision::NoWork);
    };

    let gap = ENGAGE_GAP + f64::from(step.unit.id.get() % 3) * 0.5;
    let destination = approach_point(step.unit.position, target.position, SHIP_RADIUS, gap);
    let speed = step.cruise_speed();
    step.steer(destination, speed, context.avoid_units)
        .map_or(Flow::Halt(Decision::NoWork), Flow::Emit)
}

/// Picks one unit docked at the nearest enemy planet, chosen by the unit's hash.
fn docked_victim<'w>(step: &Step<'_, 'w>) -> Option<&'w Unit> {
    let context = step.context;
    let planet = find_nearest(
        step.unit,
        context.roster.enemy_planets.iter().copied(),
        context.docked_target_reach,
    )?;
    if planet.docked_units.is_empty() {
        return None;
    }
    let index = behavior_hash(step.unit.id) % planet.docked_units.len() as u64;
    let victim = planet.docked_units.get(usize::try_from(index).ok()?)?;
    query::unit(context.world, *victim)
}

/// Ownerless search origin, used when the candidates belong to the searching player.
struct Anchor {
    position: Position,
}

impl Anchor {
    fn at(position: Position) -> Self {
        Self { position }
    }
}

impl Targetable for Anchor {
    fn position(&self) -> Position {
        self.position
    }

    fn owner(&self) -> Option<PlayerId> {
        None
    }

    fn radius(&self) -> f64 {
        0.0
    }
}

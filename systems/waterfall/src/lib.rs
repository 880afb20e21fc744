#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-unit decision waterfall.
//!
//! A unit walks an ordered list of stages. Each stage either issues a command,
//! halts the unit without a command, or passes the unit on to the next stage.
//! Navigation refusals are absorbed: the stage behaves as if it found nothing,
//! except where noted on [`Stage`].

pub mod roll;
mod stages;

use std::fmt;

use fleet_policy_core::{Command, Navigator, Position, Unit};
use fleet_policy_system_ledger::ResourceLedger;
use fleet_policy_system_phase_profile::PhaseProfile;
use fleet_policy_world::{
    query::{self, Roster},
    World,
};

/// Decision stages in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// First-turn spread away from the fleet centroid. Always halts the unit.
    Opening,
    /// Engages enemy units inside the defensive radius.
    Defensive,
    /// Docks at an adjacent planet. Halts the unit when entered.
    Dock,
    /// Flies into the nearest enemy planet.
    DestroyPlanet,
    /// Heads for an unowned planet or an owned planet with spare capacity.
    Expansion,
    /// Hunts enemy units, preferring units docked at enemy planets.
    /// Ends the waterfall: a missing or refused move is no work.
    AntiShip,
}

impl Stage {
    /// Every stage in the order the waterfall evaluates them.
    pub const ALL: [Stage; 6] = [
        Stage::Opening,
        Stage::Defensive,
        Stage::Dock,
        Stage::DestroyPlanet,
        Stage::Expansion,
        Stage::AntiShip,
    ];

    /// Short label used in logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Stage::Opening => "opening",
            Stage::Defensive => "defensive",
            Stage::Dock => "dock",
            Stage::DestroyPlanet => "destroy_planet",
            Stage::Expansion => "expansion",
            Stage::AntiShip => "anti_ship",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final verdict for one unit on one turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decision {
    /// A stage issued a command.
    Command {
        /// Stage that produced the command.
        stage: Stage,
        /// Command to emit.
        command: Command,
    },
    /// The unit was adjacent to a planet whose remaining slots were already claimed.
    DockWait,
    /// A halting stage committed to a move the navigator refused.
    ///
    /// Only the opening spread halts on refusal; every other stage falls
    /// through as if it had found nothing.
    Refused {
        /// Stage whose move was refused.
        stage: Stage,
    },
    /// No stage produced a command, including when the last stage's move was refused.
    NoWork,
}

impl Decision {
    /// Command carried by the decision, if any.
    #[must_use]
    pub fn command(&self) -> Option<Command> {
        match self {
            Decision::Command { command, .. } => Some(*command),
            _ => None,
        }
    }
}

/// Decision plus the number of navigation refusals absorbed along the way.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outcome {
    /// Verdict for the unit.
    pub decision: Decision,
    /// Stages whose move the navigator refused, including a final refusal.
    pub refusals: u32,
}

/// Turn-wide inputs shared by every unit's waterfall.
#[derive(Debug)]
pub struct DecisionContext<'w> {
    world: &'w World,
    roster: Roster<'w>,
    profile: &'w PhaseProfile,
    turn: u32,
    avoid_units: bool,
    centroid: Option<Position>,
    ship_reach: f64,
    planet_reach: f64,
    docked_target_reach: f64,
}

impl<'w> DecisionContext<'w> {
    /// Prepares the turn's candidate sets and resolved ranges.
    ///
    /// `moving_units` is the number of the player's undocked units eligible
    /// this turn; together with the enemy's undocked units it decides whether
    /// moves steer around other units.
    #[must_use]
    pub fn new(world: &'w World, profile: &'w PhaseProfile, turn: u32, moving_units: usize) -> Self {
        let roster = query::roster(world);
        let span = query::map_span(world);
        let avoid_units = moving_units + roster.enemy_undocked <= profile.avoid_units_threshold;

        Self {
            world,
            profile,
            turn,
            avoid_units,
            centroid: query::my_centroid(world),
            ship_reach: profile.ship_reach.resolve(span),
            planet_reach: profile.planet_reach.resolve(span),
            docked_target_reach: profile.docked_target_reach.resolve(span),
            roster,
        }
    }

    /// Turn number the context was built for.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Whether ordinary moves steer around other units this turn.
    #[must_use]
    pub fn avoid_units(&self) -> bool {
        self.avoid_units
    }

    /// Profile governing the turn.
    #[must_use]
    pub fn profile(&self) -> &PhaseProfile {
        self.profile
    }
}

/// Runs the waterfall for `unit`, reserving ledger capacity as stages commit.
pub fn decide(
    unit: &Unit,
    context: &DecisionContext<'_>,
    ledger: &mut ResourceLedger,
    navigator: &dyn Navigator,
) -> Outcome {
    let mut step = stages::Step {
        unit,
        context,
        ledger,
        navigator,
        refusals: 0,
    };

    for stage in Stage::ALL {
        match stages::run(stage, &mut step) {
            stages::Flow::Continue => continue,
            stages::Flow::Emit(command) => {
                tracing::debug!(unit = unit.id.get(), %stage, %command, "unit decided");
                return step.finish(Decision::Command { stage, command });
            }
            stages::Flow::Halt(decision) => {
                tracing::debug!(unit = unit.id.get(), %stage, ?decision, "unit halted");
                return step.finish(decision);
            }
        }
    }

    tracing::debug!(unit = unit.id.get(), "no work found");
    step.finish(Decision::NoWork)
}

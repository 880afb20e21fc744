#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn budget governor.
//!
//! A turn moves through `PREPARING → ITERATING → FLUSHING → DONE`, encoded as
//! the typestate chain [`Governor::prepare`] → [`PreparedTurn::iterate`] →
//! [`IteratedTurn::flush`]. The governor owns the only state that outlives a
//! turn: the turn counter and the [`SkipList`].

mod clock;
mod session;
mod skip_list;

use std::time::Duration;

use fleet_policy_core::{
    Command, CommandEmitter, Navigator, TransportError, UnitId, WorldSnapshot,
};
use fleet_policy_system_ledger::ResourceLedger;
use fleet_policy_system_phase_profile::{PhaseBand, PhaseTable, UnitSampling};
use fleet_policy_system_waterfall::{decide, Decision, DecisionContext};
use fleet_policy_world::{query, World};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use clock::{Clock, WallClock};
pub use session::Session;
pub use skip_list::SkipList;

/// Configuration owned by the governor for the whole match.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GovernorConfig {
    /// Phase bands consulted once per turn.
    pub table: PhaseTable,
    /// Seed for phases that evaluate a sampled subset of units.
    pub shuffle_seed: u64,
}

/// Why the iteration loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Every unit in the evaluation order was decided.
    Completed,
    /// The wall-clock budget ran out.
    TimeBudget,
    /// The evaluation or command ceiling was reached.
    ActionLimit,
}

/// Operational summary of one turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnReport {
    /// Turn number, starting at 1.
    pub turn: u32,
    /// Name of the phase band that governed the turn.
    pub band: String,
    /// Units run through the waterfall.
    pub evaluated: usize,
    /// Commands handed to the emitter.
    pub commands: usize,
    /// Units that waited for a dock slot.
    pub dock_waits: usize,
    /// Navigation refusals absorbed by the waterfall.
    pub refusals: u32,
    /// Units recorded in the skip list for the next turn.
    pub no_work: usize,
    /// Units excluded because they were on the skip list.
    pub skipped: usize,
    /// Eligible units left out of the evaluation order by the band's unit cap.
    pub sampled_out: usize,
    /// Units left undecided when the loop stopped early.
    pub abandoned: usize,
    /// Why the loop stopped.
    pub stop: StopReason,
    /// Clock time spent between preparation and flushing.
    pub elapsed: Duration,
}

/// Per-turn bookkeeping that is discarded when the turn ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnContext {
    turn: u32,
    started_at: Duration,
    evaluated: usize,
}

impl TurnContext {
    /// Starts a turn at the clock's current reading.
    #[must_use]
    pub fn start(turn: u32, clock: &dyn Clock) -> Self {
        Self {
            turn,
            started_at: clock.now(),
            evaluated: 0,
        }
    }

    /// Turn number.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Units evaluated so far.
    #[must_use]
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Time since the turn started.
    #[must_use]
    pub fn elapsed(&self, clock: &dyn Clock) -> Duration {
        clock.now().saturating_sub(self.started_at)
    }

    fn record_evaluation(&mut self) {
        self.evaluated += 1;
    }
}

/// Drives turns and carries the skip list across turn boundaries.
#[derive(Debug, Default)]
pub struct Governor {
    config: GovernorConfig,
    turn: u32,
    skip_list: SkipList,
}

impl Governor {
    /// Creates a governor whose first turn is turn 1.
    #[must_use]
    pub fn new(config: GovernorConfig) -> Self {
        Self {
            config,
            turn: 0,
            skip_list: SkipList::default(),
        }
    }

    /// Makes the next prepared turn carry `turn` as its number.
    #[must_use]
    pub fn starting_at(mut self, turn: u32) -> Self {
        self.turn = turn.saturating_sub(1);
        self
    }

    /// Number of the most recently prepared turn, zero before the first.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Units that will sit out the next turn.
    #[must_use]
    pub fn skip_list(&self) -> &SkipList {
        &self.skip_list
    }

    /// Prepares the next turn: selects the phase band, seeds the ledger and
    /// fixes the evaluation order.
    pub fn prepare(&mut self, snapshot: WorldSnapshot, clock: &dyn Clock) -> PreparedTurn<'_> {
        self.turn += 1;
        let turn = self.turn;
        let context = TurnContext::start(turn, clock);
        let world = World::new(snapshot);

        let mut skipped = 0;
        let mut eligible = Vec::new();
        for unit in query::my_undocked_units(&world) {
            if self.skip_list.contains(unit.id) {
                skipped += 1;
            } else {
                eligible.push(unit.id);
            }
        }
        self.skip_list.clear();

        let fleet = eligible.len();
        let band = self.config.table.select_band(turn, fleet);
        let order = evaluation_order(band, eligible, self.config.shuffle_seed, turn);
        let sampled_out = fleet - order.len();
        let ledger = ResourceLedger::new(query::planets(&world));

        PreparedTurn {
            band,
            skip_list: &mut self.skip_list,
            world,
            ledger,
            order,
            context,
            fleet,
            skipped,
            sampled_out,
        }
    }

    /// Prepares, iterates and flushes one turn.
    pub fn play_turn(
        &mut self,
        snapshot: WorldSnapshot,
        navigator: &dyn Navigator,
        clock: &dyn Clock,
        emitter: &mut dyn CommandEmitter,
    ) -> Result<TurnReport, TransportError> {
        self.prepare(snapshot, clock)
            .iterate(navigator, clock)
            .flush(emitter)
    }
}

/// Picks at most `max_units` eligible units and sorts them by id.
fn evaluation_order(
    band: &PhaseBand,
    mut eligible: Vec<UnitId>,
    seed: u64,
    turn: u32,
) -> Vec<UnitId> {
    let limit = band.profile.max_units;
    if eligible.len() > limit {
        match band.profile.sampling {
            UnitSampling::SeededSample => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed ^ u64::from(turn).rotate_left(32));
                let (chosen, _) = eligible.partial_shuffle(&mut rng, limit);
                let mut chosen = chosen.to_vec();
                chosen.sort_unstable();
                return chosen;
            }
            UnitSampling::SortedPrefix => {
                eligible.sort_unstable();
                eligible.truncate(limit);
                return eligible;
            }
        }
    }
    eligible.sort_unstable();
    eligible
}

/// Turn in the `PREPARING` state, holding everything the loop needs.
#[must_use = "a prepared turn does nothing until it is iterated and flushed"]
#[derive(Debug)]
pub struct PreparedTurn<'g> {
    band: &'g PhaseBand,
    skip_list: &'g mut SkipList,
    world: World,
    ledger: ResourceLedger,
    order: Vec<UnitId>,
    context: TurnContext,
    fleet: usize,
    skipped: usize,
    sampled_out: usize,
}

impl PreparedTurn<'_> {
    /// Phase band selected for the turn.
    #[must_use]
    pub fn band(&self) -> &PhaseBand {
        self.band
    }

    /// Units in the order they will be evaluated.
    #[must_use]
    pub fn order(&self) -> &[UnitId] {
        &self.order
    }

    /// Runs the waterfall over the evaluation order until it is exhausted or a
    /// budget runs out. The clock is read before every unit.
    pub fn iterate(self, navigator: &dyn Navigator, clock: &dyn Clock) -> IteratedTurn {
        let PreparedTurn {
            band,
            skip_list,
            world,
            mut ledger,
            order,
            mut context,
            fleet,
            skipped,
            sampled_out,
        } = self;
        let profile = &band.profile;
        let decisions = DecisionContext::new(&world, profile, context.turn(), fleet);
        let budget =
            Duration::try_from_secs_f64(profile.time_budget_secs).unwrap_or(Duration::ZERO);

        let mut commands: Vec<Command> = Vec::new();
        let mut report = TurnReport {
            turn: context.turn(),
            band: band.name.clone(),
            evaluated: 0,
            commands: 0,
            dock_waits: 0,
            refusals: 0,
            no_work: 0,
            skipped,
            sampled_out,
            abandoned: 0,
            stop: StopReason::Completed,
            elapsed: Duration::ZERO,
        };

        for (index, id) in order.iter().enumerate() {
            if context.elapsed(clock) >= budget {
                report.stop = StopReason::TimeBudget;
            } else if context.evaluated() >= profile.max_units
                || commands.len() >= profile.max_units
            {
                report.stop = StopReason::ActionLimit;
            }
            if report.stop != StopReason::Completed {
                report.abandoned = order.len() - index;
                break;
            }

            let Some(unit) = query::unit(&world, *id) else {
                continue;
            };
            context.record_evaluation();
            let outcome = decide(unit, &decisions, &mut ledger, navigator);
            report.refusals += outcome.refusals;
            match outcome.decision {
                Decision::Command { command, .. } => commands.push(command),
                Decision::DockWait => report.dock_waits += 1,
                Decision::Refused { .. } => {}
                Decision::NoWork => {
                    report.no_work += 1;
                    skip_list.record(*id);
                }
            }
        }

        report.evaluated = context.evaluated();
        report.commands = commands.len();
        report.elapsed = context.elapsed(clock);
        if report.stop != StopReason::Completed {
            tracing::warn!(
                turn = report.turn,
                stop = ?report.stop,
                abandoned = report.abandoned,
                "turn budget exhausted"
            );
        }

        IteratedTurn { commands, report }
    }
}

/// Turn in the `FLUSHING` state: decisions are final and await emission.
#[must_use = "decided commands are lost unless the turn is flushed"]
#[derive(Debug)]
pub struct IteratedTurn {
    commands: Vec<Command>,
    report: TurnReport,
}

impl IteratedTurn {
    /// Commands in decision order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Hands the commands to `emitter` exactly once and closes the turn.
    pub fn flush(self, emitter: &mut dyn CommandEmitter) -> Result<TurnReport, TransportError> {
        let report = self.report;
        tracing::info!(
            turn = report.turn,
            band = %report.band,
            evaluated = report.evaluated,
            commands = report.commands,
            dock_waits = report.dock_waits,
            refusals = report.refusals,
            no_work = report.no_work,
            skipped = report.skipped,
            sampled_out = report.sampled_out,
            abandoned = report.abandoned,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "turn decided"
        );
        emitter.emit(&self.commands)?;
        Ok(report)
    }
}

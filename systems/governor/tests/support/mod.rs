#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::time::Duration;

use fleet_policy_core::{
    Command, CommandEmitter, DockingStatus, Navigator, Planet, PlanetId, PlayerId, Position,
    SnapshotSource, TransportError, Unit, UnitId, WorldSnapshot,
};
use fleet_policy_system_governor::Clock;

/// Clock that advances by a fixed step every time it is read.
pub struct SteppedClock {
    now: Cell<Duration>,
    step: Duration,
}

impl SteppedClock {
    pub fn new(step: Duration) -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            step,
        }
    }

    pub fn frozen() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> Duration {
        let current = self.now.get();
        self.now.set(current + self.step);
        current
    }
}

#[derive(Default)]
pub struct RecordingEmitter {
    pub batches: Vec<Vec<Command>>,
    pub fail_on: Option<usize>,
    pub fail_fatally: bool,
}

impl CommandEmitter for RecordingEmitter {
    fn emit(&mut self, commands: &[Command]) -> Result<(), TransportError> {
        let call = self.batches.len();
        self.batches.push(commands.to_vec());
        if self.fail_on != Some(call) {
            return Ok(());
        }
        if self.fail_fatally {
            Err(TransportError::Closed)
        } else {
            Err(TransportError::Malformed("rejected".to_owned()))
        }
    }
}

pub struct ScriptedSource {
    pub script: VecDeque<Result<Option<WorldSnapshot>, TransportError>>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Option<WorldSnapshot>, TransportError>>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl SnapshotSource for ScriptedSource {
    fn next_snapshot(&mut self) -> Result<Option<WorldSnapshot>, TransportError> {
        self.script.pop_front().unwrap_or(Ok(None))
    }
}

/// Navigator that never finds a path.
pub struct RefusingNavigator;

impl Navigator for RefusingNavigator {
    fn move_toward(
        &self,
        _unit: &Unit,
        _destination: Position,
        _max_speed: f64,
        _avoid_units: bool,
        _snapshot: &WorldSnapshot,
    ) -> Option<Command> {
        None
    }
}

pub fn unit(id: u32, owner: u32, x: f64, y: f64) -> Unit {
    Unit {
        id: UnitId::new(id),
        owner: PlayerId::new(owner),
        position: Position::new(x, y),
        docking: DockingStatus::Undocked,
    }
}

pub fn planet(id: u32, owner: Option<u32>, x: f64, y: f64, spots: u32, docked: &[u32]) -> Planet {
    Planet {
        id: PlanetId::new(id),
        position: Position::new(x, y),
        radius: 3.0,
        owner: owner.map(PlayerId::new),
        docking_spots: spots,
        docked_units: docked.iter().copied().map(UnitId::new).collect(),
    }
}

pub fn snapshot(units: Vec<Unit>, planets: Vec<Planet>) -> WorldSnapshot {
    WorldSnapshot {
        me: PlayerId::new(0),
        width: 240.0,
        height: 160.0,
        units,
        planets,
    }
}

/// Controlled units laid out on a grid far from any planet.
pub fn idle_fleet(count: u32) -> Vec<Unit> {
    (0..count)
        .map(|index| {
            let x = 100.0 + f64::from(index % 20) * 2.0;
            let y = 60.0 + f64::from(index / 20) * 2.0;
            unit(index + 1, 0, x, y)
        })
        .collect()
}

pub fn dock_commands_for(batch: &[Command], planet: PlanetId) -> usize {
    batch
        .iter()
        .filter(|command| matches!(command, Command::Dock { planet: target, .. } if *target == planet))
        .count()
}

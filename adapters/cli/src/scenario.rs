//! File-backed snapshot source and line-oriented command sink.

use std::{collections::VecDeque, fs, io::Write, path::Path};

use anyhow::{Context, Result};
use fleet_policy_core::{Command, CommandEmitter, SnapshotSource, TransportError, WorldSnapshot};
use serde_json::Value;

/// Replays a recorded match, one JSON snapshot per turn.
///
/// Entries are decoded lazily so a single corrupt turn surfaces as a
/// recoverable [`TransportError::Malformed`] instead of rejecting the file.
#[derive(Debug)]
pub(crate) struct ScenarioSource {
    turns: VecDeque<Value>,
}

impl ScenarioSource {
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("scenario {} is not a JSON array", path.display()))
    }

    pub(crate) fn from_json(contents: &str) -> Result<Self> {
        let turns: Vec<Value> = serde_json::from_str(contents)?;
        Ok(Self {
            turns: turns.into(),
        })
    }
}

impl SnapshotSource for ScenarioSource {
    fn next_snapshot(&mut self) -> Result<Option<WorldSnapshot>, TransportError> {
        let Some(turn) = self.turns.pop_front() else {
            return Ok(None);
        };
        serde_json::from_value(turn)
            .map(Some)
            .map_err(|error| TransportError::Malformed(error.to_string()))
    }
}

/// Writes each turn's commands as one space-separated line.
#[derive(Debug)]
pub(crate) struct LineEmitter<W> {
    out: W,
}

impl<W: Write> LineEmitter<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> CommandEmitter for LineEmitter<W> {
    fn emit(&mut self, commands: &[Command]) -> Result<(), TransportError> {
        let line = commands
            .iter()
            .map(Command::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{LineEmitter, ScenarioSource};
    use fleet_policy_core::{
        Command, CommandEmitter, PlanetId, SnapshotSource, TransportError, UnitId,
    };

    #[test]
    fn commands_share_one_line_per_turn() {
        let mut emitter = LineEmitter::new(Vec::new());
        emitter
            .emit(&[
                Command::Thrust {
                    unit: UnitId::new(1),
                    magnitude: 7,
                    angle: 90,
                },
                Command::Dock {
                    unit: UnitId::new(2),
                    planet: PlanetId::new(3),
                },
            ])
            .expect("write to vec");
        emitter.emit(&[]).expect("write to vec");
        assert_eq!(
            String::from_utf8(emitter.out).expect("utf8"),
            "t 1 7 90 d 2 3\n\n"
        );
    }

    #[test]
    fn corrupt_turns_are_recoverable() {
        let mut source = ScenarioSource::from_json(
            r#"[
                {"me": 0, "width": 100.0, "height": 80.0},
                {"me": "nobody"}
            ]"#,
        )
        .expect("array parses");

        let first = source.next_snapshot().expect("first turn").expect("present");
        assert!(first.units.is_empty());
        match source.next_snapshot() {
            Err(error @ TransportError::Malformed(_)) => assert!(!error.is_fatal()),
            other => panic!("expected malformed turn, got {other:?}"),
        }
        assert!(source.next_snapshot().expect("end of match").is_none());
    }

    #[test]
    fn non_array_scenarios_are_rejected() {
        assert!(ScenarioSource::from_json(r#"{"me": 0}"#).is_err());
    }
}

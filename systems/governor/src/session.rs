use fleet_policy_core::{CommandEmitter, Navigator, SnapshotSource, TransportError, WorldSnapshot};

use crate::{Clock, Governor, TurnReport};

/// Multi-turn loop pulling snapshots from a source and pushing commands to an emitter.
///
/// Only fatal transport errors end a session early. A snapshot that cannot be
/// read still produces a turn with no commands, and a non-fatal emit failure
/// is logged before the next turn starts.
#[derive(Debug)]
pub struct Session<N, C> {
    governor: Governor,
    navigator: N,
    clock: C,
}

impl<N, C> Session<N, C>
where
    N: Navigator,
    C: Clock,
{
    /// Creates a session around a configured governor.
    pub fn new(governor: Governor, navigator: N, clock: C) -> Self {
        Self {
            governor,
            navigator,
            clock,
        }
    }

    /// Governor state after the turns played so far.
    #[must_use]
    pub fn governor(&self) -> &Governor {
        &self.governor
    }

    /// Plays turns until the source reports the end of the match.
    pub fn run<S, E>(
        &mut self,
        source: &mut S,
        emitter: &mut E,
    ) -> Result<Vec<TurnReport>, TransportError>
    where
        S: SnapshotSource + ?Sized,
        E: CommandEmitter,
    {
        let mut reports = Vec::new();
        loop {
            let snapshot = match source.next_snapshot() {
                Ok(Some(snapshot)) => snapshot,
                Ok(None) => break,
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    tracing::warn!(%error, "unreadable snapshot, playing an empty turn");
                    WorldSnapshot::default()
                }
            };

            let turn = self
                .governor
                .prepare(snapshot, &self.clock)
                .iterate(&self.navigator, &self.clock);
            match turn.flush(emitter) {
                Ok(report) => reports.push(report),
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    tracing::warn!(%error, turn = self.governor.turn(), "failed to emit commands");
                }
            }
        }

        tracing::info!(turns = reports.len(), "session finished");
        Ok(reports)
    }
}

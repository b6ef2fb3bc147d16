use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Keyed mutation gate: one async mutex per tournament id.
///
/// Holding the guard returned by [`TournamentLocks::acquire`] makes the caller
/// the only writer for that tournament; other tournaments are unaffected.
/// Gates only live while someone holds or waits on them.
#[derive(Default)]
pub struct TournamentLocks {
    gates: DashMap<String, Arc<Mutex<()>>>,
}

impl TournamentLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other mutation holds `tournament_id`, then claim it.
    pub async fn acquire(&self, tournament_id: &str) -> TournamentGuard<'_> {
        // Clone the Arc out first so the shard lock is released before awaiting.
        let gate = self
            .gates
            .entry(tournament_id.to_owned())
            .or_default()
            .clone();
        TournamentGuard {
            gates: &self.gates,
            tournament_id: tournament_id.to_owned(),
            guard: Some(gate.lock_owned().await),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.gates.len()
    }
}

/// Exclusive claim on one tournament; releasing it drops the gate once idle.
pub struct TournamentGuard<'a> {
    gates: &'a DashMap<String, Arc<Mutex<()>>>,
    tournament_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for TournamentGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // Waiters and new acquirers clone the Arc under the shard lock, so a
        // count of one here means only the map still references the gate.
        self.gates
            .remove_if(&self.tournament_id, |_, gate| Arc::strong_count(gate) == 1);
    }
}

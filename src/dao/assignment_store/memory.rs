use std::{sync::Arc, time::SystemTime};

use dashmap::DashMap;
use futures::future::BoxFuture;

use super::AssignmentStore;
use crate::{
    dao::storage::StorageResult,
    state::assignments::{RingConfiguration, TournamentAssignments},
};

/// Process-local store; snapshots are swapped whole on every save.
#[derive(Clone, Default)]
pub struct MemoryAssignmentStore {
    records: Arc<DashMap<String, TournamentAssignments>>,
}

impl MemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tournaments with a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AssignmentStore for MemoryAssignmentStore {
    fn get(
        &self,
        tournament_id: &str,
    ) -> BoxFuture<'static, StorageResult<Option<TournamentAssignments>>> {
        let snapshot = self
            .records
            .get(tournament_id)
            .map(|entry| entry.value().clone());
        Box::pin(async move { Ok(snapshot) })
    }

    fn get_or_create(
        &self,
        tournament_id: &str,
        rings: Vec<RingConfiguration>,
    ) -> BoxFuture<'static, StorageResult<TournamentAssignments>> {
        // The entry guard holds the shard lock, so only one seed can be inserted.
        let snapshot = self
            .records
            .entry(tournament_id.to_owned())
            .or_insert_with(|| {
                TournamentAssignments::seeded(tournament_id, &rings, SystemTime::now())
            })
            .value()
            .clone();
        Box::pin(async move { Ok(snapshot) })
    }

    fn save(&self, assignments: TournamentAssignments) -> BoxFuture<'static, StorageResult<()>> {
        self.records
            .insert(assignments.tournament_id().to_owned(), assignments);
        Box::pin(async { Ok(()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;

use crate::{
    dao::storage::StorageResult,
    state::assignments::{RingConfiguration, TournamentAssignments},
};

pub use memory::MemoryAssignmentStore;

/// Durable, per-tournament storage of ring slot state.
///
/// Every call hands back owned snapshots; mutating one never affects the
/// stored copy until it is passed to [`AssignmentStore::save`].
pub trait AssignmentStore: Send + Sync {
    /// Current snapshot, or `None` when the tournament has no record yet.
    fn get(
        &self,
        tournament_id: &str,
    ) -> BoxFuture<'static, StorageResult<Option<TournamentAssignments>>>;

    /// Existing snapshot, or a freshly persisted one seeded from `rings`.
    ///
    /// Concurrent callers for the same id all observe the single record that won creation.
    fn get_or_create(
        &self,
        tournament_id: &str,
        rings: Vec<RingConfiguration>,
    ) -> BoxFuture<'static, StorageResult<TournamentAssignments>>;

    /// Replace the stored snapshot for `assignments.tournament_id()`.
    fn save(&self, assignments: TournamentAssignments) -> BoxFuture<'static, StorageResult<()>>;

    /// Probe backend reachability.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

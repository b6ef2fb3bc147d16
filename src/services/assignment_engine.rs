//! Race-to-ring assignment workflow.
//!
//! Every mutation for a tournament runs under that tournament's lock so the
//! read-check-write sequence is atomic; other tournaments proceed in parallel.
//! Notifications are queued while the lock is held and delivered afterwards.

use std::{
    sync::Arc,
    time::{Instant, SystemTime},
};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    dao::{
        assignment_store::AssignmentStore,
        catalog::{RingConfigurationProvider, TournamentCatalog},
        storage::StorageError,
    },
    services::notification::{Notification, NotificationDispatcher},
    state::{
        TournamentLocks,
        assignments::{AssignmentConflict, SlotStatus, TournamentAssignments},
    },
};

/// Business outcome that stops an operation before any state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentRejection {
    #[error("tournament {tournament_id} not found")]
    TournamentNotFound { tournament_id: String },
    #[error("race {race_number} not found in tournament")]
    RaceNotFound { race_number: u32 },
    #[error("ring {ring_number} is not configured for this tournament")]
    RingNotConfigured { ring_number: u32 },
    #[error("ring {ring_number} not found")]
    RingNotFound { ring_number: u32 },
    #[error("no assignments found for tournament")]
    NoAssignmentsFound,
}

/// Outcome of [`AssignmentEngine::assign_race`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignResult {
    Success(TournamentAssignments),
    /// Nothing was written; `assignments` is the state the conflicts were found in.
    ConflictDetected {
        conflicts: Vec<AssignmentConflict>,
        assignments: TournamentAssignments,
    },
    Rejected(AssignmentRejection),
}

/// Outcome of [`AssignmentEngine::clear_ring`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearResult {
    Success(TournamentAssignments),
    Rejected(AssignmentRejection),
}

/// Coordinates catalog lookups, conflict detection, persistence and notification.
#[derive(Clone)]
pub struct AssignmentEngine {
    store: Arc<dyn AssignmentStore>,
    catalog: Arc<dyn TournamentCatalog>,
    rings: Arc<dyn RingConfigurationProvider>,
    locks: Arc<TournamentLocks>,
    notifications: NotificationDispatcher,
}

impl AssignmentEngine {
    pub fn new(
        store: Arc<dyn AssignmentStore>,
        catalog: Arc<dyn TournamentCatalog>,
        rings: Arc<dyn RingConfigurationProvider>,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            store,
            catalog,
            rings,
            locks: Arc::new(TournamentLocks::new()),
            notifications,
        }
    }

    /// Place `race_number` into the `status` slot of `ring_number`.
    ///
    /// Checks run in order: tournament, race, ring configuration, then slot
    /// conflicts. Conflicts block the write unless `allow_override` is set, in
    /// which case the occupant is displaced. On success the race is removed
    /// from every other slot it held.
    pub async fn assign_race(
        &self,
        tournament_id: &str,
        race_number: u32,
        ring_number: u32,
        status: SlotStatus,
        allow_override: bool,
    ) -> Result<AssignResult, StorageError> {
        let started = Instant::now();
        let _guard = self.locks.acquire(tournament_id).await;

        if !self.catalog.tournament_exists(tournament_id).await? {
            return Ok(AssignResult::Rejected(
                AssignmentRejection::TournamentNotFound {
                    tournament_id: tournament_id.to_owned(),
                },
            ));
        }
        if !self.catalog.race_exists(tournament_id, race_number).await? {
            return Ok(AssignResult::Rejected(AssignmentRejection::RaceNotFound {
                race_number,
            }));
        }
        let configuration = self
            .rings
            .ring_configuration(tournament_id)
            .await?
            .unwrap_or_default();
        if !configuration
            .iter()
            .any(|ring| ring.ring_number == ring_number)
        {
            return Ok(AssignResult::Rejected(
                AssignmentRejection::RingNotConfigured { ring_number },
            ));
        }

        let existing = self
            .store
            .get_or_create(tournament_id, configuration.clone())
            .await?;
        let current = match existing.with_missing_rings(&configuration) {
            Some(reconciled) => {
                debug!(tournament_id, "appended newly configured rings to assignments");
                reconciled
            }
            None => existing,
        };

        let conflicts = current.conflicts_for(race_number, ring_number, status);
        if !conflicts.is_empty() {
            if !allow_override {
                info!(
                    tournament_id,
                    race_number,
                    ring_number,
                    %status,
                    conflicts = conflicts.len(),
                    "race assignment blocked by conflicts"
                );
                return Ok(AssignResult::ConflictDetected {
                    conflicts,
                    assignments: current,
                });
            }
            warn!(
                tournament_id,
                race_number,
                ring_number,
                %status,
                conflicts = conflicts.len(),
                "overriding race assignment conflicts"
            );
        }

        let Some(next) = current.with_race_placed(race_number, ring_number, status, SystemTime::now())
        else {
            return Ok(AssignResult::Rejected(AssignmentRejection::RingNotFound {
                ring_number,
            }));
        };
        self.store.save(next.clone()).await?;
        self.notifications.dispatch(Notification::AssignmentUpdated {
            tournament_id: tournament_id.to_owned(),
            assignments: next.clone(),
        });

        info!(
            tournament_id,
            race_number,
            ring_number,
            %status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "race assigned"
        );
        Ok(AssignResult::Success(next))
    }

    /// Empty all three slots of `ring_number`. Clearing an empty ring succeeds.
    pub async fn clear_ring(
        &self,
        tournament_id: &str,
        ring_number: u32,
    ) -> Result<ClearResult, StorageError> {
        let started = Instant::now();
        let _guard = self.locks.acquire(tournament_id).await;

        if !self.catalog.tournament_exists(tournament_id).await? {
            return Ok(ClearResult::Rejected(
                AssignmentRejection::TournamentNotFound {
                    tournament_id: tournament_id.to_owned(),
                },
            ));
        }
        let Some(current) = self.store.get(tournament_id).await? else {
            return Ok(ClearResult::Rejected(AssignmentRejection::NoAssignmentsFound));
        };
        let Some(next) = current.with_ring_cleared(ring_number, SystemTime::now()) else {
            return Ok(ClearResult::Rejected(AssignmentRejection::RingNotFound {
                ring_number,
            }));
        };

        self.store.save(next.clone()).await?;
        self.notifications.dispatch(Notification::RingCleared {
            tournament_id: tournament_id.to_owned(),
            ring_number,
            assignments: next.clone(),
        });

        info!(
            tournament_id,
            ring_number,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ring cleared"
        );
        Ok(ClearResult::Success(next))
    }

    /// Current assignments, `None` when nothing was ever assigned.
    pub async fn get_assignments(
        &self,
        tournament_id: &str,
    ) -> Result<Option<TournamentAssignments>, StorageError> {
        self.store.get(tournament_id).await
    }

    /// Probe the backing assignment store.
    pub async fn store_health(&self) -> Result<(), StorageError> {
        self.store.health_check().await
    }
}

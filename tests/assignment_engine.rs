//! End-to-end behaviour of the assignment engine against the in-memory store.

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use tokio::{sync::Notify, time::timeout};

use flyball_rings::{
    config::AppConfig,
    dao::{
        assignment_store::{AssignmentStore, MemoryAssignmentStore},
        catalog::Race,
        storage::StorageResult,
    },
    services::assignment_engine::{AssignResult, AssignmentRejection, ClearResult},
    state::{
        AppState, SharedState,
        assignments::{RingConfiguration, SlotStatus, TournamentAssignments},
    },
};

fn race(race_number: u32) -> Race {
    Race {
        race_number,
        left_team: format!("Team {race_number}A"),
        right_team: format!("Team {race_number}B"),
        division: "Open".into(),
    }
}

fn ring(ring_number: u32, color: &str) -> RingConfiguration {
    RingConfiguration {
        ring_number,
        color: color.into(),
    }
}

fn register(state: &SharedState, id: &str, races: u32, rings: Vec<RingConfiguration>) {
    state
        .catalog()
        .upsert_tournament(id, format!("Tournament {id}"), (1..=races).map(race).collect());
    state.catalog().set_ring_configuration(id, rings);
}

fn red_blue_state() -> SharedState {
    let state = AppState::in_memory(AppConfig::default());
    register(&state, "T1", 3, vec![ring(1, "Red"), ring(2, "Blue")]);
    state
}

fn success(result: AssignResult) -> TournamentAssignments {
    match result {
        AssignResult::Success(assignments) => assignments,
        other => panic!("expected success, got {other:?}"),
    }
}

fn slot(assignments: &TournamentAssignments, ring: u32, status: SlotStatus) -> Option<u32> {
    assignments
        .ring(ring)
        .and_then(|state| state.slot(status))
        .map(|assignment| assignment.race_number())
}

#[tokio::test]
async fn test_red_blue_scenario() {
    let state = red_blue_state();
    let engine = state.engine();

    let after = success(
        engine
            .assign_race("T1", 1, 1, SlotStatus::Current, false)
            .await
            .unwrap(),
    );
    let current = after.ring(1).unwrap().current().unwrap();
    assert_eq!(
        (current.race_number(), current.ring_number(), current.status()),
        (1, 1, SlotStatus::Current)
    );

    let after = success(
        engine
            .assign_race("T1", 2, 1, SlotStatus::OnDeck, false)
            .await
            .unwrap(),
    );
    assert_eq!(slot(&after, 1, SlotStatus::OnDeck), Some(2));

    let blocked = engine
        .assign_race("T1", 1, 2, SlotStatus::Current, false)
        .await
        .unwrap();
    let AssignResult::ConflictDetected { conflicts, .. } = blocked else {
        panic!("expected a conflict");
    };
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].to_string(), "race 1 already current in ring(s): 1");

    let after = success(
        engine
            .assign_race("T1", 1, 2, SlotStatus::Current, true)
            .await
            .unwrap(),
    );
    assert_eq!(slot(&after, 1, SlotStatus::Current), None);
    assert_eq!(slot(&after, 2, SlotStatus::Current), Some(1));

    let ClearResult::Success(after) = engine.clear_ring("T1", 1).await.unwrap() else {
        panic!("expected clear to succeed");
    };
    assert!(after.ring(1).unwrap().is_empty());
    assert_eq!(slot(&after, 2, SlotStatus::Current), Some(1));
    assert_eq!(after.ring(2).unwrap().color(), "Blue");
}

#[tokio::test]
async fn test_conflict_without_override_is_non_mutating() {
    let state = red_blue_state();
    let engine = state.engine();
    success(
        engine
            .assign_race("T1", 3, 1, SlotStatus::Current, false)
            .await
            .unwrap(),
    );
    let before = engine.get_assignments("T1").await.unwrap();

    let result = engine
        .assign_race("T1", 3, 2, SlotStatus::Current, false)
        .await
        .unwrap();
    assert!(matches!(result, AssignResult::ConflictDetected { .. }));
    assert_eq!(engine.get_assignments("T1").await.unwrap(), before);
}

#[tokio::test]
async fn test_clear_twice_yields_same_state() {
    let state = red_blue_state();
    let engine = state.engine();
    success(
        engine
            .assign_race("T1", 2, 2, SlotStatus::InTheHole, false)
            .await
            .unwrap(),
    );

    let ClearResult::Success(first) = engine.clear_ring("T1", 2).await.unwrap() else {
        panic!("first clear failed");
    };
    let ClearResult::Success(second) = engine.clear_ring("T1", 2).await.unwrap() else {
        panic!("second clear failed");
    };
    assert_eq!(first.rings(), second.rings());
}

#[tokio::test]
async fn test_rejections_carry_reason() {
    let state = red_blue_state();
    let engine = state.engine();

    let result = engine
        .assign_race("T1", 4, 1, SlotStatus::Current, false)
        .await
        .unwrap();
    assert_eq!(
        result,
        AssignResult::Rejected(AssignmentRejection::RaceNotFound { race_number: 4 })
    );
    assert_eq!(
        engine.clear_ring("T1", 1).await.unwrap(),
        ClearResult::Rejected(AssignmentRejection::NoAssignmentsFound)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_assignments_do_not_lose_updates() {
    let state = AppState::in_memory(AppConfig::default());
    register(
        &state,
        "T1",
        9,
        vec![ring(1, "Red"), ring(2, "Blue"), ring(3, "Green")],
    );

    let placements: Vec<(u32, u32, SlotStatus)> = (1..=3)
        .flat_map(|ring| SlotStatus::ALL.into_iter().map(move |status| (ring, status)))
        .zip(1..=9)
        .map(|((ring, status), race)| (race, ring, status))
        .collect();

    let handles: Vec<_> = placements
        .iter()
        .copied()
        .map(|(race, ring, status)| {
            let state = state.clone();
            tokio::spawn(async move {
                state
                    .engine()
                    .assign_race("T1", race, ring, status, false)
                    .await
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert!(matches!(handle.await.unwrap(), AssignResult::Success(_)));
    }

    let final_state = state.engine().get_assignments("T1").await.unwrap().unwrap();
    for (race, ring, status) in placements {
        assert_eq!(slot(&final_state, ring, status), Some(race));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_contending_current_claims_leave_single_winner() {
    let state = AppState::in_memory(AppConfig::default());
    register(&state, "T1", 8, vec![ring(1, "Red")]);

    let handles: Vec<_> = (1..=8)
        .map(|race| {
            let state = state.clone();
            tokio::spawn(async move {
                state
                    .engine()
                    .assign_race("T1", race, 1, SlotStatus::Current, false)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if matches!(handle.await.unwrap(), AssignResult::Success(_)) {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

/// Store whose saves for one tournament wait until released.
struct GatedStore {
    inner: MemoryAssignmentStore,
    gated: &'static str,
    release: Arc<Notify>,
}

impl AssignmentStore for GatedStore {
    fn get(&self, tournament_id: &str) -> BoxFuture<'static, StorageResult<Option<TournamentAssignments>>> {
        self.inner.get(tournament_id)
    }

    fn get_or_create(
        &self,
        tournament_id: &str,
        rings: Vec<RingConfiguration>,
    ) -> BoxFuture<'static, StorageResult<TournamentAssignments>> {
        self.inner.get_or_create(tournament_id, rings)
    }

    fn save(&self, assignments: TournamentAssignments) -> BoxFuture<'static, StorageResult<()>> {
        let wait = (assignments.tournament_id() == self.gated).then(|| self.release.clone());
        let save = self.inner.save(assignments);
        Box::pin(async move {
            if let Some(release) = wait {
                release.notified().await;
            }
            save.await
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.health_check()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tournaments_do_not_block_each_other() {
    let release = Arc::new(Notify::new());
    let store = GatedStore {
        inner: MemoryAssignmentStore::new(),
        gated: "slow",
        release: release.clone(),
    };
    let state = AppState::new(AppConfig::default(), Arc::new(store));
    register(&state, "slow", 1, vec![ring(1, "Red")]);
    register(&state, "fast", 1, vec![ring(1, "Red")]);

    let stuck = {
        let state = state.clone();
        tokio::spawn(async move {
            state
                .engine()
                .assign_race("slow", 1, 1, SlotStatus::Current, false)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let fast = timeout(
        Duration::from_secs(1),
        state
            .engine()
            .assign_race("fast", 1, 1, SlotStatus::Current, false),
    )
    .await
    .expect("other tournament must not wait on the gated one")
    .unwrap();
    assert!(matches!(fast, AssignResult::Success(_)));
    assert!(!stuck.is_finished());

    release.notify_one();
    let slow = stuck.await.unwrap().unwrap();
    assert!(matches!(slow, AssignResult::Success(_)));
}

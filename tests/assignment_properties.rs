//! Property-based tests for ring slot invariants using proptest
//!
//! Random sequences of assign and clear calls are driven through the engine;
//! after every step the stored state must keep each race in at most one slot
//! and every placement must match the ring and slot holding it.

use std::collections::HashMap;

use flyball_rings::{
    config::AppConfig,
    dao::catalog::Race,
    services::assignment_engine::AssignResult,
    state::{
        AppState,
        assignments::{RingConfiguration, SlotStatus, TournamentAssignments},
    },
};
use proptest::prelude::*;

const RINGS: u32 = 3;
const RACES: u32 = 6;

#[derive(Debug, Clone)]
enum Step {
    Assign {
        race: u32,
        ring: u32,
        status: SlotStatus,
        allow_override: bool,
    },
    Clear {
        ring: u32,
    },
}

fn status_strategy() -> impl Strategy<Value = SlotStatus> {
    prop::sample::select(SlotStatus::ALL.to_vec())
}

fn step_strategy(allow_override: bool) -> impl Strategy<Value = Step> {
    let override_flag = if allow_override {
        any::<bool>().boxed()
    } else {
        Just(false).boxed()
    };
    prop_oneof![
        4 => (1..=RACES, 1..=RINGS, status_strategy(), override_flag).prop_map(
            |(race, ring, status, allow_override)| Step::Assign {
                race,
                ring,
                status,
                allow_override,
            }
        ),
        1 => (1..=RINGS).prop_map(|ring| Step::Clear { ring }),
    ]
}

/// Run `steps` against a fresh tournament and return every intermediate state.
fn run_steps(steps: &[Step]) -> Vec<TournamentAssignments> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async {
        let state = AppState::in_memory(AppConfig::default());
        state.catalog().upsert_tournament(
            "P1",
            "Property Cup".into(),
            (1..=RACES)
                .map(|race_number| Race {
                    race_number,
                    left_team: "L".into(),
                    right_team: "R".into(),
                    division: String::new(),
                })
                .collect(),
        );
        state.catalog().set_ring_configuration(
            "P1",
            (1..=RINGS)
                .map(|ring_number| RingConfiguration {
                    ring_number,
                    color: format!("color-{ring_number}"),
                })
                .collect(),
        );

        let engine = state.engine();
        let mut observed = Vec::new();
        for step in steps {
            match *step {
                Step::Assign {
                    race,
                    ring,
                    status,
                    allow_override,
                } => {
                    let result = engine
                        .assign_race("P1", race, ring, status, allow_override)
                        .await
                        .unwrap();
                    assert!(!matches!(result, AssignResult::Rejected(_)));
                }
                Step::Clear { ring } => {
                    engine.clear_ring("P1", ring).await.unwrap();
                }
            }
            if let Some(snapshot) = engine.get_assignments("P1").await.unwrap() {
                observed.push(snapshot);
            }
        }
        observed
    })
}

fn current_rings_per_race(assignments: &TournamentAssignments) -> HashMap<u32, usize> {
    let mut counts = HashMap::new();
    for ring in assignments.rings() {
        if let Some(current) = ring.current() {
            *counts.entry(current.race_number()).or_default() += 1;
        }
    }
    counts
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_race_is_never_current_in_two_rings(
        steps in prop::collection::vec(step_strategy(false), 1..40)
    ) {
        for snapshot in run_steps(&steps) {
            let counts = current_rings_per_race(&snapshot);
            prop_assert!(counts.values().all(|&count| count <= 1), "{counts:?}");
        }
    }

    #[test]
    fn test_race_holds_at_most_one_slot(
        steps in prop::collection::vec(step_strategy(true), 1..40)
    ) {
        for snapshot in run_steps(&steps) {
            let mut seen = HashMap::new();
            for ring in snapshot.rings() {
                for status in SlotStatus::ALL {
                    if let Some(assignment) = ring.slot(status) {
                        prop_assert_eq!(assignment.ring_number(), ring.ring_number());
                        prop_assert_eq!(assignment.status(), status);
                        let previous = seen.insert(assignment.race_number(), (ring.ring_number(), status));
                        prop_assert!(previous.is_none(), "race {} placed twice", assignment.race_number());
                    }
                }
            }
        }
    }

    #[test]
    fn test_every_configured_ring_survives(
        steps in prop::collection::vec(step_strategy(true), 1..30)
    ) {
        for snapshot in run_steps(&steps) {
            let rings: Vec<u32> = snapshot.rings().iter().map(|ring| ring.ring_number()).collect();
            prop_assert_eq!(rings, (1..=RINGS).collect::<Vec<_>>());
        }
    }
}

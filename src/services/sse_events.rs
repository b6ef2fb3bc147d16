use serde::Serialize;

use crate::{
    dto::{
        assignments::AssignmentsSnapshot,
        sse::{Handshake, RingClearedEvent, ServerEvent},
    },
    state::assignments::TournamentAssignments,
};

pub const EVENT_HANDSHAKE: &str = "handshake";
pub const EVENT_ASSIGNMENTS_SNAPSHOT: &str = "assignments.snapshot";
pub const EVENT_ASSIGNMENT_UPDATED: &str = "race_assignment.updated";
pub const EVENT_RING_CLEARED: &str = "ring.cleared";

/// Event carrying the whole tournament after an assignment.
pub fn assignment_updated(assignments: &TournamentAssignments) -> serde_json::Result<ServerEvent> {
    build(EVENT_ASSIGNMENT_UPDATED, &AssignmentsSnapshot::from(assignments))
}

/// Event naming the cleared ring alongside the resulting tournament state.
pub fn ring_cleared(
    ring_number: u32,
    assignments: &TournamentAssignments,
) -> serde_json::Result<ServerEvent> {
    build(
        EVENT_RING_CLEARED,
        &RingClearedEvent {
            ring_number,
            assignments: assignments.into(),
        },
    )
}

/// First event on a new stream; `null` data when the tournament has no record yet.
pub fn snapshot(assignments: Option<&TournamentAssignments>) -> serde_json::Result<ServerEvent> {
    build(
        EVENT_ASSIGNMENTS_SNAPSHOT,
        &assignments.map(AssignmentsSnapshot::from),
    )
}

pub fn handshake(tournament_id: &str, connection_id: &str) -> serde_json::Result<ServerEvent> {
    build(
        EVENT_HANDSHAKE,
        &Handshake {
            tournament_id: tournament_id.to_string(),
            connection_id: connection_id.to_string(),
        },
    )
}

fn build(event: &str, payload: &impl Serialize) -> serde_json::Result<ServerEvent> {
    ServerEvent::json(Some(event.to_string()), payload)
}

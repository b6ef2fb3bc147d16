use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::format_system_time,
    services::assignment_engine::{AssignResult, ClearResult},
    state::assignments::{RaceAssignment, RingSlotState, SlotStatus, TournamentAssignments},
};

/// Request body for placing a race into a ring slot.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AssignRaceRequest {
    #[validate(range(min = 1))]
    pub race_number: u32,
    #[validate(range(min = 1))]
    pub ring_number: u32,
    pub status: SlotStatus,
    /// Displace conflicting placements instead of reporting them.
    #[serde(default)]
    pub allow_conflict_override: bool,
}

/// Public projection of a single placement.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RaceAssignmentSnapshot {
    pub race_number: u32,
    pub ring_number: u32,
    pub status: SlotStatus,
}

impl From<&RaceAssignment> for RaceAssignmentSnapshot {
    fn from(value: &RaceAssignment) -> Self {
        Self {
            race_number: value.race_number(),
            ring_number: value.ring_number(),
            status: value.status(),
        }
    }
}

/// Public projection of one ring and its three slots.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RingSlotsSnapshot {
    pub ring_number: u32,
    pub color: String,
    pub current: Option<RaceAssignmentSnapshot>,
    pub on_deck: Option<RaceAssignmentSnapshot>,
    pub in_the_hole: Option<RaceAssignmentSnapshot>,
}

impl From<&RingSlotState> for RingSlotsSnapshot {
    fn from(ring: &RingSlotState) -> Self {
        Self {
            ring_number: ring.ring_number(),
            color: ring.color().to_string(),
            current: ring.current().map(Into::into),
            on_deck: ring.on_deck().map(Into::into),
            in_the_hole: ring.in_the_hole().map(Into::into),
        }
    }
}

/// Public projection of every ring of a tournament.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssignmentsSnapshot {
    pub tournament_id: String,
    pub rings: Vec<RingSlotsSnapshot>,
    /// RFC 3339 timestamp of the last mutation.
    pub last_updated: String,
}

impl From<&TournamentAssignments> for AssignmentsSnapshot {
    fn from(value: &TournamentAssignments) -> Self {
        Self {
            tournament_id: value.tournament_id().to_string(),
            rings: value.rings().iter().map(Into::into).collect(),
            last_updated: format_system_time(value.last_updated()),
        }
    }
}

/// Outcome of an assignment request.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssignRaceResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignments: Option<AssignmentsSnapshot>,
}

impl AssignRaceResponse {
    /// HTTP status matching the outcome.
    pub fn status_code(result: &AssignResult) -> StatusCode {
        match result {
            AssignResult::Success(_) => StatusCode::OK,
            AssignResult::ConflictDetected { .. } => StatusCode::CONFLICT,
            AssignResult::Rejected(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<AssignResult> for AssignRaceResponse {
    fn from(result: AssignResult) -> Self {
        match result {
            AssignResult::Success(assignments) => Self {
                success: true,
                message: "race assigned successfully".into(),
                conflicts: None,
                assignments: Some((&assignments).into()),
            },
            AssignResult::ConflictDetected {
                conflicts,
                assignments,
            } => Self {
                success: false,
                message: "race assignment conflicts detected".into(),
                conflicts: Some(conflicts.iter().map(ToString::to_string).collect()),
                assignments: Some((&assignments).into()),
            },
            AssignResult::Rejected(reason) => Self {
                success: false,
                message: reason.to_string(),
                conflicts: None,
                assignments: None,
            },
        }
    }
}

/// Outcome of a ring clear request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClearRingResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignments: Option<AssignmentsSnapshot>,
}

impl ClearRingResponse {
    /// HTTP status matching the outcome.
    pub fn status_code(result: &ClearResult) -> StatusCode {
        match result {
            ClearResult::Success(_) => StatusCode::OK,
            ClearResult::Rejected(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl From<ClearResult> for ClearRingResponse {
    fn from(result: ClearResult) -> Self {
        match result {
            ClearResult::Success(assignments) => Self {
                success: true,
                message: "ring cleared successfully".into(),
                assignments: Some((&assignments).into()),
            },
            ClearResult::Rejected(reason) => Self {
                success: false,
                message: reason.to_string(),
                assignments: None,
            },
        }
    }
}

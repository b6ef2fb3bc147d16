use crate::{
    dto::assignments::{AssignRaceRequest, AssignmentsSnapshot},
    error::ServiceError,
    services::assignment_engine::{AssignResult, ClearResult},
    state::SharedState,
};

/// Run a race assignment request through the engine.
pub async fn assign_race(
    state: &SharedState,
    tournament_id: &str,
    request: AssignRaceRequest,
) -> Result<AssignResult, ServiceError> {
    let result = state
        .engine()
        .assign_race(
            tournament_id,
            request.race_number,
            request.ring_number,
            request.status,
            request.allow_conflict_override,
        )
        .await?;
    Ok(result)
}

pub async fn clear_ring(
    state: &SharedState,
    tournament_id: &str,
    ring_number: u32,
) -> Result<ClearResult, ServiceError> {
    Ok(state.engine().clear_ring(tournament_id, ring_number).await?)
}

/// Current assignments of a known tournament; `None` before the first assignment.
pub async fn get_assignments(
    state: &SharedState,
    tournament_id: &str,
) -> Result<Option<AssignmentsSnapshot>, ServiceError> {
    if !state.catalog().contains(tournament_id) {
        return Err(ServiceError::NotFound(format!("tournament {tournament_id}")));
    }
    let assignments = state.engine().get_assignments(tournament_id).await?;
    Ok(assignments.as_ref().map(AssignmentsSnapshot::from))
}

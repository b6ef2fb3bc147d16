use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::assignments::{
        AssignRaceRequest, AssignRaceResponse, AssignmentsSnapshot, ClearRingResponse,
    },
    error::AppError,
    services::assignment_service,
    state::SharedState,
};

/// Routes driving race placement on the rings.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/tournaments/{id}/assignments", get(get_assignments))
        .route("/tournaments/{id}/races/assign", post(assign_race))
        .route("/tournaments/{id}/rings/{ring}/clear", post(clear_ring))
}

/// Current slot state of every ring; `null` before the first assignment.
#[utoipa::path(
    get,
    path = "/tournaments/{id}/assignments",
    tag = "assignments",
    params(("id" = String, Path, description = "Tournament identifier")),
    responses(
        (status = 200, description = "Ring assignments, null before the first assignment", body = AssignmentsSnapshot),
        (status = 404, description = "Unknown tournament"),
        (status = 503, description = "Assignment storage unavailable")
    )
)]
pub async fn get_assignments(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Option<AssignmentsSnapshot>>, AppError> {
    Ok(Json(assignment_service::get_assignments(&state, &id).await?))
}

/// Place a race into a ring slot.
#[utoipa::path(
    post,
    path = "/tournaments/{id}/races/assign",
    tag = "assignments",
    params(("id" = String, Path, description = "Tournament identifier")),
    request_body = AssignRaceRequest,
    responses(
        (status = 200, description = "Race assigned", body = AssignRaceResponse),
        (status = 404, description = "Tournament, race or ring not found", body = AssignRaceResponse),
        (status = 409, description = "Conflicting placement", body = AssignRaceResponse),
        (status = 503, description = "Assignment storage unavailable")
    )
)]
pub async fn assign_race(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<AssignRaceRequest>>,
) -> Result<(StatusCode, Json<AssignRaceResponse>), AppError> {
    let result = assignment_service::assign_race(&state, &id, payload).await?;
    let status = AssignRaceResponse::status_code(&result);
    Ok((status, Json(result.into())))
}

/// Empty every slot of a ring.
#[utoipa::path(
    post,
    path = "/tournaments/{id}/rings/{ring}/clear",
    tag = "assignments",
    params(
        ("id" = String, Path, description = "Tournament identifier"),
        ("ring" = u32, Path, description = "Ring number")
    ),
    responses(
        (status = 200, description = "Ring cleared", body = ClearRingResponse),
        (status = 404, description = "Tournament, assignments or ring not found", body = ClearRingResponse),
        (status = 503, description = "Assignment storage unavailable")
    )
)]
pub async fn clear_ring(
    State(state): State<SharedState>,
    Path((id, ring)): Path<(String, u32)>,
) -> Result<(StatusCode, Json<ClearRingResponse>), AppError> {
    let result = assignment_service::clear_ring(&state, &id, ring).await?;
    let status = ClearRingResponse::status_code(&result);
    Ok((status, Json(result.into())))
}

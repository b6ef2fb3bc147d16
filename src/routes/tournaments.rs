use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use axum_valid::Valid;

use crate::{
    dto::tournament::{
        RingConfigurationRequest, RingConfigurationSummary, TournamentExistsResponse,
        TournamentSummary, UpsertTournamentRequest,
    },
    error::AppError,
    services::tournament_service,
    state::SharedState,
};

/// Routes managing tournaments, their races and ring layouts.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/tournaments", get(list_tournaments))
        .route(
            "/tournaments/{id}",
            get(get_tournament).put(upsert_tournament),
        )
        .route("/tournaments/{id}/exists", get(tournament_exists))
        .route(
            "/tournaments/{id}/rings",
            get(get_ring_configuration).post(set_ring_configuration),
        )
}

/// List every known tournament.
#[utoipa::path(
    get,
    path = "/tournaments",
    tag = "tournaments",
    responses(
        (status = 200, description = "Known tournaments", body = [TournamentSummary])
    )
)]
pub async fn list_tournaments(State(state): State<SharedState>) -> Json<Vec<TournamentSummary>> {
    Json(tournament_service::list_tournaments(&state))
}

/// Create or replace a tournament and its races.
#[utoipa::path(
    put,
    path = "/tournaments/{id}",
    tag = "tournaments",
    params(("id" = String, Path, description = "Tournament identifier")),
    request_body = UpsertTournamentRequest,
    responses(
        (status = 200, description = "Tournament stored", body = TournamentSummary),
        (status = 400, description = "Invalid tournament payload")
    )
)]
pub async fn upsert_tournament(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<UpsertTournamentRequest>>,
) -> Result<Json<TournamentSummary>, AppError> {
    Ok(Json(tournament_service::upsert_tournament(
        &state, &id, payload,
    )?))
}

#[utoipa::path(
    get,
    path = "/tournaments/{id}",
    tag = "tournaments",
    params(("id" = String, Path, description = "Tournament identifier")),
    responses(
        (status = 200, description = "Tournament details", body = TournamentSummary),
        (status = 404, description = "Unknown tournament")
    )
)]
pub async fn get_tournament(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<TournamentSummary>, AppError> {
    Ok(Json(tournament_service::get_tournament(&state, &id)?))
}

#[utoipa::path(
    get,
    path = "/tournaments/{id}/exists",
    tag = "tournaments",
    params(("id" = String, Path, description = "Tournament identifier")),
    responses(
        (status = 200, description = "Existence flag", body = TournamentExistsResponse)
    )
)]
pub async fn tournament_exists(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Json<TournamentExistsResponse> {
    Json(tournament_service::tournament_exists(&state, &id))
}

/// Replace the ring layout of a tournament.
#[utoipa::path(
    post,
    path = "/tournaments/{id}/rings",
    tag = "tournaments",
    params(("id" = String, Path, description = "Tournament identifier")),
    request_body = RingConfigurationRequest,
    responses(
        (status = 200, description = "Ring layout stored", body = RingConfigurationSummary),
        (status = 400, description = "Invalid ring layout"),
        (status = 404, description = "Unknown tournament")
    )
)]
pub async fn set_ring_configuration(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<RingConfigurationRequest>>,
) -> Result<Json<RingConfigurationSummary>, AppError> {
    Ok(Json(tournament_service::set_ring_configuration(
        &state, &id, payload,
    )?))
}

#[utoipa::path(
    get,
    path = "/tournaments/{id}/rings",
    tag = "tournaments",
    params(("id" = String, Path, description = "Tournament identifier")),
    responses(
        (status = 200, description = "Ring layout", body = RingConfigurationSummary),
        (status = 404, description = "Unknown tournament or no layout configured")
    )
)]
pub async fn get_ring_configuration(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<RingConfigurationSummary>, AppError> {
    Ok(Json(tournament_service::get_ring_configuration(&state, &id)?))
}

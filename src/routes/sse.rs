use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{error::AppError, services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/tournaments/{id}",
    tag = "sse",
    params(("id" = String, Path, description = "Tournament identifier")),
    responses(
        (status = 200, description = "Tournament SSE stream", content_type = "text/event-stream", body = String),
        (status = 404, description = "Unknown tournament")
    )
)]
/// Stream assignment changes of one tournament, starting with its current state.
pub async fn tournament_stream(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let subscription = sse_service::subscribe_tournament(&state, &id).await?;
    info!(
        tournament_id = %id,
        connection_id = %subscription.connection_id,
        "new tournament SSE connection"
    );
    Ok(sse_service::to_sse_stream(subscription, id))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/tournaments/{id}", get(tournament_stream))
}

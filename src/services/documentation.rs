use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the ring assignment service.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::tournament_stream,
        crate::routes::tournaments::list_tournaments,
        crate::routes::tournaments::upsert_tournament,
        crate::routes::tournaments::get_tournament,
        crate::routes::tournaments::tournament_exists,
        crate::routes::tournaments::set_ring_configuration,
        crate::routes::tournaments::get_ring_configuration,
        crate::routes::assignments::get_assignments,
        crate::routes::assignments::assign_race,
        crate::routes::assignments::clear_ring,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::RingClearedEvent,
            crate::dto::assignments::AssignRaceRequest,
            crate::dto::assignments::AssignRaceResponse,
            crate::dto::assignments::ClearRingResponse,
            crate::dto::assignments::AssignmentsSnapshot,
            crate::dto::assignments::RingSlotsSnapshot,
            crate::dto::assignments::RaceAssignmentSnapshot,
            crate::dto::tournament::UpsertTournamentRequest,
            crate::dto::tournament::RaceInput,
            crate::dto::tournament::RingConfigurationRequest,
            crate::dto::tournament::RingConfigurationInput,
            crate::dto::tournament::RingConfigurationSummary,
            crate::dto::tournament::TournamentSummary,
            crate::dto::tournament::RaceSummary,
            crate::dto::tournament::TournamentExistsResponse,
            crate::state::assignments::SlotStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "tournaments", description = "Tournament, race and ring layout management"),
        (name = "assignments", description = "Race placement on the rings"),
    )
)]
pub struct ApiDoc;

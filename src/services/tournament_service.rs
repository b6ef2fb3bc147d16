//! Catalog management behind the tournament REST routes and start-up seeding.

use tracing::{info, warn};
use validator::Validate;

use crate::{
    config::SeedTournament,
    dto::tournament::{
        RingConfigurationRequest, RingConfigurationSummary, TournamentExistsResponse,
        TournamentSummary, UpsertTournamentRequest,
    },
    error::ServiceError,
    state::{SharedState, assignments::RingConfiguration},
};

/// Create or replace a tournament and its race list; an existing ring layout is kept.
pub fn upsert_tournament(
    state: &SharedState,
    tournament_id: &str,
    request: UpsertTournamentRequest,
) -> Result<TournamentSummary, ServiceError> {
    if tournament_id.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "tournament id must not be empty".into(),
        ));
    }
    request.validate()?;

    let race_count = request.races.len();
    let record = state.catalog().upsert_tournament(
        tournament_id,
        request.name,
        request.races.into_iter().map(Into::into).collect(),
    );
    info!(tournament_id, races = race_count, "tournament stored");
    Ok(TournamentSummary::from(&record))
}

/// All tournaments ordered by id.
pub fn list_tournaments(state: &SharedState) -> Vec<TournamentSummary> {
    state
        .catalog()
        .tournaments()
        .iter()
        .map(TournamentSummary::from)
        .collect()
}

pub fn get_tournament(
    state: &SharedState,
    tournament_id: &str,
) -> Result<TournamentSummary, ServiceError> {
    state
        .catalog()
        .tournament(tournament_id)
        .map(|record| TournamentSummary::from(&record))
        .ok_or_else(|| ServiceError::NotFound(format!("tournament {tournament_id}")))
}

pub fn tournament_exists(state: &SharedState, tournament_id: &str) -> TournamentExistsResponse {
    TournamentExistsResponse {
        exists: state.catalog().contains(tournament_id),
    }
}

/// Replace the ring layout of an existing tournament.
pub fn set_ring_configuration(
    state: &SharedState,
    tournament_id: &str,
    request: RingConfigurationRequest,
) -> Result<RingConfigurationSummary, ServiceError> {
    request.validate()?;

    let rings: Vec<RingConfiguration> = request.rings.into_iter().map(Into::into).collect();
    let record = state
        .catalog()
        .set_ring_configuration(tournament_id, rings)
        .ok_or_else(|| ServiceError::NotFound(format!("tournament {tournament_id}")))?;

    let rings = record.rings.unwrap_or_default();
    info!(tournament_id, rings = rings.len(), "ring configuration stored");
    Ok(RingConfigurationSummary {
        tournament_id: record.id,
        rings: rings.iter().map(Into::into).collect(),
    })
}

pub fn get_ring_configuration(
    state: &SharedState,
    tournament_id: &str,
) -> Result<RingConfigurationSummary, ServiceError> {
    let record = state
        .catalog()
        .tournament(tournament_id)
        .ok_or_else(|| ServiceError::NotFound(format!("tournament {tournament_id}")))?;
    let rings = record.rings.ok_or_else(|| {
        ServiceError::NotFound(format!("ring configuration for tournament {tournament_id}"))
    })?;

    Ok(RingConfigurationSummary {
        tournament_id: record.id,
        rings: rings.iter().map(Into::into).collect(),
    })
}

/// Load the configured seed tournaments; invalid entries are logged and skipped.
///
/// Returns how many tournaments were stored.
pub fn seed_tournaments(state: &SharedState, seeds: &[SeedTournament]) -> usize {
    let mut stored = 0;
    for seed in seeds {
        match seed_one(state, seed) {
            Ok(()) => stored += 1,
            Err(err) => warn!(tournament_id = %seed.id, error = %err, "skipping seed tournament"),
        }
    }
    stored
}

fn seed_one(state: &SharedState, seed: &SeedTournament) -> Result<(), ServiceError> {
    let rings = seed
        .rings
        .clone()
        .map(|rings| RingConfigurationRequest { rings });
    if let Some(request) = &rings {
        request.validate()?;
    }

    upsert_tournament(
        state,
        &seed.id,
        UpsertTournamentRequest {
            name: seed.name.clone(),
            races: seed.races.clone(),
        },
    )?;
    if let Some(request) = rings {
        set_ring_configuration(state, &seed.id, request)?;
    }
    Ok(())
}

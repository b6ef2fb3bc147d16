use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::catalog::{Race, TournamentRecord},
    dto::validation::{validate_ring_configuration, validate_unique_race_numbers},
    state::assignments::RingConfiguration,
};

/// Payload creating or replacing a tournament and its race list.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpsertTournamentRequest {
    pub name: String,
    pub races: Vec<RaceInput>,
}

impl Validate for UpsertTournamentRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            let mut err = validator::ValidationError::new("name_blank");
            err.message = Some("Tournament name must not be empty".into());
            errors.add("name", err);
        }

        if let Some(race_errors) = self.races.iter().find_map(|race| race.validate().err()) {
            errors.merge_self("races", Err(race_errors));
        }

        let numbers: Vec<u32> = self.races.iter().map(|race| race.race_number).collect();
        if let Err(e) = validate_unique_race_numbers(&numbers) {
            errors.add("race_numbers", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// One race in the tournament's running order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema, Validate)]
pub struct RaceInput {
    #[validate(range(min = 1))]
    pub race_number: u32,
    pub left_team: String,
    pub right_team: String,
    #[serde(default)]
    pub division: String,
}

impl From<RaceInput> for Race {
    fn from(value: RaceInput) -> Self {
        Self {
            race_number: value.race_number,
            left_team: value.left_team,
            right_team: value.right_team,
            division: value.division,
        }
    }
}

/// Payload replacing the ring layout of a tournament.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RingConfigurationRequest {
    pub rings: Vec<RingConfigurationInput>,
}

impl Validate for RingConfigurationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_ring_configuration(&self.rings) {
            errors.add("rings", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A single ring entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RingConfigurationInput {
    pub ring_number: u32,
    pub color: String,
}

impl From<RingConfigurationInput> for RingConfiguration {
    fn from(value: RingConfigurationInput) -> Self {
        Self {
            ring_number: value.ring_number,
            color: value.color,
        }
    }
}

impl From<&RingConfiguration> for RingConfigurationInput {
    fn from(value: &RingConfiguration) -> Self {
        Self {
            ring_number: value.ring_number,
            color: value.color.clone(),
        }
    }
}

/// Ring layout returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct RingConfigurationSummary {
    pub tournament_id: String,
    pub rings: Vec<RingConfigurationInput>,
}

/// Public projection of a race.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RaceSummary {
    pub race_number: u32,
    pub left_team: String,
    pub right_team: String,
    pub division: String,
}

impl From<&Race> for RaceSummary {
    fn from(race: &Race) -> Self {
        Self {
            race_number: race.race_number,
            left_team: race.left_team.clone(),
            right_team: race.right_team.clone(),
            division: race.division.clone(),
        }
    }
}

/// Tournament as exposed by the REST API.
#[derive(Debug, Serialize, ToSchema)]
pub struct TournamentSummary {
    pub id: String,
    pub name: String,
    pub races: Vec<RaceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rings: Option<Vec<RingConfigurationInput>>,
}

impl From<&TournamentRecord> for TournamentSummary {
    fn from(record: &TournamentRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            races: record.races.values().map(Into::into).collect(),
            rings: record
                .rings
                .as_ref()
                .map(|rings| rings.iter().map(Into::into).collect()),
        }
    }
}

/// Answer of the existence probe.
#[derive(Debug, Serialize, ToSchema)]
pub struct TournamentExistsResponse {
    pub exists: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn race(race_number: u32) -> RaceInput {
        RaceInput {
            race_number,
            left_team: "Zoomers".into(),
            right_team: "Hounds".into(),
            division: "Open".into(),
        }
    }

    #[test]
    fn duplicate_races_are_rejected() {
        let request = UpsertTournamentRequest {
            name: "Spring Cup".into(),
            races: vec![race(1), race(1)],
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("race_numbers"));
    }

    #[test]
    fn race_zero_is_rejected() {
        let request = UpsertTournamentRequest {
            name: "Spring Cup".into(),
            races: vec![race(0)],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let request = UpsertTournamentRequest {
            name: " ".into(),
            races: vec![race(1)],
        };
        assert!(request.validate().unwrap_err().field_errors().contains_key("name"));
    }

    #[test]
    fn ring_request_reports_under_rings() {
        let request = RingConfigurationRequest { rings: vec![] };
        assert!(request.validate().unwrap_err().field_errors().contains_key("rings"));
    }
}

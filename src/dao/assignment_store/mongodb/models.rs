use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};

use crate::state::assignments::{RingSlotState, SlotStatus, TournamentAssignments};

/// One document per tournament, keyed by the tournament id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAssignmentsDocument {
    #[serde(rename = "_id")]
    tournament_id: String,
    rings: Vec<MongoRingDocument>,
    last_updated: DateTime,
}

/// Slots only store race numbers; ring number and status are implied by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MongoRingDocument {
    ring_number: u32,
    color: String,
    current: Option<u32>,
    on_deck: Option<u32>,
    in_the_hole: Option<u32>,
}

impl From<&RingSlotState> for MongoRingDocument {
    fn from(ring: &RingSlotState) -> Self {
        Self {
            ring_number: ring.ring_number(),
            color: ring.color().to_owned(),
            current: ring.current().map(|a| a.race_number()),
            on_deck: ring.on_deck().map(|a| a.race_number()),
            in_the_hole: ring.in_the_hole().map(|a| a.race_number()),
        }
    }
}

impl From<MongoRingDocument> for RingSlotState {
    fn from(value: MongoRingDocument) -> Self {
        let slots = [
            (SlotStatus::Current, value.current),
            (SlotStatus::OnDeck, value.on_deck),
            (SlotStatus::InTheHole, value.in_the_hole),
        ];
        slots.into_iter().fold(
            RingSlotState::empty(value.ring_number, value.color),
            |ring, (status, race)| match race {
                Some(race_number) => ring.with_race(race_number, status),
                None => ring,
            },
        )
    }
}

impl From<&TournamentAssignments> for MongoAssignmentsDocument {
    fn from(value: &TournamentAssignments) -> Self {
        Self {
            tournament_id: value.tournament_id().to_owned(),
            rings: value.rings().iter().map(Into::into).collect(),
            last_updated: DateTime::from_system_time(value.last_updated()),
        }
    }
}

impl From<MongoAssignmentsDocument> for TournamentAssignments {
    fn from(value: MongoAssignmentsDocument) -> Self {
        TournamentAssignments::from_parts(
            value.tournament_id,
            value.rings.into_iter().map(Into::into).collect(),
            value.last_updated.to_system_time(),
        )
    }
}

pub fn doc_id(tournament_id: &str) -> Document {
    doc! {"_id": tournament_id}
}

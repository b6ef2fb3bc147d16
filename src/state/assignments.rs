//! Immutable ring-slot model for a tournament.
//!
//! Every update returns a fresh value so a computed aggregate can be swapped
//! into storage in one step; nothing here touches the store or the clock.

use std::{fmt, time::SystemTime};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The three positions a ring exposes to a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SlotStatus {
    /// Racing now.
    Current,
    /// Next up.
    OnDeck,
    /// After the on-deck race.
    InTheHole,
}

impl SlotStatus {
    /// All slots in ring display order.
    pub const ALL: [SlotStatus; 3] = [SlotStatus::Current, SlotStatus::OnDeck, SlotStatus::InTheHole];
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SlotStatus::Current => "Current",
            SlotStatus::OnDeck => "OnDeck",
            SlotStatus::InTheHole => "InTheHole",
        };
        f.write_str(label)
    }
}

/// Configured ring supplied by the ring configuration provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingConfiguration {
    /// Physical ring number.
    pub ring_number: u32,
    /// Display color label.
    pub color: String,
}

/// One race placed in one slot of one ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RaceAssignment {
    race_number: u32,
    ring_number: u32,
    status: SlotStatus,
}

impl RaceAssignment {
    /// Build a placement of `race_number` in `ring_number`'s `status` slot.
    pub fn new(race_number: u32, ring_number: u32, status: SlotStatus) -> Self {
        Self {
            race_number,
            ring_number,
            status,
        }
    }

    pub fn race_number(&self) -> u32 {
        self.race_number
    }

    pub fn ring_number(&self) -> u32 {
        self.ring_number
    }

    pub fn status(&self) -> SlotStatus {
        self.status
    }
}

/// Slot occupancy of a single ring.
///
/// An occupied slot always holds an assignment carrying this ring's number
/// and the slot's own status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingSlotState {
    ring_number: u32,
    color: String,
    current: Option<RaceAssignment>,
    on_deck: Option<RaceAssignment>,
    in_the_hole: Option<RaceAssignment>,
}

impl RingSlotState {
    /// A ring with all three slots empty.
    pub fn empty(ring_number: u32, color: impl Into<String>) -> Self {
        Self {
            ring_number,
            color: color.into(),
            current: None,
            on_deck: None,
            in_the_hole: None,
        }
    }

    pub fn ring_number(&self) -> u32 {
        self.ring_number
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn current(&self) -> Option<&RaceAssignment> {
        self.current.as_ref()
    }

    pub fn on_deck(&self) -> Option<&RaceAssignment> {
        self.on_deck.as_ref()
    }

    pub fn in_the_hole(&self) -> Option<&RaceAssignment> {
        self.in_the_hole.as_ref()
    }

    /// Occupant of the given slot, if any.
    pub fn slot(&self, status: SlotStatus) -> Option<&RaceAssignment> {
        match status {
            SlotStatus::Current => self.current.as_ref(),
            SlotStatus::OnDeck => self.on_deck.as_ref(),
            SlotStatus::InTheHole => self.in_the_hole.as_ref(),
        }
    }

    /// True when no slot is occupied.
    pub fn is_empty(&self) -> bool {
        SlotStatus::ALL.iter().all(|status| self.slot(*status).is_none())
    }

    /// Copy of this ring with `race_number` placed in the `status` slot,
    /// replacing any previous occupant.
    pub fn with_race(&self, race_number: u32, status: SlotStatus) -> Self {
        let assignment = Some(RaceAssignment::new(race_number, self.ring_number, status));
        let mut next = self.clone();
        match status {
            SlotStatus::Current => next.current = assignment,
            SlotStatus::OnDeck => next.on_deck = assignment,
            SlotStatus::InTheHole => next.in_the_hole = assignment,
        }
        next
    }

    /// Copy of this ring with every slot held by `race_number` emptied.
    pub fn without_race(&self, race_number: u32) -> Self {
        let keep = |slot: Option<RaceAssignment>| slot.filter(|a| a.race_number != race_number);
        Self {
            ring_number: self.ring_number,
            color: self.color.clone(),
            current: keep(self.current),
            on_deck: keep(self.on_deck),
            in_the_hole: keep(self.in_the_hole),
        }
    }

    /// Copy of this ring with all slots emptied.
    pub fn cleared(&self) -> Self {
        Self::empty(self.ring_number, self.color.clone())
    }
}

/// Reason an assignment was refused when no override was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentConflict {
    /// The race is already `Current` in other rings.
    AlreadyCurrent {
        /// Race being assigned.
        race_number: u32,
        /// Every other ring where the race is current.
        rings: Vec<u32>,
    },
    /// The target slot already holds a race.
    SlotOccupied {
        /// Target ring.
        ring_number: u32,
        /// Target slot.
        status: SlotStatus,
        /// Race currently in the slot.
        occupant: u32,
    },
}

impl fmt::Display for AssignmentConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentConflict::AlreadyCurrent { race_number, rings } => {
                let rings = rings
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "race {race_number} already current in ring(s): {rings}")
            }
            AssignmentConflict::SlotOccupied {
                ring_number,
                status,
                occupant,
            } => write!(
                f,
                "ring {ring_number} {status} slot already occupied by race {occupant}"
            ),
        }
    }
}

/// Aggregate slot state for every configured ring of one tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentAssignments {
    tournament_id: String,
    rings: Vec<RingSlotState>,
    last_updated: SystemTime,
}

impl TournamentAssignments {
    /// Fresh aggregate with one empty ring per configured ring, in configuration order.
    pub fn seeded(
        tournament_id: impl Into<String>,
        configuration: &[RingConfiguration],
        now: SystemTime,
    ) -> Self {
        let rings = configuration
            .iter()
            .map(|ring| RingSlotState::empty(ring.ring_number, ring.color.clone()))
            .collect();
        Self {
            tournament_id: tournament_id.into(),
            rings,
            last_updated: now,
        }
    }

    /// Rebuild an aggregate from persisted parts.
    pub fn from_parts(
        tournament_id: String,
        rings: Vec<RingSlotState>,
        last_updated: SystemTime,
    ) -> Self {
        Self {
            tournament_id,
            rings,
            last_updated,
        }
    }

    pub fn tournament_id(&self) -> &str {
        &self.tournament_id
    }

    pub fn rings(&self) -> &[RingSlotState] {
        &self.rings
    }

    pub fn last_updated(&self) -> SystemTime {
        self.last_updated
    }

    /// Look up a ring by its number.
    pub fn ring(&self, ring_number: u32) -> Option<&RingSlotState> {
        self.rings.iter().find(|ring| ring.ring_number == ring_number)
    }

    /// Rings (other than `except`) where `race_number` is current.
    pub fn rings_with_current(&self, race_number: u32, except: u32) -> Vec<u32> {
        self.rings
            .iter()
            .filter(|ring| ring.ring_number != except)
            .filter(|ring| ring.current.map(|a| a.race_number) == Some(race_number))
            .map(|ring| ring.ring_number)
            .collect()
    }

    /// Conflicts that placing `race_number` into `ring_number`'s `status` slot would raise.
    ///
    /// Only `Current` is checked across rings; any occupied target slot counts,
    /// even when it already holds the same race.
    pub fn conflicts_for(
        &self,
        race_number: u32,
        ring_number: u32,
        status: SlotStatus,
    ) -> Vec<AssignmentConflict> {
        let mut conflicts = Vec::new();

        if status == SlotStatus::Current {
            let rings = self.rings_with_current(race_number, ring_number);
            if !rings.is_empty() {
                conflicts.push(AssignmentConflict::AlreadyCurrent { race_number, rings });
            }
        }

        if let Some(existing) = self.ring(ring_number).and_then(|ring| ring.slot(status)) {
            conflicts.push(AssignmentConflict::SlotOccupied {
                ring_number,
                status,
                occupant: existing.race_number,
            });
        }

        conflicts
    }

    /// Next aggregate with `race_number` vacated everywhere and placed in the target slot.
    ///
    /// Returns `None` when the target ring is not part of this aggregate.
    pub fn with_race_placed(
        &self,
        race_number: u32,
        ring_number: u32,
        status: SlotStatus,
        now: SystemTime,
    ) -> Option<Self> {
        self.ring(ring_number)?;
        let rings = self
            .rings
            .iter()
            .map(|ring| {
                let vacated = ring.without_race(race_number);
                if ring.ring_number == ring_number {
                    vacated.with_race(race_number, status)
                } else {
                    vacated
                }
            })
            .collect();

        Some(Self {
            tournament_id: self.tournament_id.clone(),
            rings,
            last_updated: now,
        })
    }

    /// Next aggregate with every slot of `ring_number` emptied.
    ///
    /// Returns `None` when the ring is not part of this aggregate.
    pub fn with_ring_cleared(&self, ring_number: u32, now: SystemTime) -> Option<Self> {
        self.ring(ring_number)?;
        let rings = self
            .rings
            .iter()
            .map(|ring| {
                if ring.ring_number == ring_number {
                    ring.cleared()
                } else {
                    ring.clone()
                }
            })
            .collect();

        Some(Self {
            tournament_id: self.tournament_id.clone(),
            rings,
            last_updated: now,
        })
    }

    /// Append empty rings for configured rings this aggregate does not know yet.
    ///
    /// Returns `None` when nothing was missing so callers can skip a write.
    pub fn with_missing_rings(&self, configuration: &[RingConfiguration]) -> Option<Self> {
        let missing = configuration
            .iter()
            .filter(|config| self.ring(config.ring_number).is_none())
            .map(|config| RingSlotState::empty(config.ring_number, config.color.clone()))
            .collect::<Vec<_>>();
        if missing.is_empty() {
            return None;
        }

        let mut next = self.clone();
        next.rings.extend(missing);
        Some(next)
    }
}

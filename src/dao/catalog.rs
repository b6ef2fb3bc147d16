//! Tournament and ring layout lookups the assignment engine depends on.
//!
//! The engine only sees the two traits; [`MemoryCatalog`] backs both for the
//! running service and the tests.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use indexmap::IndexMap;

use crate::{dao::storage::StorageResult, state::assignments::RingConfiguration};

/// Existence checks for tournaments and their races.
pub trait TournamentCatalog: Send + Sync {
    fn tournament_exists(&self, tournament_id: &str) -> BoxFuture<'static, StorageResult<bool>>;
    fn race_exists(
        &self,
        tournament_id: &str,
        race_number: u32,
    ) -> BoxFuture<'static, StorageResult<bool>>;
}

/// Source of the ordered ring layout for a tournament.
pub trait RingConfigurationProvider: Send + Sync {
    fn ring_configuration(
        &self,
        tournament_id: &str,
    ) -> BoxFuture<'static, StorageResult<Option<Vec<RingConfiguration>>>>;
}

/// A race on the tournament's running order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Race {
    pub race_number: u32,
    pub left_team: String,
    pub right_team: String,
    pub division: String,
}

/// Everything known about one tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentRecord {
    pub id: String,
    pub name: String,
    /// Races keyed by number, in import order.
    pub races: IndexMap<u32, Race>,
    /// `None` until a ring layout has been configured.
    pub rings: Option<Vec<RingConfiguration>>,
}

/// In-process catalog keyed by tournament id.
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    tournaments: Arc<DashMap<String, TournamentRecord>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a tournament's name and races, keeping any ring layout.
    pub fn upsert_tournament(
        &self,
        id: &str,
        name: String,
        races: Vec<Race>,
    ) -> TournamentRecord {
        let races = races
            .into_iter()
            .map(|race| (race.race_number, race))
            .collect::<IndexMap<_, _>>();

        let mut entry = self
            .tournaments
            .entry(id.to_owned())
            .or_insert_with(|| TournamentRecord {
                id: id.to_owned(),
                name: String::new(),
                races: IndexMap::new(),
                rings: None,
            });
        entry.name = name;
        entry.races = races;
        entry.clone()
    }

    /// Replace the ring layout; `None` when the tournament is unknown.
    pub fn set_ring_configuration(
        &self,
        id: &str,
        rings: Vec<RingConfiguration>,
    ) -> Option<TournamentRecord> {
        let mut entry = self.tournaments.get_mut(id)?;
        entry.rings = Some(rings);
        Some(entry.clone())
    }

    pub fn tournament(&self, id: &str) -> Option<TournamentRecord> {
        self.tournaments.get(id).map(|entry| entry.value().clone())
    }

    /// All tournaments ordered by id.
    pub fn tournaments(&self) -> Vec<TournamentRecord> {
        let mut records: Vec<_> = self
            .tournaments
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tournaments.contains_key(id)
    }
}

impl TournamentCatalog for MemoryCatalog {
    fn tournament_exists(&self, tournament_id: &str) -> BoxFuture<'static, StorageResult<bool>> {
        let exists = self.contains(tournament_id);
        Box::pin(async move { Ok(exists) })
    }

    fn race_exists(
        &self,
        tournament_id: &str,
        race_number: u32,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let exists = self
            .tournaments
            .get(tournament_id)
            .is_some_and(|record| record.races.contains_key(&race_number));
        Box::pin(async move { Ok(exists) })
    }
}

impl RingConfigurationProvider for MemoryCatalog {
    fn ring_configuration(
        &self,
        tournament_id: &str,
    ) -> BoxFuture<'static, StorageResult<Option<Vec<RingConfiguration>>>> {
        let rings = self
            .tournaments
            .get(tournament_id)
            .and_then(|record| record.rings.clone());
        Box::pin(async move { Ok(rings) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn race(race_number: u32) -> Race {
        Race {
            race_number,
            left_team: "Left".into(),
            right_team: "Right".into(),
            division: "Open".into(),
        }
    }

    #[tokio::test]
    async fn races_are_scoped_to_their_tournament() {
        let catalog = MemoryCatalog::new();
        catalog.upsert_tournament("T1", "Cup".into(), vec![race(1), race(2)]);
        catalog.upsert_tournament("T2", "Open".into(), vec![race(7)]);

        assert!(catalog.race_exists("T1", 2).await.unwrap());
        assert!(!catalog.race_exists("T1", 7).await.unwrap());
        assert!(!catalog.race_exists("missing", 1).await.unwrap());
        assert!(catalog.tournament_exists("T2").await.unwrap());
        assert!(!catalog.tournament_exists("T3").await.unwrap());
    }

    #[tokio::test]
    async fn reimport_keeps_ring_layout() {
        let catalog = MemoryCatalog::new();
        catalog.upsert_tournament("T1", "Cup".into(), vec![race(1)]);
        let rings = vec![RingConfiguration {
            ring_number: 1,
            color: "Red".into(),
        }];
        assert!(catalog.set_ring_configuration("T1", rings.clone()).is_some());

        let record = catalog.upsert_tournament("T1", "Cup II".into(), vec![race(4), race(3)]);
        assert_eq!(record.name, "Cup II");
        assert_eq!(record.races.keys().copied().collect::<Vec<_>>(), vec![4, 3]);
        assert_eq!(catalog.ring_configuration("T1").await.unwrap(), Some(rings));
    }

    #[test]
    fn ring_layout_requires_known_tournament() {
        let catalog = MemoryCatalog::new();
        assert!(catalog.set_ring_configuration("nope", Vec::new()).is_none());
    }

    #[test]
    fn listing_is_sorted_by_id() {
        let catalog = MemoryCatalog::new();
        catalog.upsert_tournament("b", "B".into(), vec![]);
        catalog.upsert_tournament("a", "A".into(), vec![]);
        let ids: Vec<_> = catalog.tournaments().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}

use std::{sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use mongodb::{
    Collection, Database,
    bson::doc,
    error::{Error as MongoError, ErrorKind, WriteFailure},
};

use super::{
    config::MongoConfig,
    connection::open_assignments_database,
    error::{MongoDaoError, MongoResult},
    models::{MongoAssignmentsDocument, doc_id},
};
use crate::{
    dao::{assignment_store::AssignmentStore, storage::StorageResult},
    state::assignments::{RingConfiguration, TournamentAssignments},
};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB-backed [`AssignmentStore`].
#[derive(Clone)]
pub struct MongoAssignmentStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    database: Database,
    config: MongoConfig,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }
}

impl MongoAssignmentStore {
    /// Establish a connection to MongoDB.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = open_assignments_database(&config).await?;

        Ok(Self {
            inner: Arc::new(MongoInner {
                database,
                config,
            }),
        })
    }

    /// Name of the database this store writes to.
    pub fn database_name(&self) -> &str {
        &self.inner.config.database_name
    }

    fn collection(&self) -> Collection<MongoAssignmentsDocument> {
        self.inner
            .database
            .collection::<MongoAssignmentsDocument>(&self.inner.config.collection_name)
    }

    async fn find(&self, tournament_id: &str) -> MongoResult<Option<TournamentAssignments>> {
        let collection = self.collection();
        let document = collection
            .find_one(doc_id(tournament_id))
            .await
            .map_err(|source| MongoDaoError::LoadAssignments {
                tournament_id: tournament_id.to_owned(),
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn find_or_insert(
        &self,
        tournament_id: &str,
        rings: Vec<RingConfiguration>,
    ) -> MongoResult<TournamentAssignments> {
        if let Some(existing) = self.find(tournament_id).await? {
            return Ok(existing);
        }

        let seeded = TournamentAssignments::seeded(tournament_id, &rings, SystemTime::now());
        let collection = self.collection();
        match collection
            .insert_one(MongoAssignmentsDocument::from(&seeded))
            .await
        {
            Ok(_) => Ok(seeded),
            // Another writer created the record first: theirs wins.
            Err(err) if is_duplicate_key(&err) => {
                self.find(tournament_id)
                    .await?
                    .ok_or_else(|| MongoDaoError::CreateRace {
                        tournament_id: tournament_id.to_owned(),
                    })
            }
            Err(source) => Err(MongoDaoError::CreateAssignments {
                tournament_id: tournament_id.to_owned(),
                source,
            }),
        }
    }

    async fn replace(&self, assignments: TournamentAssignments) -> MongoResult<()> {
        let tournament_id = assignments.tournament_id().to_owned();
        let document = MongoAssignmentsDocument::from(&assignments);
        let collection = self.collection();
        collection
            .replace_one(doc_id(&tournament_id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveAssignments {
                tournament_id,
                source,
            })?;
        Ok(())
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

impl AssignmentStore for MongoAssignmentStore {
    fn get(
        &self,
        tournament_id: &str,
    ) -> BoxFuture<'static, StorageResult<Option<TournamentAssignments>>> {
        let store = self.clone();
        let tournament_id = tournament_id.to_owned();
        Box::pin(async move { store.find(&tournament_id).await.map_err(Into::into) })
    }

    fn get_or_create(
        &self,
        tournament_id: &str,
        rings: Vec<RingConfiguration>,
    ) -> BoxFuture<'static, StorageResult<TournamentAssignments>> {
        let store = self.clone();
        let tournament_id = tournament_id.to_owned();
        Box::pin(async move {
            store
                .find_or_insert(&tournament_id, rings)
                .await
                .map_err(Into::into)
        })
    }

    fn save(&self, assignments: TournamentAssignments) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.replace(assignments).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }
}

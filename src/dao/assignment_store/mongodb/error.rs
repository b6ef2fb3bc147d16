use mongodb::error::Error as MongoError;
use thiserror::Error;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("missing environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to load assignments for tournament `{tournament_id}`")]
    LoadAssignments {
        tournament_id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to create assignments for tournament `{tournament_id}`")]
    CreateAssignments {
        tournament_id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to save assignments for tournament `{tournament_id}`")]
    SaveAssignments {
        tournament_id: String,
        #[source]
        source: MongoError,
    },
    #[error("assignments for tournament `{tournament_id}` vanished after a concurrent create")]
    CreateRace { tournament_id: String },
}

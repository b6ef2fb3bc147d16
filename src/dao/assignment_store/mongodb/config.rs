use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

const DEFAULT_DATABASE: &str = "flyball_rings";
const DEFAULT_COLLECTION: &str = "race_assignments";
const DEFAULT_CONNECT_ATTEMPTS: u32 = 10;
const APP_NAME: &str = "flyball-rings";

/// Where ring assignments live and how hard start-up tries to reach them.
#[derive(Clone)]
pub struct MongoConfig {
    pub options: ClientOptions,
    pub database_name: String,
    /// One document per tournament, keyed by tournament id.
    pub collection_name: String,
    /// Pings attempted before start-up gives up on the server.
    pub connect_attempts: u32,
}

impl MongoConfig {
    /// Parse `uri` and fill unset names with the assignment store defaults.
    pub async fn from_uri(
        uri: &str,
        database: Option<&str>,
        collection: Option<&str>,
    ) -> MongoResult<Self> {
        let mut options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;
        options.app_name.get_or_insert_with(|| APP_NAME.to_owned());

        Ok(Self {
            options,
            database_name: non_blank(database).unwrap_or(DEFAULT_DATABASE).to_owned(),
            collection_name: non_blank(collection).unwrap_or(DEFAULT_COLLECTION).to_owned(),
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
        })
    }

    /// Read `MONGO_URI` (required), plus the optional `MONGO_DB`,
    /// `MONGO_ASSIGNMENTS_COLLECTION` and `MONGO_CONNECT_ATTEMPTS`.
    pub async fn from_env() -> MongoResult<Self> {
        let uri = std::env::var("MONGO_URI")
            .map_err(|_| MongoDaoError::MissingEnvVar { var: "MONGO_URI" })?;
        let database = std::env::var("MONGO_DB").ok();
        let collection = std::env::var("MONGO_ASSIGNMENTS_COLLECTION").ok();

        let mut config = Self::from_uri(&uri, database.as_deref(), collection.as_deref()).await?;
        if let Some(attempts) = std::env::var("MONGO_CONNECT_ATTEMPTS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
        {
            config.connect_attempts = attempts.max(1);
        }
        Ok(config)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unset_names_fall_back_to_defaults() {
        let config = MongoConfig::from_uri("mongodb://localhost:27017", None, Some("  "))
            .await
            .unwrap();
        assert_eq!(config.database_name, "flyball_rings");
        assert_eq!(config.collection_name, "race_assignments");
        assert_eq!(config.connect_attempts, 10);
        assert_eq!(config.options.app_name.as_deref(), Some("flyball-rings"));
    }

    #[tokio::test]
    async fn explicit_names_are_kept() {
        let config = MongoConfig::from_uri(
            "mongodb://localhost:27017/?appName=ringside",
            Some("club"),
            Some("rings"),
        )
        .await
        .unwrap();
        assert_eq!(config.database_name, "club");
        assert_eq!(config.collection_name, "rings");
        assert_eq!(config.options.app_name.as_deref(), Some("ringside"));
    }

    #[tokio::test]
    async fn malformed_uri_is_rejected() {
        let err = MongoConfig::from_uri("not-a-uri", None, None)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, MongoDaoError::InvalidUri { .. }));
    }
}

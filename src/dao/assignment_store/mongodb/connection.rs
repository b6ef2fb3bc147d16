use std::time::Duration;

use mongodb::{Client, Database, bson::doc};
use tokio::time::sleep;
use tracing::{info, warn};

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
};

const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Doubling delay between start-up pings, capped at [`MAX_BACKOFF`].
fn backoff(attempt: u32) -> Duration {
    INITIAL_BACKOFF
        .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
        .min(MAX_BACKOFF)
}

/// Open the assignments database and wait until the server answers a ping,
/// giving up after `config.connect_attempts` pings.
pub async fn open_assignments_database(config: &MongoConfig) -> MongoResult<Database> {
    let client = Client::with_options(config.options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(&config.database_name);
    let max_attempts = config.connect_attempts.max(1);

    let mut attempt = 0;
    loop {
        attempt += 1;
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => {
                info!(
                    database = %config.database_name,
                    collection = %config.collection_name,
                    attempt,
                    "assignment store reachable"
                );
                return Ok(database);
            }
            Err(source) if attempt >= max_attempts => {
                return Err(MongoDaoError::InitialPing {
                    attempts: attempt,
                    source,
                });
            }
            Err(err) => {
                let delay = backoff(attempt);
                warn!(
                    database = %config.database_name,
                    attempt,
                    max_attempts,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %err,
                    "assignment store not reachable yet"
                );
                sleep(delay).await;
            }
        }
    }
}

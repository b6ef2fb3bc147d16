use serde::Serialize;
use utoipa::ToSchema;

/// Body of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` while the assignment store answers, `degraded` otherwise.
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { status: "ok".into() }
    }

    /// The assignment store did not answer its probe.
    pub fn degraded() -> Self {
        Self { status: "degraded".into() }
    }
}

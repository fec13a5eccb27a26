use serde::Serialize;
use utoipa::ToSchema;

/// Body of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" when games can be created, "degraded" otherwise.
    #[schema(example = "ok")]
    pub status: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }

    pub fn degraded() -> Self {
        Self { status: "degraded" }
    }
}

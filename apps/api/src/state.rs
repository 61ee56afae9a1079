use crate::assessment::engine::AssessmentEngine;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Stateless engine; cloning shares the underlying completion client.
    pub engine: AssessmentEngine,
    pub config: Config,
}

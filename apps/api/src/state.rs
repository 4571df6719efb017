use sqlx::PgPool;

use crate::config::Config;
use crate::progress::tracker::ProgressTracker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Lesson-completion pipeline, backed by Postgres outside of tests.
    pub progress: ProgressTracker,
}

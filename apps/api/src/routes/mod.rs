pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::certificates::handlers as certificates;
use crate::jobs::handlers as jobs;
use crate::learner::handlers as learner;
use crate::progress::handlers as progress;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Course progress
        .route(
            "/complete/lesson/:id",
            post(progress::handle_complete_lesson),
        )
        .route(
            "/courses/:id/progress",
            get(progress::handle_course_progress),
        )
        // Saved jobs
        .route(
            "/save/job/:id",
            post(jobs::handle_save_job).delete(jobs::handle_unsave_job),
        )
        .route("/saved/jobs", get(jobs::handle_saved_jobs))
        // Learner profile
        .route("/learner/badges", get(learner::handle_badges))
        .route("/learner/skills", get(learner::handle_skills))
        .route("/learner/points", get(learner::handle_points))
        // Certificates
        .route("/certificates", get(certificates::handle_certificates))
        .route(
            "/certificates/:id/share",
            post(certificates::handle_share_certificate),
        )
        .route(
            "/shared/certificates/:token",
            get(certificates::handle_shared_certificate),
        )
        .with_state(state)
}

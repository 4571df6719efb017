//! Saved-job bookmarks. Plain pass-through persistence.

use axum::extract::State;
use serde_json::Value;
use tracing::info;

use crate::auth::AuthLearner;
use crate::errors::AppError;
use crate::extract::ApiPath;
use crate::models::job::SavedJobRow;
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /save/job/:id
///
/// Saving an already-saved job succeeds without creating a second row.
pub async fn handle_save_job(
    State(state): State<AppState>,
    AuthLearner(learner_id): AuthLearner,
    ApiPath(job_id): ApiPath<i64>,
) -> Result<ApiResponse<Value>, AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM jobs WHERE id = $1)")
        .bind(job_id)
        .fetch_one(&state.db)
        .await?;
    if !exists {
        return Err(AppError::NotFound("Job not found".to_string()));
    }

    sqlx::query(
        r#"
        INSERT INTO saved_jobs (learner_id, job_id)
        VALUES ($1, $2)
        ON CONFLICT (learner_id, job_id) DO NOTHING
        "#,
    )
    .bind(learner_id)
    .bind(job_id)
    .execute(&state.db)
    .await?;

    info!("Learner {learner_id} saved job {job_id}");
    Ok(ApiResponse::message("Job saved"))
}

/// DELETE /save/job/:id
pub async fn handle_unsave_job(
    State(state): State<AppState>,
    AuthLearner(learner_id): AuthLearner,
    ApiPath(job_id): ApiPath<i64>,
) -> Result<ApiResponse<Value>, AppError> {
    let result = sqlx::query("DELETE FROM saved_jobs WHERE learner_id = $1 AND job_id = $2")
        .bind(learner_id)
        .bind(job_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Saved job not found".to_string()));
    }

    info!("Learner {learner_id} removed saved job {job_id}");
    Ok(ApiResponse::message("Job removed from saved jobs"))
}

/// GET /saved/jobs
pub async fn handle_saved_jobs(
    State(state): State<AppState>,
    AuthLearner(learner_id): AuthLearner,
) -> Result<ApiResponse<Vec<SavedJobRow>>, AppError> {
    let jobs = sqlx::query_as::<_, SavedJobRow>(
        r#"
        SELECT j.id AS job_id, j.title, j.company, j.location, j.description, s.saved_at
        FROM saved_jobs s
        JOIN jobs j ON j.id = s.job_id
        WHERE s.learner_id = $1
        ORDER BY s.saved_at DESC, j.id DESC
        "#,
    )
    .bind(learner_id)
    .fetch_all(&state.db)
    .await?;

    Ok(ApiResponse::ok("Saved jobs", jobs))
}

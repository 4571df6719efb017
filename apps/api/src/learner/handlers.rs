use axum::extract::State;
use serde::Serialize;

use crate::auth::AuthLearner;
use crate::errors::AppError;
use crate::models::learner::{LearnerBadgeRow, LearnerSkillRow};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PointsResponse {
    pub total: i64,
}

/// GET /learner/badges
pub async fn handle_badges(
    State(state): State<AppState>,
    AuthLearner(learner_id): AuthLearner,
) -> Result<ApiResponse<Vec<LearnerBadgeRow>>, AppError> {
    let badges = sqlx::query_as::<_, LearnerBadgeRow>(
        r#"
        SELECT b.id AS badge_id, b.name, b.description, b.icon_url, lb.awarded_at
        FROM learner_badges lb
        JOIN badges b ON b.id = lb.badge_id
        WHERE lb.learner_id = $1
        ORDER BY lb.awarded_at DESC, b.id
        "#,
    )
    .bind(learner_id)
    .fetch_all(&state.db)
    .await?;

    Ok(ApiResponse::ok("Learner badges", badges))
}

/// GET /learner/skills
pub async fn handle_skills(
    State(state): State<AppState>,
    AuthLearner(learner_id): AuthLearner,
) -> Result<ApiResponse<Vec<LearnerSkillRow>>, AppError> {
    let skills = sqlx::query_as::<_, LearnerSkillRow>(
        "SELECT skill, level FROM learner_skills WHERE learner_id = $1 ORDER BY skill",
    )
    .bind(learner_id)
    .fetch_all(&state.db)
    .await?;

    Ok(ApiResponse::ok("Learner skills", skills))
}

/// GET /learner/points
pub async fn handle_points(
    State(state): State<AppState>,
    AuthLearner(learner_id): AuthLearner,
) -> Result<ApiResponse<PointsResponse>, AppError> {
    // SUM over INTEGER yields BIGINT
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(points), 0)::BIGINT FROM learner_points WHERE learner_id = $1",
    )
    .bind(learner_id)
    .fetch_one(&state.db)
    .await?;

    Ok(ApiResponse::ok("Learner points", PointsResponse { total }))
}

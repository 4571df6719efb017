use axum::extract::State;

use crate::auth::AuthLearner;
use crate::errors::AppError;
use crate::extract::ApiPath;
use crate::progress::tracker::{CourseProgress, LessonCompletion};
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /complete/lesson/:id
pub async fn handle_complete_lesson(
    State(state): State<AppState>,
    AuthLearner(learner_id): AuthLearner,
    ApiPath(lesson_id): ApiPath<i64>,
) -> Result<ApiResponse<LessonCompletion>, AppError> {
    let completion = state.progress.complete_lesson(learner_id, lesson_id).await?;
    Ok(ApiResponse::ok("Lesson completed", completion))
}

/// GET /courses/:id/progress
pub async fn handle_course_progress(
    State(state): State<AppState>,
    AuthLearner(learner_id): AuthLearner,
    ApiPath(course_id): ApiPath<i64>,
) -> Result<ApiResponse<CourseProgress>, AppError> {
    let progress = state.progress.course_progress(learner_id, course_id).await?;
    Ok(ApiResponse::ok("Course progress", progress))
}

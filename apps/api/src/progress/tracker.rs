use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::course::EnrollmentKey;
use crate::progress::store::{LessonCatalog, ProgressLedger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonCompletion {
    pub progress: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseProgress {
    pub course_id: i64,
    pub progress: u8,
}

/// Records lesson completions and keeps each enrollment's progress in step
/// with the course's current lesson set.
#[derive(Clone)]
pub struct ProgressTracker {
    catalog: Arc<dyn LessonCatalog>,
    ledger: Arc<dyn ProgressLedger>,
}

impl ProgressTracker {
    pub fn new(catalog: Arc<dyn LessonCatalog>, ledger: Arc<dyn ProgressLedger>) -> Self {
        Self { catalog, ledger }
    }

    /// Marks `lesson_id` complete for the learner and recomputes the owning
    /// course's enrollment progress.
    ///
    /// The catalog reads happen before anything is written, so an unknown
    /// lesson leaves every row untouched. The writes and the completion count
    /// run in one unit of work locked to (learner, course), so concurrent
    /// completions of different lessons in the same course cannot lose updates.
    pub async fn complete_lesson(
        &self,
        learner_id: Uuid,
        lesson_id: i64,
    ) -> Result<LessonCompletion, AppError> {
        let lesson = self
            .catalog
            .find_lesson(lesson_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))?;

        // Read before taking the lock: a unit holding a pooled connection must
        // never wait on a second one.
        let lesson_ids = self.catalog.course_lesson_ids(lesson.course_id).await?;

        let key = EnrollmentKey {
            learner_id,
            course_id: lesson.course_id,
        };
        let mut unit = self.ledger.begin(key).await?;

        unit.mark_completed(lesson.lesson_id).await?;
        let completed = unit.count_completed(&lesson_ids).await?;
        let progress = compute_progress(completed, lesson_ids.len());
        debug!(
            "Learner {learner_id} course {}: {completed}/{} lessons complete",
            lesson.course_id,
            lesson_ids.len()
        );

        unit.upsert_enrollment(progress).await?;
        unit.commit().await?;

        info!(
            "Learner {learner_id} completed lesson {lesson_id}; course {} progress {progress}%",
            lesson.course_id
        );
        Ok(LessonCompletion { progress })
    }

    pub async fn course_progress(
        &self,
        learner_id: Uuid,
        course_id: i64,
    ) -> Result<CourseProgress, AppError> {
        let progress = self
            .ledger
            .enrollment_progress(EnrollmentKey {
                learner_id,
                course_id,
            })
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

        Ok(CourseProgress {
            course_id,
            progress,
        })
    }
}

/// Percentage of `total` lessons completed, rounded half-up. An empty course
/// is 0%.
pub fn compute_progress(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    // round(100c/t) == floor((200c + t) / 2t)
    ((200 * completed + total) / (2 * total)) as u8
}

//! Storage seams for the progress pipeline.
//!
//! `AppState` carries these as `Arc<dyn ..>`: Postgres in production, an
//! in-memory backend under test.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::course::{EnrollmentKey, LessonRef};

/// Read-only view of the course structure.
#[async_trait]
pub trait LessonCatalog: Send + Sync {
    /// Looks up a lesson and the course owning it.
    async fn find_lesson(&self, lesson_id: i64) -> Result<Option<LessonRef>, AppError>;

    /// Ids of every lesson currently in the course, across all its modules.
    async fn course_lesson_ids(&self, course_id: i64) -> Result<Vec<i64>, AppError>;
}

/// Lesson-progress and enrollment records.
#[async_trait]
pub trait ProgressLedger: Send + Sync {
    /// Opens a unit of work holding the exclusive lock for `key`.
    /// The lock is released when the unit commits or is dropped.
    async fn begin(&self, key: EnrollmentKey) -> Result<Box<dyn ProgressUnit>, AppError>;

    /// Stored progress for `key`, if the learner is enrolled.
    async fn enrollment_progress(&self, key: EnrollmentKey) -> Result<Option<u8>, AppError>;
}

/// Writes scoped to one (learner, course) pair.
#[async_trait]
pub trait ProgressUnit: Send {
    /// Upserts `LessonProgress(learner, lesson)` with `completed = true`.
    async fn mark_completed(&mut self, lesson_id: i64) -> Result<(), AppError>;

    /// Number of the learner's completed lessons among `lesson_ids`.
    async fn count_completed(&mut self, lesson_ids: &[i64]) -> Result<usize, AppError>;

    /// Upserts `Enrollment(learner, course)` with `progress`.
    async fn upsert_enrollment(&mut self, progress: u8) -> Result<(), AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}

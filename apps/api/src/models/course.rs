use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A lesson resolved to the course that owns it (through its module).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LessonRef {
    pub lesson_id: i64,
    pub course_id: i64,
}

/// Composite key of an enrollment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnrollmentKey {
    pub learner_id: Uuid,
    pub course_id: i64,
}

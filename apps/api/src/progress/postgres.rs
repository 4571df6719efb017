use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::errors::AppError;
use crate::models::course::{EnrollmentKey, LessonRef};
use crate::progress::store::{LessonCatalog, ProgressLedger, ProgressUnit};

/// Postgres-backed catalog and ledger.
#[derive(Clone)]
pub struct PgProgressStore {
    pool: PgPool,
}

impl PgProgressStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LessonCatalog for PgProgressStore {
    async fn find_lesson(&self, lesson_id: i64) -> Result<Option<LessonRef>, AppError> {
        Ok(sqlx::query_as::<_, LessonRef>(
            r#"
            SELECT l.id AS lesson_id, m.course_id
            FROM lessons l
            JOIN modules m ON m.id = l.module_id
            WHERE l.id = $1
            "#,
        )
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn course_lesson_ids(&self, course_id: i64) -> Result<Vec<i64>, AppError> {
        Ok(sqlx::query_scalar(
            r#"
            SELECT l.id
            FROM lessons l
            JOIN modules m ON m.id = l.module_id
            WHERE m.course_id = $1
            ORDER BY l.id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[async_trait]
impl ProgressLedger for PgProgressStore {
    async fn begin(&self, key: EnrollmentKey) -> Result<Box<dyn ProgressUnit>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Transaction-scoped: released on commit or rollback.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("enrollment:{}:{}", key.learner_id, key.course_id))
            .execute(&mut *tx)
            .await?;

        Ok(Box::new(PgProgressUnit { tx, key }))
    }

    async fn enrollment_progress(&self, key: EnrollmentKey) -> Result<Option<u8>, AppError> {
        let progress: Option<i32> = sqlx::query_scalar(
            "SELECT progress FROM enrollments WHERE learner_id = $1 AND course_id = $2",
        )
        .bind(key.learner_id)
        .bind(key.course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(progress.map(|p| p.clamp(0, 100) as u8))
    }
}

/// One transaction holding the advisory lock for its enrollment key.
/// Dropping it without `commit` rolls everything back.
struct PgProgressUnit {
    tx: Transaction<'static, Postgres>,
    key: EnrollmentKey,
}

#[async_trait]
impl ProgressUnit for PgProgressUnit {
    async fn mark_completed(&mut self, lesson_id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO lesson_progress (learner_id, lesson_id, completed)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (learner_id, lesson_id) DO UPDATE SET
                completed = TRUE,
                updated_at = NOW()
            "#,
        )
        .bind(self.key.learner_id)
        .bind(lesson_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn count_completed(&mut self, lesson_ids: &[i64]) -> Result<usize, AppError> {
        if lesson_ids.is_empty() {
            return Ok(0);
        }
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM lesson_progress
            WHERE learner_id = $1 AND completed AND lesson_id = ANY($2)
            "#,
        )
        .bind(self.key.learner_id)
        .bind(lesson_ids)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(count.max(0) as usize)
    }

    async fn upsert_enrollment(&mut self, progress: u8) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO enrollments (learner_id, course_id, progress)
            VALUES ($1, $2, $3)
            ON CONFLICT (learner_id, course_id) DO UPDATE SET
                progress = EXCLUDED.progress,
                updated_at = NOW()
            "#,
        )
        .bind(self.key.learner_id)
        .bind(self.key.course_id)
        .bind(i32::from(progress))
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let unit = *self;
        unit.tx.commit().await?;
        Ok(())
    }
}

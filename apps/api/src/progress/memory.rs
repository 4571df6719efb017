//! In-memory progress backend used by the test suite.
//!
//! A semaphore stands in for the connection pool: catalog reads check out a
//! permit for the duration of the read, units keep theirs until they finish.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, OwnedSemaphorePermit, Semaphore};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::course::{EnrollmentKey, LessonRef};
use crate::progress::store::{LessonCatalog, ProgressLedger, ProgressUnit};
use crate::progress::tracker::ProgressTracker;

/// One async mutex per key, created on demand. Slots nobody holds are
/// pruned on the next acquisition.
pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots.entry(key).or_default().clone()
        };
        slot.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
struct Tables {
    lessons: HashMap<i64, LessonRef>,
    completed: HashMap<(Uuid, i64), bool>,
    enrollments: HashMap<EnrollmentKey, u8>,
}

const DEFAULT_CONNECTIONS: usize = 64;

#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    locks: Arc<KeyedLocks<EnrollmentKey>>,
    connections: Arc<Semaphore>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_connections(DEFAULT_CONNECTIONS)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose simulated pool holds `connections` connections.
    pub fn with_connections(connections: usize) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            locks: Arc::new(KeyedLocks::new()),
            connections: Arc::new(Semaphore::new(connections)),
        }
    }

    pub fn tracker(&self) -> ProgressTracker {
        ProgressTracker::new(Arc::new(self.clone()), Arc::new(self.clone()))
    }

    pub fn add_lessons(&self, course_id: i64, lesson_ids: &[i64]) {
        let mut tables = self.tables();
        for &lesson_id in lesson_ids {
            tables.lessons.insert(
                lesson_id,
                LessonRef {
                    lesson_id,
                    course_id,
                },
            );
        }
    }

    pub fn remove_lesson(&self, lesson_id: i64) {
        self.tables().lessons.remove(&lesson_id);
    }

    pub fn enrollment(&self, learner_id: Uuid, course_id: i64) -> Option<u8> {
        self.tables()
            .enrollments
            .get(&EnrollmentKey {
                learner_id,
                course_id,
            })
            .copied()
    }

    pub fn enrollment_count(&self) -> usize {
        self.tables().enrollments.len()
    }

    /// Completed lesson ids for a learner, ascending.
    pub fn completed_lessons(&self, learner_id: Uuid) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .tables()
            .completed
            .iter()
            .filter(|((learner, _), done)| *learner == learner_id && **done)
            .map(|((_, lesson), _)| *lesson)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn checkout(&self) -> Result<OwnedSemaphorePermit, AppError> {
        self.connections
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("connection pool closed: {e}")))
    }
}

#[async_trait]
impl LessonCatalog for MemoryStore {
    async fn find_lesson(&self, lesson_id: i64) -> Result<Option<LessonRef>, AppError> {
        let _conn = self.checkout().await?;
        Ok(self.tables().lessons.get(&lesson_id).copied())
    }

    async fn course_lesson_ids(&self, course_id: i64) -> Result<Vec<i64>, AppError> {
        let _conn = self.checkout().await?;
        let mut ids: Vec<i64> = self
            .tables()
            .lessons
            .values()
            .filter(|l| l.course_id == course_id)
            .map(|l| l.lesson_id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[async_trait]
impl ProgressLedger for MemoryStore {
    async fn begin(&self, key: EnrollmentKey) -> Result<Box<dyn ProgressUnit>, AppError> {
        // Connection first, then the key lock, the same order as Postgres.
        let conn = self.checkout().await?;
        let guard = self.locks.lock(key).await;
        Ok(Box::new(MemoryUnit {
            key,
            tables: self.tables.clone(),
            _guard: guard,
            _conn: conn,
        }))
    }

    async fn enrollment_progress(&self, key: EnrollmentKey) -> Result<Option<u8>, AppError> {
        let _conn = self.checkout().await?;
        Ok(self.tables().enrollments.get(&key).copied())
    }
}

struct MemoryUnit {
    key: EnrollmentKey,
    tables: Arc<Mutex<Tables>>,
    _guard: OwnedMutexGuard<()>,
    _conn: OwnedSemaphorePermit,
}

impl MemoryUnit {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProgressUnit for MemoryUnit {
    async fn mark_completed(&mut self, lesson_id: i64) -> Result<(), AppError> {
        self.tables()
            .completed
            .insert((self.key.learner_id, lesson_id), true);
        Ok(())
    }

    async fn count_completed(&mut self, lesson_ids: &[i64]) -> Result<usize, AppError> {
        let count = {
            let tables = self.tables();
            lesson_ids
                .iter()
                .filter(|id| {
                    tables
                        .completed
                        .get(&(self.key.learner_id, **id))
                        .copied()
                        .unwrap_or(false)
                })
                .count()
        };
        // Let concurrent completions interleave between the read and the write.
        tokio::task::yield_now().await;
        Ok(count)
    }

    async fn upsert_enrollment(&mut self, progress: u8) -> Result<(), AppError> {
        self.tables().enrollments.insert(self.key, progress);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _held = locks.lock(("alice", 1)).await;

        let other = tokio::time::timeout(Duration::from_millis(100), locks.lock(("alice", 2))).await;
        assert!(other.is_ok(), "a different key must be acquirable");
    }

    #[tokio::test]
    async fn test_same_key_waits_for_release() {
        let locks = KeyedLocks::new();
        let held = locks.lock("course").await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.lock("course")).await;
        assert!(blocked.is_err(), "same key must wait while held");

        drop(held);
        let acquired = tokio::time::timeout(Duration::from_millis(100), locks.lock("course")).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_released_slots_are_pruned() {
        let locks = KeyedLocks::new();
        for i in 0..10 {
            drop(locks.lock(i).await);
        }
        let _last = locks.lock(99).await;
        assert_eq!(locks.len(), 1);
        assert!(!locks.is_empty());
    }

    #[test]
    fn test_new_locks_are_empty() {
        let locks: KeyedLocks<u8> = KeyedLocks::default();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_open_unit_keeps_its_connection() {
        let store = MemoryStore::with_connections(1);
        let key = EnrollmentKey {
            learner_id: Uuid::new_v4(),
            course_id: 1,
        };

        let unit = store.begin(key).await.unwrap();
        let read = tokio::time::timeout(Duration::from_millis(50), store.find_lesson(1)).await;
        assert!(read.is_err(), "pool of one is taken by the open unit");

        drop(unit);
        let read = tokio::time::timeout(Duration::from_millis(100), store.find_lesson(1)).await;
        assert!(read.is_ok());
    }

    #[tokio::test]
    async fn test_unit_counts_only_given_lessons() {
        let store = MemoryStore::new();
        let key = EnrollmentKey {
            learner_id: Uuid::new_v4(),
            course_id: 1,
        };

        let mut unit = store.begin(key).await.unwrap();
        unit.mark_completed(1).await.unwrap();
        unit.mark_completed(7).await.unwrap();
        assert_eq!(unit.count_completed(&[1, 2, 3]).await.unwrap(), 1);
        unit.upsert_enrollment(33).await.unwrap();
        unit.commit().await.unwrap();

        assert_eq!(store.enrollment_progress(key).await.unwrap(), Some(33));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CertificateRow {
    pub certificate_id: i64,
    pub course_id: i64,
    pub course_title: String,
    pub title: String,
    pub issued_at: DateTime<Utc>,
    pub share_token: Option<Uuid>,
    pub shared_at: Option<DateTime<Utc>>,
}

/// What a share link reveals: no learner id, no internal ids.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SharedCertificate {
    pub title: String,
    pub course_title: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, FromRow)]
pub struct ShareLink {
    pub certificate_id: i64,
    pub share_token: Uuid,
}

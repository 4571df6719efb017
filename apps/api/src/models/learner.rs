use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LearnerBadgeRow {
    pub badge_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub awarded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LearnerSkillRow {
    pub skill: String,
    pub level: String,
}

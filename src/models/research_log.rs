use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchLog {
    pub id: Uuid,
    pub project_id: Uuid,
    pub log_date: NaiveDate,
    pub title: String,
    pub content: String,
    pub author_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub attachment_path: Option<String>,
    pub attachment_name: Option<String>,
    pub is_flag: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

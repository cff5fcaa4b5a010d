use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ORG_TYPES: &[&str] = &["university", "company", "institute", "government", "other"];

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub business_number: Option<String>,
    pub org_type: String,
    pub representative: Option<String>,
    pub address: Option<String>,
    pub is_flag: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROLES: &[&str] = &["lead", "participant", "joint"];
pub const LEAD: &str = "lead";

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsortiumMember {
    pub id: Uuid,
    pub project_id: Uuid,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub project_year: i32,
    pub role: String,
    pub member_name: String,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub responsibility: Option<String>,
    pub is_flag: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

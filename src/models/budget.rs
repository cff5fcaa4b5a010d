use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCategory {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub sort_order: i32,
}

/// Item row joined with its budget's year/organization and category code.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub project_year: i32,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub category_code: String,
    pub fund_type: String,
    pub amount: i64,
}

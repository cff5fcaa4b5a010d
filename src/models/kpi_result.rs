use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiResult {
    pub id: Uuid,
    pub project_id: Uuid,
    pub project_year: i32,
    pub kpi_category: String,
    pub kpi_name: String,
    pub unit: Option<String>,
    pub target_value: f64,
    pub actual_value: Option<f64>,
    pub achievement_rate: Option<f64>,
    pub evidence: Option<String>,
    pub note: Option<String>,
    pub is_flag: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Percentage of target reached, rounded to one decimal.
/// `None` without an actual value or with a non-positive target.
pub fn achievement_rate(target: f64, actual: Option<f64>) -> Option<f64> {
    let actual = actual?;
    if target <= 0.0 || !target.is_finite() || !actual.is_finite() {
        return None;
    }
    Some((actual / target * 1000.0).round() / 10.0)
}

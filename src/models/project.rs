use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STATUSES: &[&str] = &["planning", "active", "completed", "suspended"];

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub project_code: String,
    pub title: String,
    pub description: Option<String>,
    pub manager_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_years: i32,
    pub status: String,
    pub total_budget: i64,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Number of project years spanned by the calendar years of `start..=end`.
pub fn total_years(start: NaiveDate, end: NaiveDate) -> i32 {
    end.year() - start.year() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_years_counts_calendar_years() {
        let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(total_years(d(2026, 3, 1), d(2026, 12, 31)), 1);
        assert_eq!(total_years(d(2026, 4, 1), d(2028, 12, 31)), 3);
        assert_eq!(total_years(d(2025, 12, 31), d(2026, 1, 1)), 2);
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STATUSES: &[&str] = &["pending", "in_progress", "completed", "delayed"];
pub const COMPLETED: &str = "completed";

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: Uuid,
    pub project_id: Uuid,
    pub project_year: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub status: String,
    pub completed_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `completed_at` for a milestone in `status`: when completed, the requested
/// date, else the date it was already completed on, else `today`. Cleared
/// for any other status.
pub fn completion_date(
    status: &str,
    requested: Option<NaiveDate>,
    previous: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<NaiveDate> {
    if status == COMPLETED {
        Some(requested.or(previous).unwrap_or(today))
    } else {
        None
    }
}

impl Milestone {
    /// Completion date worth keeping across an edit.
    pub fn kept_completion(&self) -> Option<NaiveDate> {
        if self.status == COMPLETED {
            self.completed_at
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_date_follows_status() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let given = NaiveDate::from_ymd_opt(2026, 9, 30).unwrap();
        assert_eq!(completion_date("completed", None, None, today), Some(today));
        assert_eq!(completion_date("completed", Some(given), None, today), Some(given));
        assert_eq!(completion_date("in_progress", Some(given), None, today), None);
    }

    #[test]
    fn completion_date_keeps_earlier_stamp() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let done = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let given = NaiveDate::from_ymd_opt(2026, 9, 30).unwrap();
        assert_eq!(completion_date("completed", None, Some(done), today), Some(done));
        assert_eq!(completion_date("completed", Some(given), Some(done), today), Some(given));
        assert_eq!(completion_date("delayed", None, Some(done), today), None);
    }
}

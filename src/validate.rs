use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

static PROJECT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,49}$").expect("valid code regex"));

/// Collects names of absent required fields so a single 400 can list them all.
///
/// Accessors return a default placeholder for missing values; callers must
/// call [`Missing::finish`] before using anything they returned.
#[derive(Debug, Default)]
pub struct Missing(Vec<&'static str>);

impl Missing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Required text: trimmed, and blank counts as missing.
    pub fn text(&mut self, field: &'static str, value: Option<String>) -> String {
        match trimmed(value) {
            Some(v) => v,
            None => {
                self.0.push(field);
                String::new()
            }
        }
    }

    pub fn value<T: Default>(&mut self, field: &'static str, value: Option<T>) -> T {
        match value {
            Some(v) => v,
            None => {
                self.0.push(field);
                T::default()
            }
        }
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.0
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::BadRequest(format!(
                "필수 항목이 누락되었습니다: {}",
                self.0.join(", ")
            )))
        }
    }
}

/// Trims optional text; blank becomes `None`.
pub fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), AppError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "{field} 값이 올바르지 않습니다: {value} (허용: {})",
            allowed.join(", ")
        )))
    }
}

/// Project years are 1-based and bounded by the project's duration.
pub fn project_year(year: i32, total_years: i32) -> Result<(), AppError> {
    if year < 1 || year > total_years {
        return Err(AppError::BadRequest(format!(
            "연차는 1부터 {total_years} 사이여야 합니다: {year}"
        )));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), AppError> {
    if EMAIL.is_match(value) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "이메일 형식이 올바르지 않습니다: {value}"
        )))
    }
}

pub fn project_code(value: &str) -> Result<(), AppError> {
    if PROJECT_CODE.is_match(value) {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "과제번호는 영문, 숫자, '-', '_' 만 사용할 수 있습니다 (최대 50자).".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_collects_every_absent_field() {
        let mut missing = Missing::new();
        let title = missing.text("title", Some("  과제  ".to_string()));
        missing.text("projectCode", Some("   ".to_string()));
        missing.value::<i32>("projectYear", None);
        assert_eq!(title, "과제");
        assert_eq!(missing.fields(), &["projectCode", "projectYear"]);

        let err = missing.finish().unwrap_err();
        match err {
            AppError::BadRequest(msg) => {
                assert!(msg.contains("projectCode"));
                assert!(msg.contains("projectYear"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_finish_ok_when_complete() {
        let mut missing = Missing::new();
        missing.text("title", Some("x".to_string()));
        missing.value("year", Some(1));
        assert!(missing.finish().is_ok());
    }

    #[test]
    fn project_year_bounds() {
        assert!(project_year(1, 3).is_ok());
        assert!(project_year(3, 3).is_ok());
        assert!(project_year(0, 3).is_err());
        assert!(project_year(4, 3).is_err());
    }

    #[test]
    fn one_of_rejects_unknown_values() {
        assert!(one_of("status", "active", &["planning", "active"]).is_ok());
        assert!(one_of("status", "archived", &["planning", "active"]).is_err());
    }

    #[test]
    fn email_and_code_formats() {
        assert!(email("kim@lab.ac.kr").is_ok());
        assert!(email("kim@lab").is_err());
        assert!(project_code("RS-2026_001").is_ok());
        assert!(project_code("-bad").is_err());
        assert!(project_code("공백 포함").is_err());
    }
}

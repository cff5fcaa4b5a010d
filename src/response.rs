use axum::Json;
use serde::Serialize;

use crate::error::AppError;

/// `{ success, data?, message? }` envelope shared by every JSON API route.
/// Failures are rendered by `AppError` with the same `success: false` shape.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        message: None,
    })
}

pub fn ok_with_message<T: Serialize>(data: T, message: &str) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        message: Some(message.to_string()),
    })
}

pub fn message(message: &str) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        success: true,
        data: None,
        message: Some(message.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_envelope_omits_data() {
        let Json(body) = message("삭제되었습니다.");
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value["success"], true);
        assert!(value.get("data").is_none());
        assert_eq!(value["message"], "삭제되었습니다.");
    }

    #[test]
    fn data_envelope() {
        let Json(body) = ok(vec![1, 2, 3]);
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], serde_json::json!([1, 2, 3]));
        assert!(value.get("message").is_none());
    }
}

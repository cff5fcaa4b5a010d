use axum::http::HeaderMap;
use bytes::Bytes;
use serde_json::{Map, Value};

use crate::error::AppError;

/// A file part of a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Request body as flat fields plus any uploaded files.
#[derive(Debug, Default)]
pub struct FormPayload {
    pub fields: Map<String, Value>,
    pub files: Vec<UploadedFile>,
}

impl FormPayload {
    pub fn take_file(&mut self, field: &str) -> Option<UploadedFile> {
        let index = self.files.iter().position(|f| f.field == field)?;
        Some(self.files.remove(index))
    }

    /// Deserialize the fields into a request struct.
    pub fn fields_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| AppError::BadRequest(format!("잘못된 요청 본문입니다: {e}")))
    }
}

/// Accepts JSON, urlencoded form or multipart bodies as one shape.
pub async fn parse(headers: &HeaderMap, body: Bytes) -> Result<FormPayload, AppError> {
    let content_type = headers.get("content-type").and_then(|v| v.to_str().ok());

    if content_type.is_some_and(|ct| ct.contains("multipart/form-data")) {
        return parse_multipart(headers, body)
            .await
            .map_err(AppError::BadRequest);
    }

    match parse_body(content_type, &body).map_err(AppError::BadRequest)? {
        Value::Object(fields) => Ok(FormPayload {
            fields,
            files: Vec::new(),
        }),
        _ => Err(AppError::BadRequest(
            "요청 본문은 객체 형식이어야 합니다.".to_string(),
        )),
    }
}

/// Parse a non-multipart body based on Content-Type.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Value, String> {
    let ct = content_type.unwrap_or("application/json");

    if ct.contains("application/json") {
        serde_json::from_slice(body).map_err(|e| format!("잘못된 JSON 형식입니다: {e}"))
    } else if ct.contains("application/x-www-form-urlencoded") {
        Ok(parse_form_urlencoded(body))
    } else {
        Err(format!("지원하지 않는 Content-Type 입니다: {ct}"))
    }
}

fn parse_form_urlencoded(body: &[u8]) -> Value {
    let map: Map<String, Value> = form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect();
    Value::Object(map)
}

/// Parse multipart form data using multer. Parts with a file name become
/// [`UploadedFile`]s; empty file inputs are dropped; empty text parts are skipped.
pub async fn parse_multipart(headers: &HeaderMap, body: Bytes) -> Result<FormPayload, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "multipart boundary 가 없습니다.".to_string())?;

    let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut payload = FormPayload::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("multipart 오류: {e}"))?
    {
        let name = field.name().unwrap_or("unknown").to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field.content_type().map(|m| m.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| format!("파일 읽기 오류: {e}"))?;
            if file_name.is_empty() || data.is_empty() {
                continue;
            }
            payload.files.push(UploadedFile {
                field: name,
                file_name,
                content_type,
                data,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| format!("필드 읽기 오류: {e}"))?;
            if !value.is_empty() {
                payload.fields.insert(name, Value::String(value));
            }
        }
    }

    Ok(payload)
}

/// `true`, `"true"`, `"1"` and `"on"` count as set.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => matches!(s.as_str(), "true" | "1" | "on"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn multipart_splits_fields_and_files() {
        let body = "--XyZ\r\n\
            Content-Disposition: form-data; name=\"title\"\r\n\r\n\
            실험 기록\r\n\
            --XyZ\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"result.csv\"\r\n\
            Content-Type: text/csv\r\n\r\n\
            a,b\n1,2\r\n\
            --XyZ--\r\n";
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            "multipart/form-data; boundary=XyZ".parse().unwrap(),
        );

        let mut payload = parse(&headers, Bytes::from(body)).await.unwrap();
        assert_eq!(payload.fields["title"], "실험 기록");
        let file = payload.take_file("file").unwrap();
        assert_eq!(file.file_name, "result.csv");
        assert_eq!(file.content_type.as_deref(), Some("text/csv"));
        assert_eq!(&file.data[..], b"a,b\n1,2");
        assert!(payload.take_file("file").is_none());
    }

    #[tokio::test]
    async fn urlencoded_and_json_bodies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            "application/x-www-form-urlencoded".parse().unwrap(),
        );
        let payload = parse(&headers, Bytes::from("title=a%20b&logDate=2026-10-01"))
            .await
            .unwrap();
        assert_eq!(payload.fields["title"], "a b");

        headers.insert("content-type", "application/json".parse().unwrap());
        let payload = parse(&headers, Bytes::from(r#"{"title":"x"}"#)).await.unwrap();
        assert_eq!(payload.fields["title"], "x");

        assert!(parse(&headers, Bytes::from("[1,2]")).await.is_err());
    }

    #[test]
    fn truthy_values() {
        assert!(truthy(Some(&json!(true))));
        assert!(truthy(Some(&json!("on"))));
        assert!(truthy(Some(&json!(1))));
        assert!(!truthy(Some(&json!("false"))));
        assert!(!truthy(None));
    }
}

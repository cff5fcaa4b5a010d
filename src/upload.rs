use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::AppError;
use crate::forms::UploadedFile;

/// URL prefix the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

const MAX_NAME_CHARS: usize = 100;

#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Path under [`PUBLIC_PREFIX`], e.g. `/uploads/<uuid>_report.pdf`.
    pub public_path: String,
    pub original_name: String,
    pub disk_path: PathBuf,
}

/// Keeps only the base name and replaces characters outside letters, digits,
/// `.`, `-` and `_`. Never returns an empty or dot-only name.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

pub async fn store(dir: &Path, file: &UploadedFile) -> Result<StoredFile, AppError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {e}")))?;

    let stored_name = format!("{}_{}", Uuid::now_v7(), sanitize_file_name(&file.file_name));
    let disk_path = dir.join(&stored_name);

    tokio::fs::write(&disk_path, &file.data)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to write upload: {e}")))?;

    tracing::info!(path = %disk_path.display(), bytes = file.data.len(), "Stored upload");

    Ok(StoredFile {
        public_path: format!("{PUBLIC_PREFIX}/{stored_name}"),
        original_name: file.file_name.clone(),
        disk_path,
    })
}

/// Deletes a previously stored file by its public path. Missing files and
/// paths outside the upload directory are ignored.
pub async fn remove(dir: &Path, public_path: &str) {
    let Some(name) = public_path
        .strip_prefix(PUBLIC_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return;
    };
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return;
    }

    if let Err(e) = tokio::fs::remove_file(dir.join(name)).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove upload {public_path}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\연구 결과.pdf"), "연구_결과.pdf");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name("..."), "file");
        assert_eq!(sanitize_file_name(""), "file");
        assert_eq!(sanitize_file_name(&"a".repeat(300)).len(), 100);
    }

    #[tokio::test]
    async fn store_and_remove() {
        let dir = std::env::temp_dir().join(format!("portal-upload-test-{}", Uuid::now_v7()));
        let file = UploadedFile {
            field: "file".to_string(),
            file_name: "측정값.csv".to_string(),
            content_type: Some("text/csv".to_string()),
            data: Bytes::from_static(b"1,2,3"),
        };

        let stored = store(&dir, &file).await.unwrap();
        assert!(stored.public_path.starts_with("/uploads/"));
        assert!(stored.public_path.ends_with("_측정값.csv"));
        assert_eq!(tokio::fs::read(&stored.disk_path).await.unwrap(), b"1,2,3");

        remove(&dir, &stored.public_path).await;
        assert!(!stored.disk_path.exists());

        // outside the upload dir: ignored
        remove(&dir, "/etc/passwd").await;
        remove(&dir, "/uploads/../secret").await;

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}

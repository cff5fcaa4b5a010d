use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;

/// Record a mutation in `audit_events`. Called explicitly by handlers after
/// the write succeeds; a failed audit insert is logged and otherwise ignored.
pub async fn log_event(
    pool: &PgPool,
    auth: &AuthUser,
    action: &str,
    resource_type: &str,
    resource_id: Option<Uuid>,
    details: Option<serde_json::Value>,
) {
    tracing::info!(user_id = %auth.user_id, action, resource_type, ?resource_id, "mutation");
    if let Err(e) = crate::db::audit::log_event(
        pool,
        Some(auth.user_id),
        action,
        resource_type,
        resource_id,
        details,
    )
    .await
    {
        tracing::error!("Failed to log audit event: {e}");
    }
}

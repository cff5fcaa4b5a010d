use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::auth::extractor::{ACCESS_COOKIE, AuthUser};
use crate::auth::jwt::{self, Claims, encode_token};
use crate::auth::password;
use crate::config::RegistrationMode;
use crate::db;
use crate::error::AppError;
use crate::extract::ApiJson;
use crate::middleware::audit;
use crate::models::User;
use crate::response::{self, ApiResponse, ApiResult};
use crate::state::SharedState;
use crate::validate::{self, Missing};

const REFRESH_COOKIE: &str = "refresh_token";
const REFRESH_TOKEN_DAYS: i64 = 7;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

fn auth_cookies(access_token: &str, refresh_token: &str) -> CookieJar {
    let access = Cookie::build((ACCESS_COOKIE, access_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(jwt::ACCESS_TOKEN_MINUTES))
        .build();

    let refresh = Cookie::build((REFRESH_COOKIE, refresh_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(REFRESH_TOKEN_DAYS))
        .build();

    CookieJar::new().add(access).add(refresh)
}

fn clear_auth_cookies() -> CookieJar {
    let access = Cookie::build((ACCESS_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    let refresh = Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(access).add(refresh)
}

fn generate_refresh_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issues an access token and a fresh refresh token for `user`.
async fn issue_session(
    state: &SharedState,
    user: User,
) -> Result<(CookieJar, Json<ApiResponse<AuthResponse>>), AppError> {
    let claims = Claims::new(user.id, user.role.clone());
    let access_token = encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    let refresh = generate_refresh_token();
    db::refresh_tokens::create(
        &state.pool,
        user.id,
        &hash_token(&refresh),
        Utc::now() + Duration::days(REFRESH_TOKEN_DAYS),
    )
    .await?;

    let jar = auth_cookies(&access_token, &refresh);
    Ok((
        jar,
        response::ok(AuthResponse {
            access_token,
            refresh_token: refresh,
            user,
        }),
    ))
}

/// The first account becomes `admin`. Later accounts are `member`s and only
/// allowed while registration is open.
pub async fn register(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(CookieJar, Json<ApiResponse<AuthResponse>>), AppError> {
    let mut missing = Missing::new();
    let email = missing.text("email", req.email);
    let pw = missing.value("password", req.password);
    let name = missing.text("name", req.name);
    missing.finish()?;

    validate::email(&email)?;
    password::check_length(&pw)?;

    let pw_hash = password::hash(&pw).map_err(AppError::Internal)?;

    // Advisory lock serializes concurrent bootstrap registrations
    let mut tx = state.pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock(1)")
        .execute(&mut *tx)
        .await?;

    let count = db::users::count_all(&mut *tx).await?;
    let role = if count == 0 { "admin" } else { "member" };
    if count > 0 && state.config.registration == RegistrationMode::Closed {
        return Err(AppError::Forbidden(
            "회원가입이 비활성화되어 있습니다. 관리자에게 문의하세요.".to_string(),
        ));
    }

    let user = db::users::create(&mut *tx, &email, &pw_hash, &name, role)
        .await
        .map_err(|e| AppError::unique_or_db(e, "이미 등록된 이메일입니다."))?;

    tx.commit().await?;

    tracing::info!(user_id = %user.id, role, "User registered");
    let auth = AuthUser {
        user_id: user.id,
        role: user.role.clone(),
    };
    audit::log_event(&state.pool, &auth, "user.registered", "user", Some(user.id), None).await;

    issue_session(&state, user).await
}

pub async fn login(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<AuthResponse>>), AppError> {
    let mut missing = Missing::new();
    let email = missing.text("email", req.email);
    let pw = missing.value("password", req.password);
    missing.finish()?;

    if let Err(retry_after) = state.login_limiter.check(&email) {
        return Err(AppError::RateLimited(format!(
            "로그인 시도가 너무 많습니다. {retry_after}초 후에 다시 시도해 주세요."
        )));
    }

    let invalid = || AppError::Unauthorized("이메일 또는 비밀번호가 올바르지 않습니다.".to_string());

    let Some(user) = db::users::find_by_email(&state.pool, &email).await? else {
        state.login_limiter.record_failure(&email);
        return Err(invalid());
    };

    let valid = password::verify(&pw, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        state.login_limiter.record_failure(&email);
        return Err(invalid());
    }
    state.login_limiter.reset(&email);

    let auth = AuthUser {
        user_id: user.id,
        role: user.role.clone(),
    };
    audit::log_event(&state.pool, &auth, "user.login", "user", Some(user.id), None).await;

    issue_session(&state, user).await
}

/// Rotates the refresh token. Presenting an already used token revokes
/// every session of its owner.
pub async fn refresh(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<AuthResponse>>), AppError> {
    let refresh_value = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::Unauthorized("리프레시 토큰이 없습니다.".to_string()))?;

    let stored = db::refresh_tokens::find_by_hash(&state.pool, &hash_token(&refresh_value))
        .await?
        .ok_or_else(|| AppError::Unauthorized("유효하지 않은 리프레시 토큰입니다.".to_string()))?;

    if stored.expires_at < Utc::now() {
        return Err(AppError::Unauthorized("리프레시 토큰이 만료되었습니다.".to_string()));
    }

    if stored.used || !db::refresh_tokens::claim(&state.pool, stored.id).await? {
        tracing::warn!(
            "Refresh token reuse detected for user {}. Revoking all sessions.",
            stored.user_id
        );
        db::refresh_tokens::delete_all_for_user(&state.pool, stored.user_id).await?;
        return Err(AppError::Unauthorized(
            "리프레시 토큰 재사용이 감지되어 모든 세션을 종료했습니다.".to_string(),
        ));
    }

    let user = db::users::find_by_id(&state.pool, stored.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("사용자를 찾을 수 없습니다.".to_string()))?;

    issue_session(&state, user).await
}

pub async fn logout(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<()>>), AppError> {
    if let Some(cookie) = jar.get(REFRESH_COOKIE) {
        db::refresh_tokens::delete_by_hash(&state.pool, &hash_token(cookie.value())).await?;
    }

    Ok((clear_auth_cookies(), response::message("로그아웃되었습니다.")))
}

pub async fn me(auth: AuthUser, State(state): State<SharedState>) -> ApiResult<User> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("사용자를 찾을 수 없습니다.".to_string()))?;
    Ok(response::ok(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_tokens_are_random_hex_and_hashed() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(hash_token(&a), hash_token(&a));
        assert_ne!(hash_token(&a), a);
    }
}

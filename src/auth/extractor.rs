use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::extract::CookieJar;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use uuid::Uuid;

use crate::auth::jwt;
use crate::error::AppError;
use crate::state::SharedState;

pub const ACCESS_COOKIE: &str = "access_token";

/// Session of the calling user, from a Bearer header or the access-token cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("관리자 권한이 필요합니다.".to_string()))
        }
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let session = |token: &str| -> Result<AuthUser, AppError> {
            let claims = jwt::decode_token(token, &state.config.jwt_secret).map_err(|_| {
                AppError::Unauthorized("세션이 만료되었거나 유효하지 않습니다.".to_string())
            })?;
            Ok(AuthUser {
                user_id: claims.sub,
                role: claims.role,
            })
        };

        if let Ok(TypedHeader(Authorization(bearer))) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await
        {
            return session(bearer.token());
        }

        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(cookie) = jar.get(ACCESS_COOKIE) {
            return session(cookie.value());
        }

        Err(AppError::Unauthorized(
            "로그인 정보가 없습니다. 다시 로그인해 주세요.".to_string(),
        ))
    }
}

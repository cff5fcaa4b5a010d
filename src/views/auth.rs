use askama::Template;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::extractor::ACCESS_COOKIE;
use crate::auth::jwt;
use crate::error::AppError;
use crate::state::SharedState;
use crate::views::render;

#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    next: String,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login.
fn safe_next(next: Option<String>) -> String {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") && !n.starts_with("/\\") => n,
        _ => "/projects".to_string(),
    }
}

pub async fn login_page(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(q): Query<LoginQuery>,
) -> Result<Response, AppError> {
    let next = safe_next(q.next);

    if let Some(cookie) = jar.get(ACCESS_COOKIE) {
        if jwt::decode_token(cookie.value(), &state.config.jwt_secret).is_ok() {
            return Ok(Redirect::to(&next).into_response());
        }
    }

    Ok(render(&LoginTemplate { next })?.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_must_be_local_path() {
        assert_eq!(safe_next(Some("/projects/1".into())), "/projects/1");
        assert_eq!(safe_next(Some("//evil.example".into())), "/projects");
        assert_eq!(safe_next(Some("https://evil.example".into())), "/projects");
        assert_eq!(safe_next(None), "/projects");
    }
}

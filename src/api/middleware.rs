use crate::api::AppState;
use crate::domain::user::Identity;
use crate::error::AppError;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use uuid::Uuid;

/// A verified caller on the REST surface.
#[derive(Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub identity: Identity,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).or_else(|| cookie_token(&parts.headers)).ok_or(AppError::AuthError)?;

        let identity = state.identity_service.authenticate_verified(token).await?;
        tracing::Span::current().record("user_id", tracing::field::display(identity.user_id));

        Ok(Self { user_id: identity.user_id, identity })
    }
}

/// The token from an `Authorization: Bearer` header, if present.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The `token` cookie, if present.
pub(crate) fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| pair.trim().strip_prefix("token="))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_cookie_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; token=abc.def; lang=en"));
        assert_eq!(cookie_token(&headers), Some("abc.def"));

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; mytoken=zzz"));
        assert_eq!(cookie_token(&headers), None);
    }
}

//! Bearer-token authentication for REST handlers.
//!
//! Handlers take a [`CurrentUser`] argument to require a live session. Role checks are explicit
//! calls on the extracted user so each handler states which role it serves.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use records_core::{Role, User};

use crate::error::ApiError;
use crate::state::AppState;

/// The user bound to the request's bearer token.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub token: String,
    pub user: User,
}

impl CurrentUser {
    pub fn require_role(&self, role: Role, denied: &'static str) -> Result<(), ApiError> {
        if self.user.role == role {
            Ok(())
        } else {
            tracing::debug!(
                "{} ({}) denied access to a {} route",
                self.user.username,
                self.user.role,
                role
            );
            Err(ApiError::Forbidden(denied))
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or(ApiError::Unauthenticated("Not authenticated"))?;

        let session = state
            .store
            .get_session(token)
            .ok_or(ApiError::Unauthenticated("Invalid or expired token"))?;

        Ok(CurrentUser {
            token: session.token,
            user: session.user,
        })
    }
}

/// Token from an `Authorization: Bearer <token>` header. The scheme is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(value).expect("valid header"),
        );
        headers
    }

    #[test]
    fn parses_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("bearer  abc123 ")), Some("abc123"));
    }

    #[test]
    fn rejects_other_schemes_and_blank_tokens() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("abc123")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}

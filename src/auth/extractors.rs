use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::error::AppError;

/// Authenticated caller; rejects the request with 401 otherwise.
pub struct AuthUser(pub i32);

/// Anonymous when no Authorization header is sent; a presented token must verify.
pub struct MaybeAuthUser(pub Option<i32>);

/// Value after the scheme in `Authorization: Bearer <token>`.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AppError::invalid_token())?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(Some)
        .ok_or_else(AppError::invalid_token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or_else(AppError::missing_token)?;
        let claims = JwtKeys::from_ref(state).verify(token).map_err(|_| {
            warn!("invalid or expired token");
            AppError::invalid_token()
        })?;
        Ok(AuthUser(claims.sub))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts)? else {
            return Ok(MaybeAuthUser(None));
        };
        let claims = JwtKeys::from_ref(state).verify(token).map_err(|_| {
            warn!("invalid or expired token on optional route");
            AppError::invalid_token()
        })?;
        Ok(MaybeAuthUser(Some(claims.sub)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/expenses");
        if let Some(h) = header {
            builder = builder.header(AUTHORIZATION, h);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_rejected_with_missing_token() {
        let state = AppState::fake();
        let mut parts = parts_with(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("rejected");
        assert_eq!(err.to_string(), "missing token");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected_with_invalid_token() {
        let state = AppState::fake();
        for header in ["Bearer nope", "Token abc", "Bearer "] {
            let mut parts = parts_with(Some(header));
            let err = AuthUser::from_request_parts(&mut parts, &state)
                .await
                .err()
                .expect("rejected");
            assert_eq!(err.to_string(), "invalid token", "header {header:?}");
        }
    }

    #[tokio::test]
    async fn valid_token_yields_identity() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).issue(9).unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {token}")));
        let AuthUser(id) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .ok()
            .expect("accepted");
        assert_eq!(id, 9);
    }

    #[tokio::test]
    async fn optional_guard_is_anonymous_only_without_header() {
        let state = AppState::fake();

        let mut parts = parts_with(None);
        let MaybeAuthUser(id) = MaybeAuthUser::from_request_parts(&mut parts, &state)
            .await
            .ok()
            .unwrap();
        assert_eq!(id, None);

        let token = JwtKeys::from_ref(&state).issue(3).unwrap();
        let mut parts = parts_with(Some(&format!("bearer {token}")));
        let MaybeAuthUser(id) = MaybeAuthUser::from_request_parts(&mut parts, &state)
            .await
            .ok()
            .unwrap();
        assert_eq!(id, Some(3));
    }

    #[tokio::test]
    async fn optional_guard_rejects_bad_tokens() {
        let state = AppState::fake();
        for header in ["Bearer forged", "Basic dXNlcjpwdw==", "Bearer "] {
            let mut parts = parts_with(Some(header));
            let err = MaybeAuthUser::from_request_parts(&mut parts, &state)
                .await
                .err()
                .expect("rejected");
            assert_eq!(err.to_string(), "invalid token", "header {header:?}");
        }
    }
}

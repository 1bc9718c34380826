use std::time::Duration;

use anyhow::Context;
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

/// JWT payload binding a user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,    // user id
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
    pub iss: String, // issuer
    pub aud: String, // audience
}

/// Bad signature, bad shape and expiry all look the same from outside.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(1) as u64).saturating_mul(60)),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn issue(&self, user_id: i32) -> anyhow::Result<String> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    fn issue_at(&self, user_id: i32, issued_at: OffsetDateTime) -> anyhow::Result<String> {
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|secs| issued_at.checked_add(TimeDuration::seconds(secs)))
            .context("token expiry out of range")?;
        let claims = Claims {
            sub: user_id,
            iat: issued_at.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            TokenError::Invalid
        })?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_with(secret: &str, issuer: &str) -> JwtKeys {
        JwtKeys::from(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: "test-aud".into(),
            ttl_minutes: 7 * 24 * 60,
        })
    }

    fn keys() -> JwtKeys {
        keys_with("dev-secret", "test-issuer")
    }

    #[test]
    fn issue_and_verify() {
        let keys = keys();
        let token = keys.issue(42).expect("sign");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[test]
    fn expiry_is_seven_days_out() {
        let keys = keys();
        let claims = keys.verify(&keys.issue(1).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn expired_token_fails_like_malformed_one() {
        let keys = keys();
        let long_ago = OffsetDateTime::now_utc() - TimeDuration::days(8);
        let expired = keys.issue_at(1, long_ago).unwrap();

        let expired_err = keys.verify(&expired).unwrap_err();
        let malformed_err = keys.verify("not.a.jwt").unwrap_err();
        assert_eq!(expired_err, malformed_err);
        assert_eq!(expired_err.to_string(), "invalid token");
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = keys_with("other-secret", "test-issuer").issue(1).unwrap();
        assert_eq!(keys().verify(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let token = keys_with("dev-secret", "someone-else").issue(1).unwrap();
        assert!(keys().verify(&token).is_err());
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let keys = JwtKeys::from(&JwtConfig {
            secret: "dev-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 100_000_000_000,
        });
        let err = keys.issue(1).unwrap_err();
        assert!(err.to_string().contains("expiry"));
    }
}

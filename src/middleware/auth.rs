use axum::{extract::FromRequestParts, http::header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    error::{AppError, AppResult},
    state::AppState,
};

/// Identity proven by a valid session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

impl AuthUser {
    /// Callers may only act on their own records.
    pub fn ensure_self(&self, user_id: Uuid) -> Result<(), AppError> {
        if self.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }
}

/// Sign a session token binding the user id and email, valid for `ttl_hours`.
pub fn issue_token(
    user_id: Uuid,
    email: &str,
    secret: &SecretString,
    ttl_hours: i64,
) -> AppResult<String> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_token(token: &str, secret: &SecretString) -> AppResult<AuthUser> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        email: decoded.claims.email,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

        verify_token(token, &state.config.jwt_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let id = Uuid::new_v4();
        let token = issue_token(id, "alice@x.com", &secret("s3cret"), 24).unwrap();

        let user = verify_token(&token, &secret("s3cret")).unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.email, "alice@x.com");
    }

    #[test]
    fn rejects_foreign_and_expired_tokens() {
        let id = Uuid::new_v4();
        let token = issue_token(id, "alice@x.com", &secret("s3cret"), 24).unwrap();
        assert!(matches!(
            verify_token(&token, &secret("other")),
            Err(AppError::Unauthorized(_))
        ));

        let expired = issue_token(id, "alice@x.com", &secret("s3cret"), -2).unwrap();
        assert!(matches!(
            verify_token(&expired, &secret("s3cret")),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn ensure_self_forbids_other_users() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            email: "a@b.c".into(),
        };
        assert!(user.ensure_self(user.user_id).is_ok());
        assert!(matches!(
            user.ensure_self(Uuid::new_v4()),
            Err(AppError::Forbidden)
        ));
    }
}

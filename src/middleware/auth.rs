//! Bearer-token authentication.
//!
//! Token issuance lives in the auth collaborator; this extractor only
//! validates the JWT and resolves `(caller id, role)` for handlers to
//! pass into core operations.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Caller, UserRole};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub exp: usize,
}

/// The authenticated caller, extracted from the Authorization header.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn caller(&self) -> Caller {
        Caller {
            id: self.id,
            role: self.role,
        }
    }
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthenticatedUser, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| ApiError::Unauthorized(format!("invalid token: {}", e)))?;

    Ok(AuthenticatedUser {
        id: data.claims.sub,
        role: data.claims.role.parse()?,
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::Unauthorized("missing bearer token".to_string()))?;

        decode_token(bearer.token(), &state.jwt_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_for(role: &str, secret: &str) -> String {
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: role.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_resolves_caller() {
        let token = token_for("ADMIN", "test-secret");
        let user = decode_token(&token, "test-secret").unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert!(user.caller().is_admin());
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = token_for("USER", "test-secret");
        assert!(matches!(
            decode_token(&token, "other-secret"),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn unknown_role_is_unauthorized() {
        let token = token_for("SUPERUSER", "test-secret");
        assert!(matches!(
            decode_token(&token, "test-secret"),
            Err(ApiError::Unauthorized(_))
        ));
    }
}

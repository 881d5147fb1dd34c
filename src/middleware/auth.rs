use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::error::AppError;

/// JWT Claims issued by the identity provider.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject - User ID as String
    pub sub: String,
    /// Email of the authenticated user.
    pub email: String,
    /// Expiration timestamp (UNIX TIME)
    pub exp: usize,
}

impl Claims {
    /// Converts `sub` (user ID) to `i32`.
    pub fn user_id(&self) -> Result<i32, AppError> {
        self.sub
            .parse::<i32>()
            .map_err(|_| AppError::Unauthenticated("Invalid user ID format in token".into()))
    }

    /// Signs a token for `user_id` that expires `ttl_secs` from now.
    pub fn issue(
        secret: &str,
        user_id: i32,
        email: impl Into<String>,
        ttl_secs: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.into(),
            exp: (chrono::Utc::now().timestamp() + ttl_secs).max(0) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Validates signature and expiry of a bearer token.
    pub fn verify(secret: &str, token: &str) -> Result<Self, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::warn!("JWT decoding failed: {:?}", e);
            AppError::Unauthenticated("Invalid token".into())
        })?;

        let claims = token_data.claims;
        claims.user_id()?;
        Ok(claims)
    }
}

/// ✅ **JWT Middleware** (Handles Token Authentication)
pub async fn jwt_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Step 1: Extract Authorization header
    let auth_header = req.headers().get("Authorization").ok_or_else(|| {
        tracing::warn!("Missing Authorization header");
        AppError::Unauthenticated("Missing Authorization header".into())
    })?;

    // Step 2: Convert header to string
    let token_str = auth_header.to_str().map_err(|_| {
        tracing::warn!("Invalid Authorization header format");
        AppError::Unauthenticated("Invalid Authorization header format".into())
    })?;

    // Step 3: Strip "Bearer " prefix
    let token = token_str.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("Invalid token format (missing 'Bearer ' prefix)");
        AppError::Unauthenticated("Invalid token format (missing 'Bearer ' prefix)".into())
    })?;

    // Step 4: Decode the JWT token
    let claims = Claims::verify(&state.config.jwt_secret, token)?;

    // Step 5: Insert claims into request extensions
    tracing::debug!(user = %claims.sub, "JWT decoded successfully");
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_token_verifies() {
        let token = Claims::issue(SECRET, 12, "u12@example.com", 3600).unwrap();
        let claims = Claims::verify(SECRET, &token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 12);
        assert_eq!(claims.email, "u12@example.com");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = Claims::issue(SECRET, 12, "u12@example.com", 3600).unwrap();
        assert!(matches!(
            Claims::verify("other-secret", &token),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = Claims::issue(SECRET, 12, "u12@example.com", -3600).unwrap();
        assert!(Claims::verify(SECRET, &token).is_err());
    }

    #[test]
    fn non_numeric_subject_is_rejected() {
        let claims = Claims {
            sub: "not-a-number".into(),
            email: "x@example.com".into(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            Claims::verify(SECRET, &token),
            Err(AppError::Unauthenticated(msg)) if msg.contains("user ID")
        ));
    }
}

//! Authentication middleware
//!
//! Coordinator and admin routes carry `Authorization: Bearer <jwt>` tokens
//! signed with HS256. Handlers ask for [`AuthUser`], [`Coordinator`] or
//! [`Admin`] as an extractor.

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::config::settings::AuthConfig;
use crate::models::UserRole;
use crate::utils::errors::{AceError, Result};

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Actor recorded on audit fields (user id or email)
    pub sub: String,
    pub role: UserRole,
    pub exp: i64,
    pub iss: String,
}

/// Issues and checks access tokens
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl_minutes: i64,
}

impl std::fmt::Debug for JwtAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuth")
            .field("issuer", &self.issuer)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish_non_exhaustive()
    }
}

impl JwtAuth {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            ttl_minutes: config.token_ttl_minutes,
        }
    }

    /// Sign a token for `subject`
    pub fn issue_token(&self, subject: &str, role: UserRole) -> Result<String> {
        let claims = Claims {
            sub: subject.to_string(),
            role,
            exp: (Utc::now() + Duration::minutes(self.ttl_minutes)).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AceError::Authentication(format!("Failed to sign token: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                AceError::Authentication("Invalid or expired token".to_string())
            })
    }

    /// Claims from an `Authorization` header value
    pub fn authenticate(&self, header: Option<&str>) -> Result<Claims> {
        let header = header.ok_or_else(|| AceError::Authentication("Missing authorization token".to_string()))?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AceError::Authentication("Authorization header must use the Bearer scheme".to_string()))?;
        self.verify_token(token)
    }
}

/// Any caller holding a valid token
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn actor(&self) -> &str {
        &self.0.sub
    }

    pub fn role(&self) -> UserRole {
        self.0.role
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    JwtAuth: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let auth = JwtAuth::from_ref(state);
        let header = parts.headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
        auth.authenticate(header).map(AuthUser)
    }
}

/// ACE coordinator or admin
#[derive(Debug, Clone)]
pub struct Coordinator(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for Coordinator
where
    JwtAuth: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role().is_coordinator() {
            Ok(Coordinator(user))
        } else {
            warn!(subject = %user.actor(), role = %user.role(), "Coordinator access denied");
            Err(AceError::PermissionDenied("ACE coordinator privileges required".to_string()))
        }
    }
}

/// Platform administrator
#[derive(Debug, Clone)]
pub struct Admin(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for Admin
where
    JwtAuth: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role() == UserRole::Admin {
            Ok(Admin(user))
        } else {
            warn!(subject = %user.actor(), role = %user.role(), "Admin access denied");
            Err(AceError::PermissionDenied("Admin privileges required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn auth() -> JwtAuth {
        JwtAuth::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            issuer: "acedesk".to_string(),
            token_ttl_minutes: 60,
        })
    }

    #[test]
    fn test_token_round_trip() {
        let auth = auth();
        let token = auth.issue_token("coordinator@example.com", UserRole::AceCoordinator).unwrap();
        let claims = auth.authenticate(Some(&format!("Bearer {}", token))).unwrap();
        assert_eq!(claims.sub, "coordinator@example.com");
        assert_eq!(claims.role, UserRole::AceCoordinator);
    }

    #[test]
    fn test_rejects_bad_headers() {
        let auth = auth();
        assert_matches!(auth.authenticate(None), Err(AceError::Authentication(_)));
        assert_matches!(auth.authenticate(Some("Basic abc")), Err(AceError::Authentication(_)));
        assert_matches!(auth.authenticate(Some("Bearer not-a-jwt")), Err(AceError::Authentication(_)));
    }

    #[test]
    fn test_rejects_foreign_secret() {
        let other = JwtAuth::new(&AuthConfig {
            jwt_secret: "another-secret".to_string(),
            issuer: "acedesk".to_string(),
            token_ttl_minutes: 60,
        });
        let token = other.issue_token("admin", UserRole::Admin).unwrap();
        assert!(auth().verify_token(&token).is_err());
    }
}

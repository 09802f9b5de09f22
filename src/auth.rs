use crate::config::AppConfig;
use crate::entities::user::UserRole;
use crate::errors::ServiceError;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub role: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Verifies bearer tokens issued by the external identity provider.
/// The service trusts the `(sub, role)` pair; it never stores credentials.
#[derive(Debug, Clone)]
pub struct AuthService {
    jwt_secret: String,
    jwt_expiration: usize,
    issuer: String,
    audience: String,
}

impl AuthService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            jwt_expiration: config.jwt_expiration,
            issuer: config.auth_issuer.clone(),
            audience: config.auth_audience.clone(),
        }
    }

    /// Issues a token for a known user. Kept for tests and local tooling;
    /// production tokens come from the identity provider sharing the secret.
    pub fn issue_token(
        &self,
        user_id: Uuid,
        name: &str,
        role: UserRole,
    ) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.jwt_expiration as i64);

        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            role: match role {
                UserRole::Admin => "ADMIN".to_string(),
                UserRole::Volunteer => "VOLUNTEER".to_string(),
            },
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("Failed to sign token: {}", e)))
    }

    /// Decodes and validates a bearer token, checking signature, expiry,
    /// issuer and audience.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.clone()]);
        validation.set_audience(&[self.audience.clone()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ServiceError::Unauthorized("Token expired".to_string())
            }
            _ => ServiceError::Unauthorized("Invalid token".to_string()),
        })?
        .claims;

        Ok(claims)
    }
}

/// Authenticated caller extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "Administrator role required".to_string(),
            ))
        }
    }

    pub fn require_volunteer(&self) -> Result<(), ServiceError> {
        if self.role == UserRole::Volunteer {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "Volunteer role required".to_string(),
            ))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_service = parts
            .extensions
            .get::<Arc<AuthService>>()
            .cloned()
            .ok_or_else(|| {
                ServiceError::InternalError("AuthService extension missing".to_string())
            })?;

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ServiceError::Unauthorized("Missing Authorization header".to_string())
            })?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ServiceError::Unauthorized("Expected bearer token".to_string()))?;

        let claims = auth_service.validate_token(token)?;

        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ServiceError::Unauthorized("Invalid subject claim".to_string()))?;
        let role = match claims.role.as_str() {
            "ADMIN" => UserRole::Admin,
            "VOLUNTEER" => UserRole::Volunteer,
            other => {
                return Err(ServiceError::Unauthorized(format!(
                    "Unknown role claim: {}",
                    other
                )))
            }
        };

        Ok(AuthUser {
            id,
            name: claims.name,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        let cfg = AppConfig::new(
            "sqlite::memory:".into(),
            "x".repeat(64),
            3600,
            "127.0.0.1".into(),
            8080,
            "test".into(),
        );
        AuthService::new(&cfg)
    }

    #[test]
    fn token_round_trip() {
        let svc = service();
        let id = Uuid::new_v4();
        let token = svc.issue_token(id, "Asha", UserRole::Volunteer).unwrap();
        let claims = svc.validate_token(&token).unwrap();

        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.role, "VOLUNTEER");
        assert_eq!(claims.name, "Asha");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = service();
        let token = svc
            .issue_token(Uuid::new_v4(), "Asha", UserRole::Admin)
            .unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(svc.validate_token(&tampered).is_err());
    }

    #[test]
    fn role_gates() {
        let admin = AuthUser {
            id: Uuid::new_v4(),
            name: "A".into(),
            role: UserRole::Admin,
        };
        assert!(admin.require_admin().is_ok());
        assert!(admin.require_volunteer().is_err());

        let vol = AuthUser {
            id: Uuid::new_v4(),
            name: "V".into(),
            role: UserRole::Volunteer,
        };
        assert!(vol.require_volunteer().is_ok());
        assert!(vol.require_admin().is_err());
    }
}

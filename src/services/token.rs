use actix_web::HttpRequest;
use anyhow::{Result, anyhow};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::database::models::UserRole;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub role: String,
    pub exp: usize,
}

/// The verified caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub role: UserRole,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration: Duration,
}

impl TokenService {
    pub fn new(secret: &str, expiration_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration: Duration::hours(expiration_hours),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.jwt_expiration_hours)
    }

    pub fn issue(&self, subject_id: &str, role: UserRole) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(self.expiration)
            .ok_or_else(|| anyhow!("Token expiration overflow"))?
            .timestamp() as usize;

        let claims = Claims {
            sub: subject_id.to_string(),
            role: role.to_string(),
            exp: expiration,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Fails closed: any decoding problem yields `None`.
    pub fn verify(&self, token: &str) -> Option<Principal> {
        let token_data =
            match decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256)) {
                Ok(data) => data,
                Err(e) => {
                    log::debug!("Rejected bearer token: {}", e);
                    return None;
                }
            };

        let role = match UserRole::normalize(&token_data.claims.role) {
            Some(role) => role,
            None => {
                log::debug!("Rejected bearer token with role {:?}", token_data.claims.role);
                return None;
            }
        };

        Some(Principal {
            id: token_data.claims.sub,
            role,
        })
    }

    /// Resolves the request's principal from its `Authorization` header.
    pub fn principal_from_request(&self, req: &HttpRequest) -> Option<Principal> {
        bearer_token(req).and_then(|token| self.verify(token))
    }
}

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_issue_then_verify() {
        let service = TokenService::new("secret", 1);
        let token = service.issue("user-1", UserRole::Admin).unwrap();

        assert_eq!(
            service.verify(&token),
            Some(Principal {
                id: "user-1".to_string(),
                role: UserRole::Admin,
            })
        );
    }

    #[test]
    fn test_wrong_secret_fails_closed() {
        let token = TokenService::new("secret", 1)
            .issue("user-1", UserRole::Employee)
            .unwrap();
        assert_eq!(TokenService::new("other", 1).verify(&token), None);
        assert_eq!(TokenService::new("secret", 1).verify("not-a-token"), None);
    }

    #[test]
    fn test_expired_token_fails_closed() {
        let service = TokenService::new("secret", -2);
        let token = service.issue("user-1", UserRole::Employee).unwrap();
        assert_eq!(service.verify(&token), None);
    }

    #[test]
    fn test_unknown_role_fails_closed() {
        let claims = Claims {
            sub: "user-1".to_string(),
            role: "SUPERUSER".to_string(),
            exp: (Utc::now().timestamp() + 3600) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert_eq!(TokenService::new("secret", 1).verify(&token), None);
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "bearer abc.def"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc.def"));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic abc"))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&req), None);
    }
}

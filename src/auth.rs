use actix_web::{http::header, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role claim Supabase puts on service keys
const SERVICE_ROLE: &str = "service_role";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Caller may not act on behalf of {0}")]
    Forbidden(String),
}

/// Claims read from a Supabase access token
///
/// Service keys carry a role but no subject.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: u64,
}

/// Identity of the caller, resolved from the bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Option<String>,
    pub is_service: bool,
}

/// Verifies HS256 access tokens signed with the project's JWT secret
///
/// Without a secret every request is let through, which is only meant for
/// local development.
#[derive(Clone)]
pub struct Authenticator {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl Authenticator {
    pub fn new(jwt_secret: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key: jwt_secret
                .filter(|s| !s.is_empty())
                .map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Decode and validate a raw token
    pub fn verify(&self, token: &str) -> Result<Caller, AuthError> {
        let Some(key) = &self.key else {
            return Err(AuthError::InvalidToken("authentication is not configured".into()));
        };

        let data = decode::<Claims>(token, key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let caller = Caller {
            is_service: data.claims.role.as_deref() == Some(SERVICE_ROLE),
            user_id: data.claims.sub.filter(|sub| !sub.is_empty()),
        };

        if !caller.is_service && caller.user_id.is_none() {
            return Err(AuthError::InvalidToken("token has no subject".into()));
        }

        Ok(caller)
    }

    /// Check that the request's caller may act on `subject_id`
    ///
    /// Returns `Ok(None)` when authentication is disabled.
    pub fn authorize(
        &self,
        req: &HttpRequest,
        subject_id: &str,
    ) -> Result<Option<Caller>, AuthError> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let caller = self.verify(token)?;

        if !caller.is_service && caller.user_id.as_deref() != Some(subject_id) {
            tracing::info!("Caller {:?} denied access to {}", caller.user_id, subject_id);
            return Err(AuthError::Forbidden(subject_id.to_string()));
        }

        Ok(Some(caller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "super-secret-jwt-token-for-tests";

    fn token(sub: &str, role: Option<&str>, secret: &str) -> String {
        let claims = Claims {
            sub: Some(sub.to_string()),
            role: role.map(str::to_string),
            exp: (chrono::Utc::now().timestamp() + 3600) as u64,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_disabled_allows_everything() {
        let auth = Authenticator::disabled();
        let req = TestRequest::default().to_http_request();
        assert!(auth.authorize(&req, "s1").unwrap().is_none());
    }

    #[test]
    fn test_matching_subject_is_allowed() {
        let auth = Authenticator::new(Some(SECRET));
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token("s1", Some("authenticated"), SECRET))))
            .to_http_request();

        let caller = auth.authorize(&req, "s1").unwrap().unwrap();
        assert_eq!(caller.user_id.as_deref(), Some("s1"));
        assert!(!caller.is_service);
    }

    #[test]
    fn test_other_subject_is_forbidden() {
        let auth = Authenticator::new(Some(SECRET));
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token("u9", None, SECRET))))
            .to_http_request();

        assert!(matches!(auth.authorize(&req, "s1"), Err(AuthError::Forbidden(_))));
    }

    #[test]
    fn test_service_role_bypasses_subject_check() {
        let auth = Authenticator::new(Some(SECRET));
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token("svc", Some("service_role"), SECRET))))
            .to_http_request();

        assert!(auth.authorize(&req, "s1").unwrap().unwrap().is_service);
    }

    fn subjectless_token(role: Option<&str>) -> String {
        let claims = serde_json::json!({
            "role": role,
            "exp": chrono::Utc::now().timestamp() + 3600,
        });
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    #[test]
    fn test_service_key_without_subject_is_accepted() {
        let auth = Authenticator::new(Some(SECRET));
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", subjectless_token(Some("service_role")))))
            .to_http_request();

        let caller = auth.authorize(&req, "s1").unwrap().unwrap();
        assert!(caller.is_service);
        assert!(caller.user_id.is_none());
    }

    #[test]
    fn test_user_token_without_subject_is_rejected() {
        let auth = Authenticator::new(Some(SECRET));
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", subjectless_token(Some("authenticated")))))
            .to_http_request();

        assert!(matches!(auth.authorize(&req, "s1"), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_missing_and_forged_tokens() {
        let auth = Authenticator::new(Some(SECRET));

        let req = TestRequest::default().to_http_request();
        assert!(matches!(auth.authorize(&req, "s1"), Err(AuthError::MissingToken)));

        let forged = token("s1", None, "some-other-secret");
        assert!(matches!(auth.verify(&forged), Err(AuthError::InvalidToken(_))));
    }
}

//! Admin gate for the `/admin/*` routes.
//!
//! Route handlers never see tokens. They sit behind [`require_admin`], which
//! delegates the yes/no decision to whatever [`TokenVerifier`] the state holds.

use std::fmt;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::AppState;

const MISSING_CREDENTIAL: &str = "missing credential";
const INVALID_CREDENTIAL: &str = "invalid or expired credential, please log in again";

/// Decides whether a presented bearer token grants admin access.
pub trait TokenVerifier: Send + Sync {
    fn validate(&self, token: &str) -> bool;
}

/// Accepts exactly one shared-secret value. No expiry, no rotation.
#[derive(Clone)]
pub struct StaticTokenVerifier {
    accepted: String,
}

impl StaticTokenVerifier {
    pub fn new(accepted: impl Into<String>) -> Self {
        Self {
            accepted: accepted.into(),
        }
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn validate(&self, token: &str) -> bool {
        !self.accepted.is_empty() && token == self.accepted
    }
}

/// The single trusted principal, loaded from configuration.
#[derive(Clone)]
pub struct AdminIdentity {
    pub username: String,
    pub password: String,
    /// Token handed out on a successful login.
    pub token: String,
}

impl AdminIdentity {
    pub fn matches(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

impl fmt::Debug for AdminIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminIdentity")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// `Bearer <token>` → `<token>`. Any other shape yields `None`.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized(MISSING_CREDENTIAL.to_string()))?;

    let allowed = auth_header
        .to_str()
        .ok()
        .and_then(bearer_token)
        .is_some_and(|token| state.verifier.validate(token));

    if !allowed {
        debug!(path = %request.uri().path(), "Rejected admin credential");
        return Err(AppError::Forbidden(INVALID_CREDENTIAL.to_string()));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc  "), Some("abc"));
        assert_eq!(bearer_token("abc"), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn static_verifier_accepts_only_its_value() {
        let verifier = StaticTokenVerifier::new("admin-token-123");
        assert!(verifier.validate("admin-token-123"));
        assert!(!verifier.validate("admin-token-124"));
        assert!(!verifier.validate(""));
    }

    #[test]
    fn empty_secret_accepts_nothing() {
        assert!(!StaticTokenVerifier::new("").validate(""));
    }

    #[test]
    fn identity_match_is_exact() {
        let admin = AdminIdentity {
            username: "admin".to_string(),
            password: "1234".to_string(),
            token: "t".to_string(),
        };
        assert!(admin.matches("admin", "1234"));
        assert!(!admin.matches("Admin", "1234"));
        assert!(!admin.matches("admin", "12345"));
    }

    #[test]
    fn debug_hides_secrets() {
        let admin = AdminIdentity {
            username: "admin".to_string(),
            password: "1234".to_string(),
            token: "admin-token-123".to_string(),
        };
        let shown = format!("{:?}", admin);
        assert!(shown.contains("admin"));
        assert!(!shown.contains("1234"));
        assert!(!shown.contains("admin-token-123"));
    }
}

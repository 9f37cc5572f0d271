use serde::{Deserialize, Serialize};

/// Both fields may be absent; an incomplete body is just a failed login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LoginResponse {
    pub fn granted(token: impl Into<String>) -> Self {
        Self {
            success: true,
            token: Some(token.into()),
            message: None,
        }
    }

    pub fn denied() -> Self {
        Self {
            success: false,
            token: None,
            message: Some("Invalid credentials".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_decode_as_none() {
        let req: LoginRequest = serde_json::from_str(r#"{"username":"admin"}"#).unwrap();
        assert_eq!(req.username.as_deref(), Some("admin"));
        assert!(req.password.is_none());
    }

    #[test]
    fn denied_response_has_no_token() {
        let body = serde_json::to_value(LoginResponse::denied()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "success": false, "message": "Invalid credentials" })
        );
    }
}

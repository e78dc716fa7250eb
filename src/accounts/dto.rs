use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Signup input assembled from the multipart form.
#[derive(Debug, Default)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub image: Option<UploadedImage>,
}

/// Profile image pulled out of the multipart request.
#[derive(Debug)]
pub struct UploadedImage {
    pub body: Bytes,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for reset initiation.
#[derive(Debug, Deserialize)]
pub struct ForgotRequest {
    pub email: String,
}

/// Response returned after signup or login.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// Acknowledgement for reset initiation. Placeholder: no token is issued
/// and no email is sent.
#[derive(Debug, Serialize)]
pub struct ResetAck {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_response_uses_camel_case_user_id() {
        let resp = AccountResponse {
            message: "User created".into(),
            user_id: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""userId":42"#));
        assert!(json.contains("User created"));
    }

    #[test]
    fn login_request_deserializes() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.c","password":"hunter22"}"#).unwrap();
        assert_eq!(req.email, "a@b.c");
        assert_eq!(req.password, "hunter22");
    }
}

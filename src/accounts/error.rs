use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

/// Failure taxonomy for the account service. Every variant maps to one
/// HTTP status with a generic body; internal detail stays in the logs.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("missing required field: {0}")]
    Validation(&'static str),
    #[error("malformed multipart body")]
    Malformed,
    #[error("username or email already taken")]
    Conflict,
    // Unknown email and wrong password share this variant on purpose:
    // the response must not reveal whether the account exists.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("no account with that email")]
    NotFound,
    #[error("storage failure")]
    Storage(anyhow::Error),
}

impl From<sqlx::Error> for AccountError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AccountError::Conflict;
            }
        }
        AccountError::Storage(e.into())
    }
}

impl AccountError {
    fn status(&self) -> StatusCode {
        match self {
            AccountError::Validation(_) => StatusCode::BAD_REQUEST,
            AccountError::Malformed => StatusCode::BAD_REQUEST,
            AccountError::Conflict => StatusCode::CONFLICT,
            AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccountError::NotFound => StatusCode::NOT_FOUND,
            AccountError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AccountError::Storage(_) => "Internal server error".into(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        match &self {
            AccountError::Storage(source) => {
                error!(error = %source, "account operation failed");
            }
            other => {
                warn!(error = %other, "account operation rejected");
            }
        }
        let status = self.status();
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_expected_statuses() {
        assert_eq!(
            AccountError::Validation("email").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AccountError::Malformed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AccountError::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            AccountError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AccountError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AccountError::Storage(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_detail_is_not_leaked() {
        let e = AccountError::Storage(anyhow::anyhow!("connection refused to 10.0.0.5"));
        assert_eq!(e.public_message(), "Internal server error");
    }

    #[test]
    fn non_database_sqlx_errors_become_storage() {
        let e: AccountError = sqlx::Error::RowNotFound.into();
        assert!(matches!(e, AccountError::Storage(_)));
    }

    #[test]
    fn credential_failures_share_one_message() {
        // A wrong password and an unknown email both produce this exact
        // variant, so the response body is identical in the two cases.
        assert_eq!(
            AccountError::InvalidCredentials.public_message(),
            "invalid credentials"
        );
    }
}

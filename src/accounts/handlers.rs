use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::accounts::dto::{
    AccountResponse, ForgotRequest, LoginRequest, NewAccount, ResetAck, UploadedImage,
};
use crate::accounts::error::AccountError;
use crate::accounts::services;
use crate::state::AppState;

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/forgot", post(forgot))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB, covers the image
}

/// POST /api/signup (multipart: username, email, password, optional
/// profile_image file).
#[instrument(skip(state, mp))]
pub async fn signup(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<AccountResponse>), AccountError> {
    let mut account = NewAccount::default();

    // A stream error (truncated body, missing closing boundary) must fail
    // the request, not pass as end-of-form.
    while let Some(field) = mp.next_field().await.map_err(multipart_err)? {
        match field.name().map(|s| s.to_string()).as_deref() {
            Some("username") => {
                account.username = field.text().await.map_err(multipart_err)?;
            }
            Some("email") => {
                account.email = field.text().await.map_err(multipart_err)?;
            }
            Some("password") => {
                account.password = field.text().await.map_err(multipart_err)?;
            }
            Some("profile_image") => {
                let filename = field.file_name().map(|s| s.to_string());
                let content_type = field.content_type().map(|s| s.to_string());
                let body = field.bytes().await.map_err(multipart_err)?;
                if !body.is_empty() {
                    account.image = Some(UploadedImage {
                        body,
                        filename,
                        content_type,
                    });
                }
            }
            other => {
                warn!(field = ?other, "ignoring unknown multipart field");
            }
        }
    }

    let user_id = services::register(&state, account).await?;
    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            message: "User created".into(),
            user_id,
        }),
    ))
}

/// POST /api/login (JSON: email, password).
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AccountResponse>, AccountError> {
    let user_id = services::authenticate(&state, &payload.email, &payload.password).await?;
    Ok(Json(AccountResponse {
        message: "Login successful".into(),
        user_id,
    }))
}

/// POST /api/forgot (JSON: email).
#[instrument(skip(state, payload))]
pub async fn forgot(
    State(state): State<AppState>,
    Json(payload): Json<ForgotRequest>,
) -> Result<Json<ResetAck>, AccountError> {
    let ack = services::initiate_reset(&state, &payload.email).await?;
    Ok(Json(ack))
}

fn multipart_err(e: axum::extract::multipart::MultipartError) -> AccountError {
    warn!(error = %e, "multipart read failed");
    AccountError::Malformed
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use super::account_routes;
    use crate::state::AppState;

    #[tokio::test]
    async fn signup_rejects_multipart_without_closing_boundary() {
        let app = account_routes().with_state(AppState::fake());

        // All three fields present but the terminating `--BOUND--` is
        // missing, as with a connection cut mid-upload.
        let body = concat!(
            "--BOUND\r\ncontent-disposition: form-data; name=\"username\"\r\n\r\nalice\r\n",
            "--BOUND\r\ncontent-disposition: form-data; name=\"email\"\r\n\r\na@b.c\r\n",
            "--BOUND\r\ncontent-disposition: form-data; name=\"password\"\r\n\r\nhunter22\r\n",
        );
        let req = Request::builder()
            .method("POST")
            .uri("/signup")
            .header(
                header::CONTENT_TYPE,
                "multipart/form-data; boundary=BOUND",
            )
            .body(Body::from(body))
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

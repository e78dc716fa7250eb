use anyhow::Context;
use tracing::{info, warn};

use crate::accounts::dto::{NewAccount, ResetAck};
use crate::accounts::error::AccountError;
use crate::accounts::password::{hash_password, verify_password};
use crate::accounts::repo_types::User;
use crate::state::AppState;
use crate::storage::object_key;

/// Create a user with a bcrypt-hashed password and an optional profile
/// image, returning the new id. Duplicate username/email surfaces as
/// `Conflict` straight from the unique indexes; there is no pre-check.
pub async fn register(st: &AppState, account: NewAccount) -> Result<i64, AccountError> {
    let NewAccount {
        username,
        email,
        password,
        image,
    } = account;

    if username.trim().is_empty() {
        return Err(AccountError::Validation("username"));
    }
    if email.trim().is_empty() {
        return Err(AccountError::Validation("email"));
    }
    if password.is_empty() {
        return Err(AccountError::Validation("password"));
    }

    // bcrypt is deliberately slow; keep it off the async workers.
    let cost = st.config.bcrypt_cost;
    let hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .context("hashing task panicked")
        .map_err(AccountError::Storage)?
        .map_err(AccountError::Storage)?;

    // Persist the image first; only its public path lands on the row.
    let image_path = match image {
        Some(img) => {
            let key = object_key(img.filename.as_deref(), img.content_type.as_deref());
            st.storage
                .put_object(&key, img.body)
                .await
                .map_err(AccountError::Storage)?;
            Some((key.clone(), st.storage.public_path(&key)))
        }
        None => None,
    };

    let created = User::create(
        &st.db,
        username.trim(),
        email.trim(),
        &hash,
        image_path.as_ref().map(|(_, p)| p.as_str()),
    )
    .await;

    match created {
        Ok(user) => {
            info!(user_id = user.id, username = %user.username, "user registered");
            Ok(user.id)
        }
        Err(e) => {
            // The row never landed; don't strand the uploaded file.
            if let Some((key, _)) = image_path {
                if let Err(del) = st.storage.delete_object(&key).await {
                    warn!(key = %key, error = %del, "orphaned upload cleanup failed");
                }
            }
            Err(e.into())
        }
    }
}

/// Confirm identity by email and password. Unknown email and wrong
/// password return the same error; the contract ends at the returned id,
/// no session or token is issued.
pub async fn authenticate(st: &AppState, email: &str, password: &str) -> Result<i64, AccountError> {
    let user = User::find_by_email(&st.db, email.trim())
        .await
        .map_err(|e| AccountError::Storage(e.into()))?;

    let Some(user) = user else {
        warn!("login for unknown email");
        return Err(AccountError::InvalidCredentials);
    };

    let password = password.to_string();
    let hash = user.password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .context("verify task panicked")
        .map_err(AccountError::Storage)?
        .map_err(AccountError::Storage)?;

    if !ok {
        warn!(user_id = user.id, "login with wrong password");
        return Err(AccountError::InvalidCredentials);
    }

    info!(user_id = user.id, "user authenticated");
    Ok(user.id)
}

/// Password-reset stub: confirms the account exists and acknowledges.
/// No token is issued and no email is sent.
pub async fn initiate_reset(st: &AppState, email: &str) -> Result<ResetAck, AccountError> {
    let user = User::find_by_email(&st.db, email.trim())
        .await
        .map_err(|e| AccountError::Storage(e.into()))?;

    match user {
        Some(user) => {
            info!(user_id = user.id, "password reset initiated");
            Ok(ResetAck {
                message: "Password reset initiated".into(),
            })
        }
        None => Err(AccountError::NotFound),
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database. Created once at signup; this service has
/// no update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash, never exposed in JSON
    pub profile_image: Option<String>,
    pub created_at: OffsetDateTime,
}

use sqlx::PgPool;

use crate::accounts::repo_types::User;

impl User {
    /// Find a user by exact email match.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, profile_image, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. No pre-check for duplicates: the unique indexes on
    /// username and email settle races, and a violation surfaces as
    /// `sqlx::Error::Database` with the unique-violation flag set.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
        profile_image: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, profile_image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, profile_image, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(profile_image)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}

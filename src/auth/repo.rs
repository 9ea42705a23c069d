use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

pub const DEFAULT_AVATAR: &str = "default.jpg";

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Avatar reference: `default.jpg` or an object-storage key.
    pub image_file: String,
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, image_file, created_at";

/// Map unique-constraint violations onto the user-facing duplicate errors;
/// everything else stays a database error.
fn map_unique(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return match db.constraint() {
                Some("users_username_key") => AppError::Conflict("Username already taken".into()),
                Some("users_email_key") => AppError::Conflict("Email already registered".into()),
                _ => AppError::Conflict("Already exists".into()),
            };
        }
    }
    AppError::Database(err)
}

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_username(db: &PgPool, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. Duplicate username/email surfaces as a conflict
    /// even when two registrations race past the handler pre-checks.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
        .map_err(map_unique)
    }

    pub async fn update_password(db: &PgPool, id: Uuid, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Update profile fields; `image_file` stays untouched when no new
    /// avatar was uploaded.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        username: &str,
        email: &str,
        image_file: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE users
             SET username = $2, email = $3, image_file = COALESCE($4, image_file)
             WHERE id = $1",
        )
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(image_file)
        .execute(db)
        .await
        .map_err(map_unique)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeDbError(&'static str);

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "duplicate key value violates unique constraint")
        }
    }

    impl std::error::Error for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }
        fn constraint(&self) -> Option<&str> {
            Some(self.0)
        }
        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }
        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }
        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    fn unique_violation(constraint: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError(constraint)))
    }

    #[test]
    fn duplicate_email_maps_to_a_user_facing_conflict() {
        let err = map_unique(unique_violation("users_email_key"));
        assert!(matches!(err, AppError::Conflict(msg) if msg == "Email already registered"));
    }

    #[test]
    fn duplicate_username_maps_to_a_user_facing_conflict() {
        let err = map_unique(unique_violation("users_username_key"));
        assert!(matches!(err, AppError::Conflict(msg) if msg == "Username already taken"));
    }

    #[test]
    fn other_database_errors_pass_through() {
        assert!(matches!(
            map_unique(sqlx::Error::RowNotFound),
            AppError::Database(_)
        ));
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "casey".into(),
            email: "casey@example.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            image_file: DEFAULT_AVATAR.into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("casey@example.com"));
    }
}

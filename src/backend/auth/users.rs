/**
 * User Model and Database Operations
 *
 * This module handles user data and database operations. Emails are stored
 * lowercased and are unique; passwords only ever as bcrypt hashes.
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// User struct representing a row of the `users` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    pub full_name: String,
    /// Lowercased email address
    pub email: String,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    /// Profile picture URL, empty when unset
    pub profile_pic: String,
    /// Palette color used for the default avatar
    pub avatar_color: String,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    pub updated_at: DateTime<Utc>,
}

/// User as returned to clients (no password hash)
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub profile_pic: String,
    pub avatar_color: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            profile_pic: user.profile_pic,
            avatar_color: user.avatar_color,
            created_at: user.created_at,
        }
    }
}

/// Fields needed to create a user
#[derive(Debug)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar_color: String,
}

const USER_COLUMNS: &str =
    "id, full_name, email, password_hash, profile_pic, avatar_color, created_at, updated_at";

/// Create a new user
pub async fn create_user(pool: &PgPool, new_user: NewUser) -> Result<User, sqlx::Error> {
    let now = Utc::now();

    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, full_name, email, password_hash, profile_pic, avatar_color, created_at, updated_at)
        VALUES ($1, $2, $3, $4, '', $5, $6, $6)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&new_user.full_name)
    .bind(new_user.email.to_lowercase())
    .bind(&new_user.password_hash)
    .bind(&new_user.avatar_color)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// Get user by email (case-insensitive)
pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email.to_lowercase())
        .fetch_optional(pool)
        .await
}

/// Get user by ID
pub async fn get_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Update the display name and/or profile picture
///
/// `None` leaves the field unchanged. Returns `None` if the user is gone.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    full_name: Option<&str>,
    profile_pic: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET full_name = COALESCE($2, full_name),
            profile_pic = COALESCE($3, profile_pic),
            updated_at = $4
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(full_name)
    .bind(profile_pic)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await
}

/// Every user except `id`, ordered by name (sidebar)
pub async fn list_users_except(pool: &PgPool, id: Uuid) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id <> $1 ORDER BY full_name ASC"
    ))
    .bind(id)
    .fetch_all(pool)
    .await
}

/// Whether the error is a unique constraint violation (duplicate email)
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

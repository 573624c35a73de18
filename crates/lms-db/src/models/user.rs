//! User database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for users table (without credentials)
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub library_id: i64,
    pub user_code: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub status: String,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User row joined with its password reset expiry
#[derive(Debug, Clone, FromRow)]
pub struct UserWithResetModel {
    #[sqlx(flatten)]
    pub user: UserModel,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
}

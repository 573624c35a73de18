//! PostgreSQL implementation of MemberRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use lms_core::entities::{format_user_code, Member, NewMember};
use lms_core::error::DomainError;
use lms_core::traits::{MemberQuery, MemberRepository, RepoResult};
use lms_core::value_objects::{LibraryId, Page, UserId, UserRole};

use crate::mappers::map_all;
use crate::models::{UserModel, UserWithResetModel};

use super::error::{map_db_error, map_unique_violation, user_not_found};
use super::search::like_pattern;

const USER_COLUMNS: &str = "id, library_id, user_code, username, email, full_name, phone, \
     role, status, profile_image, created_at, updated_at";

/// PostgreSQL implementation of MemberRepository
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, condition: &str, value: &str) -> RepoResult<Option<Member>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {condition}");
        let result = sqlx::query_as::<_, UserModel>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Member::try_from).transpose()
    }

    async fn execute_for(&self, id: UserId, sql: &str, binds: &[&str]) -> RepoResult<()> {
        let mut query = sqlx::query(sql).bind(id.into_inner());
        for value in binds {
            query = query.bind(*value);
        }
        let result = query.execute(&self.pool).await.map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }
        Ok(())
    }
}

/// Map a unique violation on the users table to the field that collided
fn user_conflict(e: sqlx::Error) -> DomainError {
    let constraint = e
        .as_database_error()
        .and_then(|db| db.constraint())
        .unwrap_or_default()
        .to_string();
    map_unique_violation(e, || {
        if constraint.contains("username") {
            DomainError::UsernameAlreadyExists
        } else if constraint.contains("email") {
            DomainError::EmailAlreadyExists
        } else {
            DomainError::ValidationError("User code already taken".to_string())
        }
    })
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, library_id: LibraryId, id: UserId) -> RepoResult<Option<Member>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND library_id = $2");
        let result = sqlx::query_as::<_, UserModel>(&sql)
            .bind(id.into_inner())
            .bind(library_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Member::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Member>> {
        self.find_one("LOWER(email) = LOWER($1)", email).await
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))
            ",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)
            ",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn next_user_code(&self, library_id: LibraryId, role: UserRole) -> RepoResult<String> {
        let last = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COALESCE(MAX(CAST(SUBSTRING(user_code FROM '[0-9]+$') AS BIGINT)), 0)
            FROM users
            WHERE library_id = $1 AND role = $2
            ",
        )
        .bind(library_id.into_inner())
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(format_user_code(role, last + 1))
    }

    #[instrument(skip(self, member, password_hash), fields(username = %member.username))]
    async fn create(
        &self,
        member: &NewMember,
        user_code: &str,
        password_hash: &str,
    ) -> RepoResult<Member> {
        let sql = format!(
            "INSERT INTO users (library_id, user_code, username, email, full_name, phone, role, \
                                status, password_hash, email_verification_token) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8, $9) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserModel>(&sql)
            .bind(member.library_id.into_inner())
            .bind(user_code)
            .bind(&member.username)
            .bind(&member.email)
            .bind(&member.full_name)
            .bind(&member.phone)
            .bind(member.role.as_str())
            .bind(password_hash)
            .bind(&member.email_verification_token)
            .fetch_one(&self.pool)
            .await
            .map_err(user_conflict)?;

        row.try_into()
    }

    #[instrument(skip(self, member), fields(user_id = %member.id))]
    async fn update(&self, member: &Member) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET username = $3, email = $4, full_name = $5, phone = $6, role = $7, status = $8,
                profile_image = $9, updated_at = NOW()
            WHERE id = $1 AND library_id = $2
            ",
        )
        .bind(member.id.into_inner())
        .bind(member.library_id.into_inner())
        .bind(&member.username)
        .bind(&member.email)
        .bind(&member.full_name)
        .bind(&member.phone)
        .bind(member.role.as_str())
        .bind(member.status.as_str())
        .bind(&member.profile_image)
        .execute(&self.pool)
        .await
        .map_err(user_conflict)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(member.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, library_id: LibraryId, query: &MemberQuery) -> RepoResult<Page<Member>> {
        let pattern = like_pattern(query.search.as_deref());
        let role = query.role.map(|r| r.as_str());
        let status = query.status.map(|s| s.as_str());

        let filter = r"
            WHERE library_id = $1
              AND ($2::TEXT IS NULL OR full_name ILIKE $2 OR email ILIKE $2 OR user_code ILIKE $2)
              AND ($3::TEXT IS NULL OR role = $3)
              AND ($4::TEXT IS NULL OR status = $4)
        ";

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM users {filter}"))
            .bind(library_id.into_inner())
            .bind(&pattern)
            .bind(role)
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users {filter} ORDER BY full_name, id LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, UserModel>(&sql)
            .bind(library_id.into_inner())
            .bind(&pattern)
            .bind(role)
            .bind(status)
            .bind(query.page.limit())
            .bind(query.page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Page::new(map_all(rows)?, total, query.page))
    }

    #[instrument(skip(self))]
    async fn search_active(
        &self,
        library_id: LibraryId,
        term: &str,
        limit: i64,
    ) -> RepoResult<Vec<Member>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE library_id = $1 AND status = 'active' AND role = 'member' \
               AND ($2::TEXT IS NULL OR full_name ILIKE $2 OR email ILIKE $2 \
                    OR user_code ILIKE $2) \
             ORDER BY full_name, id \
             LIMIT $3"
        );
        let rows = sqlx::query_as::<_, UserModel>(&sql)
            .bind(library_id.into_inner())
            .bind(like_pattern(Some(term)))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        map_all(rows)
    }

    #[instrument(skip(self))]
    async fn count_active_borrowings(&self, id: UserId) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM borrowings WHERE member_id = $1 AND status = 'active'
            ",
        )
        .bind(id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            r"
            SELECT password_hash FROM users WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, token))]
    async fn set_verification_token(&self, id: UserId, token: &str) -> RepoResult<()> {
        self.execute_for(
            id,
            "UPDATE users SET email_verification_token = $2, updated_at = NOW() WHERE id = $1",
            &[token],
        )
        .await
    }

    #[instrument(skip(self, token))]
    async fn set_reset_token(
        &self,
        id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET password_reset_token = $2, reset_token_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn find_by_verification_token(&self, token: &str) -> RepoResult<Option<Member>> {
        self.find_one("email_verification_token = $1", token).await
    }

    #[instrument(skip(self, token))]
    async fn find_by_reset_token(
        &self,
        token: &str,
    ) -> RepoResult<Option<(Member, DateTime<Utc>)>> {
        let sql = format!(
            "SELECT {USER_COLUMNS}, reset_token_expires_at FROM users \
             WHERE password_reset_token = $1"
        );
        let result = sqlx::query_as::<_, UserWithResetModel>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        match result {
            Some(UserWithResetModel {
                user,
                reset_token_expires_at: Some(expires_at),
            }) => Ok(Some((user.try_into()?, expires_at))),
            _ => Ok(None),
        }
    }

    #[instrument(skip(self, password_hash))]
    async fn activate(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        self.execute_for(
            id,
            "UPDATE users \
             SET password_hash = $2, status = 'active', email_verification_token = NULL, \
                 updated_at = NOW() \
             WHERE id = $1",
            &[password_hash],
        )
        .await
    }

    #[instrument(skip(self, password_hash))]
    async fn reset_password(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        self.execute_for(
            id,
            "UPDATE users \
             SET password_hash = $2, password_reset_token = NULL, reset_token_expires_at = NULL, \
                 updated_at = NOW() \
             WHERE id = $1",
            &[password_hash],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn deactivate(&self, library_id: LibraryId, id: UserId) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users SET status = 'inactive', updated_at = NOW()
            WHERE id = $1 AND library_id = $2
            ",
        )
        .bind(id.into_inner())
        .bind(library_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }
        Ok(())
    }
}

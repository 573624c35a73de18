//! Test fixtures and data generators
//!
//! Every test runs in its own freshly inserted library, so tests never see
//! each other's books or members.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use lms_core::{generate_account_token, LibraryId, MemberRepository, NewMember, UserId, UserRole};
use lms_db::PgMemberRepository;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::helpers::{assert_json, TestServer};

/// Password every seeded account ends up with
pub const TEST_PASSWORD: &str = "shelves2024";

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> String {
    format!(
        "{}{}",
        chrono::Utc::now().timestamp_micros(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

/// Login request
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signed-in account as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    pub id: i64,
    pub user_code: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub status: String,
}

/// Login response
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: AccountResponse,
}

/// A logged-in account
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub email: String,
    pub token: String,
}

/// A fresh library with a logged-in librarian
#[derive(Debug, Clone)]
pub struct LibraryFixture {
    pub library_id: LibraryId,
    pub librarian: Session,
}

impl LibraryFixture {
    /// Insert a library and its first librarian, then set the librarian's
    /// password through the setup endpoint and log in.
    pub async fn create(server: &TestServer) -> Result<Self> {
        let suffix = unique_suffix();
        let id: i64 = sqlx::query_scalar("INSERT INTO libraries (name) VALUES ($1) RETURNING id")
            .bind(format!("Integration Library {suffix}"))
            .fetch_one(&server.pool)
            .await?;
        let library_id = LibraryId::new(id);

        let repo = PgMemberRepository::new(server.pool.clone());
        let code = repo.next_user_code(library_id, UserRole::Librarian).await?;
        let token = generate_account_token();
        let email = format!("librarian{suffix}@example.com");
        let librarian = repo
            .create(
                &NewMember {
                    library_id,
                    username: format!("librarian{suffix}"),
                    email: email.clone(),
                    full_name: format!("Librarian {suffix}"),
                    phone: None,
                    role: UserRole::Librarian,
                    email_verification_token: token.clone(),
                },
                &code,
                "!",
            )
            .await?;

        complete_setup(server, &token).await?;
        let session = login(server, &email).await?;
        anyhow::ensure!(session.user_id == librarian.id.into_inner());

        Ok(Self {
            library_id,
            librarian: session,
        })
    }

    /// Create a member through the API, finish setup and log them in
    pub async fn member(&self, server: &TestServer) -> Result<Session> {
        let suffix = unique_suffix();
        let email = format!("member{suffix}@example.com");
        let response = server
            .post_auth(
                "/members",
                &self.librarian.token,
                &json!({
                    "username": format!("member{suffix}"),
                    "email": email,
                    "full_name": format!("Member {suffix}"),
                }),
            )
            .await?;
        let member: AccountResponse = assert_json(response, StatusCode::CREATED).await?;

        let token = setup_token(server, UserId::new(member.id)).await?;
        complete_setup(server, &token).await?;
        login(server, &email).await
    }

    /// Add a title with the given number of copies, returning its id
    pub async fn book(&self, server: &TestServer, copies: i32) -> Result<i64> {
        let suffix = unique_suffix();
        let response = server
            .post_auth(
                "/books",
                &self.librarian.token,
                &json!({
                    "book_code": format!("BK-{suffix}"),
                    "title": format!("Field Guide {suffix}"),
                    "author_name": "R. Author",
                    "isbn": "9780000000001",
                    "total_copies": copies,
                }),
            )
            .await?;
        let book: serde_json::Value = assert_json(response, StatusCode::CREATED).await?;
        book["id"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("book response without id: {book}"))
    }
}

/// The setup token the service stored (and mailed) for an account
pub async fn setup_token(server: &TestServer, user_id: UserId) -> Result<String> {
    let token: Option<String> =
        sqlx::query_scalar("SELECT email_verification_token FROM users WHERE id = $1")
            .bind(user_id.into_inner())
            .fetch_one(&server.pool)
            .await?;
    token.ok_or_else(|| anyhow::anyhow!("no setup token for user {user_id}"))
}

pub async fn complete_setup(server: &TestServer, token: &str) -> Result<()> {
    let response = server
        .post(
            "/auth/setup",
            &json!({ "token": token, "password": TEST_PASSWORD }),
        )
        .await?;
    let _: serde_json::Value = assert_json(response, StatusCode::OK).await?;
    Ok(())
}

pub async fn login(server: &TestServer, email: &str) -> Result<Session> {
    let response = server
        .post(
            "/auth/login",
            &LoginRequest {
                email: email.to_string(),
                password: TEST_PASSWORD.to_string(),
            },
        )
        .await?;
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await?;
    Ok(Session {
        user_id: auth.user.id,
        email: auth.user.email,
        token: auth.access_token,
    })
}

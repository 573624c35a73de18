//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL, JWT_SECRET
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, assert_status, check_test_env, LibraryFixture, TestServer,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn setup() -> Option<(TestServer, LibraryFixture)> {
    if !check_test_env().await {
        return None;
    }
    let server = TestServer::start().await.expect("Failed to start server");
    let library = LibraryFixture::create(&server)
        .await
        .expect("Failed to seed library");
    Some((server, library))
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get_raw("/health").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get_raw("/health/ready").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["checks"]["database"], "healthy");
    assert_eq!(body["checks"]["redis"], "healthy");
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_request_without_token_is_unauthorized() {
    let Some((server, _library)) = setup().await else {
        return;
    };

    let response = server.get("/books").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MISSING_AUTHORIZATION");

    let response = server.get_auth("/books", "not-a-jwt").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "INVALID_TOKEN");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let Some((server, library)) = setup().await else {
        return;
    };

    let response = server
        .post(
            "/auth/login",
            &json!({ "email": library.librarian.email, "password": "wrong-password-9" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .post(
            "/auth/login",
            &json!({ "email": "nobody@example.com", "password": "wrong-password-9" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_password_reset_request_is_silent() {
    let Some((server, library)) = setup().await else {
        return;
    };

    for email in [library.librarian.email.as_str(), "ghost@example.com"] {
        let response = server
            .post("/auth/password-reset", &json!({ "email": email }))
            .await
            .unwrap();
        assert_status(response, StatusCode::OK).await.unwrap();
    }
}

#[tokio::test]
async fn test_setup_token_is_single_use() {
    let Some((server, library)) = setup().await else {
        return;
    };

    let response = server
        .post_auth(
            "/members",
            &library.librarian.token,
            &json!({
                "username": format!("once{}", integration_tests::unique_suffix()),
                "email": format!("once{}@example.com", integration_tests::unique_suffix()),
                "full_name": "Once Only",
            }),
        )
        .await
        .unwrap();
    let member: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(member["status"], "pending");

    let token = integration_tests::setup_token(
        &server,
        lms_core::UserId::new(member["id"].as_i64().unwrap()),
    )
    .await
    .unwrap();
    integration_tests::complete_setup(&server, &token).await.unwrap();

    let response = server
        .post("/auth/setup", &json!({ "token": token, "password": "another1pass" }))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[tokio::test]
async fn test_book_lifecycle() {
    let Some((server, library)) = setup().await else {
        return;
    };
    let token = &library.librarian.token;

    let response = server
        .post_auth("/categories", token, &json!({ "name": "Field Guides" }))
        .await
        .unwrap();
    let category: Value = assert_json(response, StatusCode::CREATED).await.unwrap();

    let book_id = library.book(&server, 2).await.unwrap();

    let response = server
        .patch_auth(
            &format!("/books/{book_id}"),
            token,
            &json!({ "total_copies": 4, "category_id": category["id"] }),
        )
        .await
        .unwrap();
    let book: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(book["total_copies"], 4);
    assert_eq!(book["available_copies"], 4);
    assert_eq!(book["category_id"], category["id"]);

    let response = server.get_auth("/books?per_page=5", token).await.unwrap();
    let page: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page["data"].as_array().unwrap().len(), 1);

    let response = server
        .delete_auth(&format!("/books/{book_id}"), token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .get_auth(&format!("/books/{book_id}"), token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_invalid_book_id_path() {
    let Some((server, library)) = setup().await else {
        return;
    };

    let response = server
        .get_auth("/books/not-a-number", &library.librarian.token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_PATH_PARAMETER");
}

#[tokio::test]
async fn test_member_cannot_manage_catalog() {
    let Some((server, library)) = setup().await else {
        return;
    };
    let member = library.member(&server).await.unwrap();

    let response = server
        .post_auth("/categories", &member.token, &json!({ "name": "Forbidden" }))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Circulation Tests
// ============================================================================

#[tokio::test]
async fn test_borrow_renew_return() {
    let Some((server, library)) = setup().await else {
        return;
    };
    let token = &library.librarian.token;
    let member = library.member(&server).await.unwrap();
    let book_id = library.book(&server, 1).await.unwrap();

    let response = server
        .post_auth(
            "/borrowings",
            token,
            &json!({ "member_id": member.user_id, "book_id": book_id }),
        )
        .await
        .unwrap();
    let loan: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(loan["from_reservation"], false);
    let loan_id = loan["id"].as_i64().unwrap();

    // The only copy is out
    let response = server
        .post_auth(
            "/borrowings",
            token,
            &json!({ "member_id": member.user_id, "book_id": book_id }),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "NO_AVAILABLE_COPIES");

    let due: chrono::NaiveDate = loan["due_date"].as_str().unwrap().parse().unwrap();
    let response = server
        .post_auth(
            &format!("/borrowings/{loan_id}/renew"),
            &member.token,
            &json!({ "new_due_date": due + chrono::Duration::days(7) }),
        )
        .await
        .unwrap();
    let renewed: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(renewed["renewal_count"], 1);

    let response = server
        .post_empty_auth(&format!("/borrowings/{loan_id}/return"), token)
        .await
        .unwrap();
    let returned: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(returned["status"], "returned");

    let response = server
        .get_auth(&format!("/books/{book_id}"), token)
        .await
        .unwrap();
    let book: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(book["available_copies"], 1);
}

#[tokio::test]
async fn test_reservation_flow() {
    let Some((server, library)) = setup().await else {
        return;
    };
    let token = &library.librarian.token;
    let member = library.member(&server).await.unwrap();
    let book_id = library.book(&server, 1).await.unwrap();

    let response = server
        .post_auth("/reservations", &member.token, &json!({ "book_id": book_id }))
        .await
        .unwrap();
    let reservation: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(reservation["status"], "pending");
    let reservation_id = reservation["id"].as_i64().unwrap();

    let response = server
        .post_auth("/reservations", &member.token, &json!({ "book_id": book_id }))
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();

    // Approval without a body
    let response = server
        .post_empty_auth(&format!("/reservations/{reservation_id}/approve"), token)
        .await
        .unwrap();
    let approved: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(approved["status"], "approved");

    let response = server
        .post_auth(
            "/borrowings",
            token,
            &json!({ "member_id": member.user_id, "book_id": book_id }),
        )
        .await
        .unwrap();
    let loan: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(loan["from_reservation"], true);
    assert_eq!(loan["reservation_id"], reservation_id);
}

// ============================================================================
// Attendance and Messaging Tests
// ============================================================================

#[tokio::test]
async fn test_attendance_toggle() {
    let Some((server, library)) = setup().await else {
        return;
    };
    let token = &library.librarian.token;
    let member = library.member(&server).await.unwrap();
    let id = member.user_id;

    let response = server
        .post_empty_auth(&format!("/attendance/{id}/check-in"), token)
        .await
        .unwrap();
    let record: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(record["state"], "checked_in");

    let response = server
        .post_empty_auth(&format!("/attendance/{id}/check-in"), token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "ALREADY_CHECKED_IN");

    let response = server
        .post_empty_auth(&format!("/attendance/{id}/check-out"), token)
        .await
        .unwrap();
    let record: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(record["state"], "checked_out");

    let response = server.get_auth("/attendance", token).await.unwrap();
    let sheet: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(sheet["present"], 1);
}

#[tokio::test]
async fn test_direct_messages() {
    let Some((server, library)) = setup().await else {
        return;
    };
    let member = library.member(&server).await.unwrap();

    let response = server
        .post_auth(
            "/messages",
            &library.librarian.token,
            &json!({ "recipient_id": member.user_id, "message": "Your hold is ready" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .get_auth("/messages/unread-count", &member.token)
        .await
        .unwrap();
    let unread: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(unread["unread"], 1);

    let response = server
        .get_auth(
            &format!("/messages/conversations/{}", library.librarian.user_id),
            &member.token,
        )
        .await
        .unwrap();
    let thread: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(thread.as_array().unwrap().len(), 1);

    let response = server
        .get_auth("/messages/unread-count", &member.token)
        .await
        .unwrap();
    let unread: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(unread["unread"], 0);
}

//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{
    activity, attendance, auth, books, borrowings, categories, health, members, messages,
    reservations,
};
use crate::state::AppState;

/// Create the main API router (health probes are mounted separately)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(catalog_routes())
        .merge(member_routes())
        .merge(circulation_routes())
        .merge(attendance_routes())
        .merge(message_routes())
        .route("/activity", get(activity::recent_activity))
}

/// Login, account setup and password reset
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/setup", post(auth::complete_setup))
        .route("/auth/password-reset", post(auth::request_password_reset))
        .route(
            "/auth/password-reset/confirm",
            post(auth::confirm_password_reset),
        )
}

/// Books and categories
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(books::list_books).post(books::create_book))
        // Static segment wins over the :book_id capture
        .route("/books/search", get(books::search_books))
        .route(
            "/books/:book_id",
            get(books::get_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
}

fn member_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/members",
            get(members::list_members).post(members::create_member),
        )
        .route("/members/search", get(members::search_members))
        .route(
            "/members/:member_id",
            get(members::get_member)
                .patch(members::update_member)
                .delete(members::delete_member),
        )
        .route(
            "/members/:member_id/resend-setup",
            post(members::resend_setup),
        )
}

/// Borrowings and reservations
fn circulation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/borrowings",
            get(borrowings::list_borrowings).post(borrowings::borrow_book),
        )
        .route("/borrowings/:borrowing_id", get(borrowings::get_borrowing))
        .route(
            "/borrowings/:borrowing_id/renew",
            post(borrowings::renew_borrowing),
        )
        .route(
            "/borrowings/:borrowing_id/return",
            post(borrowings::return_borrowing),
        )
        .route(
            "/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route("/reservations/expire", post(reservations::expire_reservations))
        .route(
            "/reservations/:reservation_id",
            get(reservations::get_reservation),
        )
        .route(
            "/reservations/:reservation_id/approve",
            post(reservations::approve_reservation),
        )
        .route(
            "/reservations/:reservation_id/reject",
            post(reservations::reject_reservation),
        )
        .route(
            "/reservations/:reservation_id/fulfill",
            post(reservations::fulfill_reservation),
        )
        .route(
            "/reservations/:reservation_id/cancel",
            post(reservations::cancel_reservation),
        )
}

fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/attendance", get(attendance::daily_attendance))
        .route(
            "/attendance/:member_id/check-in",
            post(attendance::check_in),
        )
        .route(
            "/attendance/:member_id/check-out",
            post(attendance::check_out),
        )
        .route(
            "/attendance/:member_id/reset",
            post(attendance::reset_attendance),
        )
        .route(
            "/attendance/:member_id/history",
            get(attendance::attendance_history),
        )
}

fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(messages::send_message))
        .route("/messages/conversations", get(messages::list_conversations))
        .route(
            "/messages/conversations/:user_id",
            get(messages::get_conversation),
        )
        .route("/messages/unread-count", get(messages::unread_count))
}

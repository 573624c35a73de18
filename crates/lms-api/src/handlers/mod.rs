//! HTTP request handlers
//!
//! Thin adapters from routes to the lms-service layer.

pub mod activity;
pub mod attendance;
pub mod auth;
pub mod books;
pub mod borrowings;
pub mod categories;
pub mod health;
pub mod members;
pub mod messages;
pub mod reservations;

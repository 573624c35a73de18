//! Reservation database model

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database model for reservations table
#[derive(Debug, Clone, FromRow)]
pub struct ReservationModel {
    pub id: i64,
    pub library_id: i64,
    pub member_id: i64,
    pub book_id: i64,
    pub reservation_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: String,
    pub librarian_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub processed_by: Option<i64>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

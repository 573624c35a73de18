//! Attendance database model

use chrono::{NaiveDate, NaiveTime};
use sqlx::FromRow;

/// Database model for attendance table
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceModel {
    pub id: i64,
    pub library_id: i64,
    pub user_id: i64,
    pub attendance_date: NaiveDate,
    pub arrival_time: Option<NaiveTime>,
    pub departure_time: Option<NaiveTime>,
}

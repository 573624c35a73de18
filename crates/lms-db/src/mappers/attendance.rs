//! Attendance model -> entity mapper

use lms_core::{AttendanceId, AttendanceRecord, LibraryId, UserId};

use crate::models::AttendanceModel;

impl From<AttendanceModel> for AttendanceRecord {
    fn from(model: AttendanceModel) -> Self {
        AttendanceRecord {
            id: AttendanceId::new(model.id),
            library_id: LibraryId::new(model.library_id),
            user_id: UserId::new(model.user_id),
            attendance_date: model.attendance_date,
            arrival_time: model.arrival_time,
            departure_time: model.departure_time,
        }
    }
}

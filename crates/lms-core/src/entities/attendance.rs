//! Attendance records and the per-day check-in / check-out toggle

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::error::DomainError;
use crate::value_objects::{AttendanceId, LibraryId, UserId};

/// One row per member per day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub library_id: LibraryId,
    pub user_id: UserId,
    pub attendance_date: NaiveDate,
    pub arrival_time: Option<NaiveTime>,
    pub departure_time: Option<NaiveTime>,
}

impl AttendanceRecord {
    pub fn state(&self) -> AttendanceState {
        AttendanceState::from_times(self.arrival_time, self.departure_time)
    }
}

/// Normalized attendance state for a member on one day.
///
/// Old rows were written with both times null to mean "present". That shape
/// is mapped to [`AttendanceState::Present`] here and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AttendanceState {
    Absent,
    /// Legacy row: present, time unspecified
    Present,
    CheckedIn {
        arrival: NaiveTime,
    },
    CheckedOut {
        arrival: NaiveTime,
        departure: NaiveTime,
    },
    /// Departure recorded without an arrival
    DepartureOnly {
        departure: NaiveTime,
    },
}

/// What a successful check-in writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInAction {
    /// No row for the day yet
    Insert,
    /// Row exists without an arrival time
    SetArrival,
}

impl AttendanceState {
    /// Interpret a stored row (or its absence)
    pub fn from_record(record: Option<&AttendanceRecord>) -> Self {
        record.map_or(Self::Absent, AttendanceRecord::state)
    }

    pub fn from_times(arrival: Option<NaiveTime>, departure: Option<NaiveTime>) -> Self {
        match (arrival, departure) {
            (None, None) => Self::Present,
            (Some(arrival), None) => Self::CheckedIn { arrival },
            (Some(arrival), Some(departure)) => Self::CheckedOut { arrival, departure },
            (None, Some(departure)) => Self::DepartureOnly { departure },
        }
    }

    /// Counts as present for display and reports
    pub fn is_present(self) -> bool {
        !matches!(self, Self::Absent)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Present => "present",
            Self::CheckedIn { .. } => "checked_in",
            Self::CheckedOut { .. } => "checked_out",
            Self::DepartureOnly { .. } => "departure_only",
        }
    }

    pub fn check_in(self) -> Result<CheckInAction, DomainError> {
        match self {
            Self::Absent => Ok(CheckInAction::Insert),
            Self::DepartureOnly { .. } => Ok(CheckInAction::SetArrival),
            Self::Present | Self::CheckedIn { .. } | Self::CheckedOut { .. } => {
                Err(DomainError::AlreadyCheckedIn)
            }
        }
    }

    pub fn check_out(self) -> Result<(), DomainError> {
        match self {
            Self::CheckedIn { .. } => Ok(()),
            Self::Absent | Self::Present => Err(DomainError::NotCheckedIn),
            Self::CheckedOut { .. } | Self::DepartureOnly { .. } => {
                Err(DomainError::AlreadyCheckedOut)
            }
        }
    }
}

/// Human-readable local time for notifications, e.g. `09:00 AM`
pub fn format_clock_time(time: NaiveTime) -> String {
    time.format("%I:%M %p").to_string()
}

//! Domain entities - core business objects and their lifecycle rules

/// Implements `as_str`, `Display` and `FromStr` for a closed status enum
/// stored as lowercase text in the database.
macro_rules! text_enum {
    ($name:ident, $what:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Database / wire representation
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::error::DomainError::ValidationError(format!(
                        concat!("Unknown ", $what, ": {}"),
                        other
                    ))),
                }
            }
        }
    };
}

mod activity;
mod attendance;
mod book;
mod borrowing;
mod category;
mod library;
mod member;
mod message;
mod reservation;

pub use activity::{ActivityLog, NewActivity};
pub use attendance::{format_clock_time, AttendanceRecord, AttendanceState, CheckInAction};
pub use book::{Book, BookStatus, NewBook};
pub use borrowing::{
    generate_transaction_id, BorrowOrigin, Borrowing, BorrowingStatus, NewBorrowing,
};
pub use category::{Category, NewCategory};
pub use library::Library;
pub use member::{
    format_user_code, generate_account_token, generate_temporary_password, Member, NewMember,
    UserStatus, RESET_TOKEN_TTL_HOURS,
};
pub use message::{ConversationSummary, Message, NewMessage, MAX_MESSAGE_LENGTH};
pub use reservation::{NewReservation, Reservation, ReservationStatus};

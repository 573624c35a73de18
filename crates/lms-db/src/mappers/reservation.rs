//! Reservation model -> entity mapper

use lms_core::{BookId, DomainError, LibraryId, Reservation, ReservationId, UserId};

use super::parse_column;
use crate::models::ReservationModel;

impl TryFrom<ReservationModel> for Reservation {
    type Error = DomainError;

    fn try_from(model: ReservationModel) -> Result<Self, Self::Error> {
        Ok(Reservation {
            id: ReservationId::new(model.id),
            library_id: LibraryId::new(model.library_id),
            member_id: UserId::new(model.member_id),
            book_id: BookId::new(model.book_id),
            reservation_date: model.reservation_date,
            expiry_date: model.expiry_date,
            status: parse_column(&model.status, "reservations.status")?,
            librarian_notes: model.librarian_notes,
            rejection_reason: model.rejection_reason,
            processed_by: model.processed_by.map(UserId::new),
            processed_at: model.processed_at,
            created_at: model.created_at,
        })
    }
}

//! Borrowing model -> entity mapper

use lms_core::{BookId, Borrowing, BorrowingId, DomainError, LibraryId, ReservationId, UserId};

use super::parse_column;
use crate::models::BorrowingModel;

impl TryFrom<BorrowingModel> for Borrowing {
    type Error = DomainError;

    fn try_from(model: BorrowingModel) -> Result<Self, Self::Error> {
        Ok(Borrowing {
            id: BorrowingId::new(model.id),
            library_id: LibraryId::new(model.library_id),
            transaction_id: model.transaction_id,
            member_id: UserId::new(model.member_id),
            book_id: BookId::new(model.book_id),
            reservation_id: model.reservation_id.map(ReservationId::new),
            issued_by: UserId::new(model.issued_by),
            issue_date: model.issue_date,
            due_date: model.due_date,
            return_date: model.return_date,
            renewal_count: model.renewal_count,
            status: parse_column(&model.status, "borrowings.status")?,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}

//! Borrowing service
//!
//! Lending, renewal and return of copies. The copy accounting itself runs
//! inside the repository transaction; this layer resolves the member and
//! book, picks dates from the library clock and sends the notifications.

use chrono::Duration;
use lms_core::{
    generate_transaction_id, Borrowing, BorrowingId, BorrowingQuery, DomainError, NewBorrowing,
    Notification, NotificationKind, RequestContext,
};
use tracing::{info, instrument};

use crate::dto::{
    BorrowRequest, BorrowResponse, BorrowingListQuery, BorrowingResponse, PageResponse,
    RenewRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Borrowing service
pub struct BorrowingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BorrowingService<'a> {
    /// Create a new BorrowingService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Lend a copy to a member.
    ///
    /// An approved reservation the member holds for the book is consumed
    /// instead of a shelf copy.
    #[instrument(skip(self, request), fields(member_id = %request.member_id, book_id = %request.book_id))]
    pub async fn borrow(
        &self,
        rc: &RequestContext,
        request: BorrowRequest,
    ) -> ServiceResult<BorrowResponse> {
        rc.require_staff()?;

        let member = self
            .ctx
            .member_repo()
            .find_by_id(rc.library_id, request.member_id)
            .await?
            .ok_or(DomainError::UserNotFound(request.member_id))?;
        member.ensure_can_borrow()?;

        let book = self
            .ctx
            .book_repo()
            .find_by_id(rc.library_id, request.book_id)
            .await?
            .ok_or(DomainError::BookNotFound(Some(request.book_id)))?;
        book.ensure_lendable()?;

        let today = self.ctx.clock().today();
        let due_date = request.due_date.unwrap_or_else(|| {
            today + Duration::days(i64::from(self.ctx.settings().default_loan_days))
        });
        let new_borrowing = NewBorrowing {
            library_id: rc.library_id,
            member_id: member.id,
            book_id: book.id,
            issued_by: rc.user_id,
            issue_date: today,
            due_date,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
        };
        new_borrowing.validate_dates()?;

        let transaction_id = generate_transaction_id(self.ctx.clock().now());
        let (borrowing, origin) = self
            .ctx
            .borrowing_repo()
            .borrow(&new_borrowing, &transaction_id)
            .await?;

        info!(
            borrowing_id = %borrowing.id,
            transaction_id = %borrowing.transaction_id,
            from_reservation = origin.is_from_reservation(),
            "Book borrowed"
        );

        self.ctx
            .notify(Notification::new(
                rc.library_id,
                member.id,
                NotificationKind::Borrowing,
                "Book borrowed",
                format!(
                    "You borrowed '{}'. Please return it by {}.",
                    book.title,
                    borrowing.due_date.format("%Y-%m-%d")
                ),
            ))
            .await;
        self.ctx
            .log_activity(
                rc,
                "book_borrowed",
                format!(
                    "Lent '{}' to {} ({})",
                    book.title, member.full_name, borrowing.transaction_id
                ),
            )
            .await;

        Ok(BorrowResponse::new(&borrowing, origin, today))
    }

    /// Paginated loans. Members only ever see their own.
    #[instrument(skip(self, query))]
    pub async fn list(
        &self,
        rc: &RequestContext,
        query: BorrowingListQuery,
    ) -> ServiceResult<PageResponse<BorrowingResponse>> {
        let member_id = if rc.role.is_staff() {
            query.member_id
        } else {
            Some(rc.user_id)
        };
        let repo_query = BorrowingQuery {
            filter: query.status.into(),
            member_id,
            book_id: query.book_id,
            page: query.page(),
        };

        let today = self.ctx.clock().today();
        let borrowings = self
            .ctx
            .borrowing_repo()
            .list(rc.library_id, &repo_query, today)
            .await?;
        Ok(PageResponse::from_page(borrowings, |b| {
            BorrowingResponse::new(&b, today)
        }))
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        rc: &RequestContext,
        borrowing_id: BorrowingId,
    ) -> ServiceResult<BorrowingResponse> {
        let borrowing = self.find_visible(rc, borrowing_id).await?;
        Ok(BorrowingResponse::new(&borrowing, self.ctx.clock().today()))
    }

    /// Extend the due date of a loan that is not overdue yet
    #[instrument(skip(self, request), fields(new_due_date = %request.new_due_date))]
    pub async fn renew(
        &self,
        rc: &RequestContext,
        borrowing_id: BorrowingId,
        request: RenewRequest,
    ) -> ServiceResult<BorrowingResponse> {
        let current = self.find_visible(rc, borrowing_id).await?;

        let today = self.ctx.clock().today();
        let borrowing = self
            .ctx
            .borrowing_repo()
            .renew(rc.library_id, current.id, request.new_due_date, today)
            .await?;

        info!(
            borrowing_id = %borrowing.id,
            renewal_count = borrowing.renewal_count,
            "Borrowing renewed"
        );

        self.ctx
            .notify(Notification::new(
                rc.library_id,
                borrowing.member_id,
                NotificationKind::Renewal,
                "Loan renewed",
                format!(
                    "Your loan {} is now due on {}.",
                    borrowing.transaction_id,
                    borrowing.due_date.format("%Y-%m-%d")
                ),
            ))
            .await;
        if rc.role.is_staff() {
            self.ctx
                .log_activity(
                    rc,
                    "borrowing_renewed",
                    format!("Renewed loan {}", borrowing.transaction_id),
                )
                .await;
        }

        Ok(BorrowingResponse::new(&borrowing, today))
    }

    /// Close a loan and put its copy back on the shelf
    #[instrument(skip(self))]
    pub async fn return_book(
        &self,
        rc: &RequestContext,
        borrowing_id: BorrowingId,
    ) -> ServiceResult<BorrowingResponse> {
        rc.require_staff()?;

        let today = self.ctx.clock().today();
        let borrowing = self
            .ctx
            .borrowing_repo()
            .mark_returned(rc.library_id, borrowing_id, today)
            .await?;

        info!(borrowing_id = %borrowing.id, "Book returned");

        self.ctx
            .notify(Notification::new(
                rc.library_id,
                borrowing.member_id,
                NotificationKind::Return,
                "Book returned",
                format!("Loan {} has been returned. Thank you!", borrowing.transaction_id),
            ))
            .await;
        self.ctx
            .log_activity(
                rc,
                "book_returned",
                format!("Received return for loan {}", borrowing.transaction_id),
            )
            .await;

        Ok(BorrowingResponse::new(&borrowing, today))
    }

    /// Members asking for someone else's loan get the same answer as for a missing one
    async fn find_visible(
        &self,
        rc: &RequestContext,
        borrowing_id: BorrowingId,
    ) -> ServiceResult<Borrowing> {
        self.ctx
            .borrowing_repo()
            .find_by_id(rc.library_id, borrowing_id)
            .await?
            .filter(|b| rc.role.is_staff() || b.member_id == rc.user_id)
            .ok_or_else(|| DomainError::BorrowingNotFound(borrowing_id).into())
    }
}

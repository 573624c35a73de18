//! Reservation service
//!
//! Members reserve titles; librarians approve (taking a copy off the shelf),
//! reject or fulfill them. Stale reservations are expired on request.

use lms_core::{
    DomainError, NewReservation, Notification, NotificationKind, RequestContext, Reservation,
    ReservationId, ReservationQuery, UserId,
};
use tracing::{info, instrument};

use crate::dto::{
    ApproveReservationRequest, CreateReservationRequest, ExpireResponse, PageResponse,
    RejectReservationRequest, ReservationListQuery, ReservationResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Reservation service
pub struct ReservationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReservationService<'a> {
    /// Create a new ReservationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Open a pending reservation. Members reserve for themselves; staff name the member.
    #[instrument(skip(self, request), fields(book_id = %request.book_id))]
    pub async fn create(
        &self,
        rc: &RequestContext,
        request: CreateReservationRequest,
    ) -> ServiceResult<ReservationResponse> {
        let member_id = match request.member_id {
            Some(id) if id != rc.user_id => {
                rc.require_staff()?;
                id
            }
            Some(id) => id,
            None if rc.role.is_staff() => {
                return Err(ServiceError::validation("member_id is required"));
            }
            None => rc.user_id,
        };

        let member = self
            .ctx
            .member_repo()
            .find_by_id(rc.library_id, member_id)
            .await?
            .ok_or(DomainError::UserNotFound(member_id))?;
        member.ensure_can_borrow()?;

        let book = self
            .ctx
            .book_repo()
            .find_by_id(rc.library_id, request.book_id)
            .await?
            .ok_or(DomainError::BookNotFound(Some(request.book_id)))?;
        book.ensure_lendable()?;

        if self
            .ctx
            .reservation_repo()
            .has_open(member.id, book.id)
            .await?
        {
            return Err(DomainError::DuplicateReservation.into());
        }

        let new_reservation = NewReservation::new(
            rc.library_id,
            member.id,
            book.id,
            self.ctx.clock().today(),
            self.ctx.settings().reservation_window_days,
        );
        let reservation = self
            .ctx
            .reservation_repo()
            .create(&new_reservation)
            .await?;

        info!(reservation_id = %reservation.id, member_id = %member.id, "Reservation created");

        self.ctx
            .notify(Notification::new(
                rc.library_id,
                member.id,
                NotificationKind::Reservation,
                "Reservation received",
                format!(
                    "Your reservation for '{}' is waiting for approval.",
                    book.title
                ),
            ))
            .await;

        Ok(ReservationResponse::from(reservation))
    }

    /// Paginated reservations. Members only ever see their own.
    #[instrument(skip(self, query))]
    pub async fn list(
        &self,
        rc: &RequestContext,
        query: ReservationListQuery,
    ) -> ServiceResult<PageResponse<ReservationResponse>> {
        let member_id = if rc.role.is_staff() {
            query.member_id
        } else {
            Some(rc.user_id)
        };
        let repo_query = ReservationQuery {
            status: query.status,
            member_id,
            page: query.page(),
        };
        let reservations = self
            .ctx
            .reservation_repo()
            .list(rc.library_id, &repo_query)
            .await?;
        Ok(PageResponse::from_page(reservations, ReservationResponse::from))
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        rc: &RequestContext,
        reservation_id: ReservationId,
    ) -> ServiceResult<ReservationResponse> {
        let reservation = self.find_visible(rc, reservation_id).await?;
        Ok(ReservationResponse::from(reservation))
    }

    /// pending -> approved; one copy is set aside for the member
    #[instrument(skip(self, request))]
    pub async fn approve(
        &self,
        rc: &RequestContext,
        reservation_id: ReservationId,
        request: ApproveReservationRequest,
    ) -> ServiceResult<ReservationResponse> {
        rc.require_staff()?;

        let reservation = self
            .ctx
            .reservation_repo()
            .approve(
                rc.library_id,
                reservation_id,
                rc.user_id,
                request.notes,
                self.ctx.clock().now(),
            )
            .await?;

        info!(reservation_id = %reservation.id, "Reservation approved");

        self.notify_member(
            rc,
            reservation.member_id,
            "Reservation approved",
            format!(
                "Your reservation #{} has been approved. Please collect the book by {}.",
                reservation.id,
                reservation.expiry_date.format("%Y-%m-%d")
            ),
        )
        .await;
        self.ctx
            .log_activity(
                rc,
                "reservation_approved",
                format!("Approved reservation #{}", reservation.id),
            )
            .await;

        Ok(ReservationResponse::from(reservation))
    }

    /// pending -> rejected, with a reason shown to the member
    #[instrument(skip(self, request))]
    pub async fn reject(
        &self,
        rc: &RequestContext,
        reservation_id: ReservationId,
        request: RejectReservationRequest,
    ) -> ServiceResult<ReservationResponse> {
        rc.require_staff()?;

        let reservation = self
            .ctx
            .reservation_repo()
            .reject(
                rc.library_id,
                reservation_id,
                rc.user_id,
                &request.reason,
                self.ctx.clock().now(),
            )
            .await?;

        info!(reservation_id = %reservation.id, "Reservation rejected");

        self.notify_member(
            rc,
            reservation.member_id,
            "Reservation rejected",
            format!(
                "Your reservation #{} was rejected: {}",
                reservation.id,
                reservation.rejection_reason.as_deref().unwrap_or_default()
            ),
        )
        .await;
        self.ctx
            .log_activity(
                rc,
                "reservation_rejected",
                format!("Rejected reservation #{}", reservation.id),
            )
            .await;

        Ok(ReservationResponse::from(reservation))
    }

    /// approved -> fulfilled
    #[instrument(skip(self))]
    pub async fn fulfill(
        &self,
        rc: &RequestContext,
        reservation_id: ReservationId,
    ) -> ServiceResult<ReservationResponse> {
        rc.require_staff()?;

        let reservation = self
            .ctx
            .reservation_repo()
            .fulfill(rc.library_id, reservation_id)
            .await?;

        info!(reservation_id = %reservation.id, "Reservation fulfilled");
        self.ctx
            .log_activity(
                rc,
                "reservation_fulfilled",
                format!("Fulfilled reservation #{}", reservation.id),
            )
            .await;

        Ok(ReservationResponse::from(reservation))
    }

    /// Cancel an open reservation; a held copy goes back on the shelf.
    /// Members may cancel their own.
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        rc: &RequestContext,
        reservation_id: ReservationId,
    ) -> ServiceResult<ReservationResponse> {
        let current = self.find_visible(rc, reservation_id).await?;

        let reservation = self
            .ctx
            .reservation_repo()
            .cancel(rc.library_id, current.id)
            .await?;

        info!(reservation_id = %reservation.id, "Reservation cancelled");

        if rc.role.is_staff() {
            self.notify_member(
                rc,
                reservation.member_id,
                "Reservation cancelled",
                format!("Your reservation #{} has been cancelled.", reservation.id),
            )
            .await;
            self.ctx
                .log_activity(
                    rc,
                    "reservation_cancelled",
                    format!("Cancelled reservation #{}", reservation.id),
                )
                .await;
        }

        Ok(ReservationResponse::from(reservation))
    }

    /// Expire every open reservation past its expiry date
    #[instrument(skip(self))]
    pub async fn expire_stale(&self, rc: &RequestContext) -> ServiceResult<ExpireResponse> {
        rc.require_staff()?;

        let expired = self
            .ctx
            .reservation_repo()
            .expire_stale(rc.library_id, self.ctx.clock().today())
            .await?;

        info!(count = expired.len(), "Stale reservations expired");

        for reservation in &expired {
            self.notify_member(
                rc,
                reservation.member_id,
                "Reservation expired",
                format!("Your reservation #{} has expired.", reservation.id),
            )
            .await;
        }

        Ok(ExpireResponse {
            expired: expired.len(),
            reservations: expired.into_iter().map(ReservationResponse::from).collect(),
        })
    }

    async fn notify_member(
        &self,
        rc: &RequestContext,
        member_id: UserId,
        title: &str,
        message: String,
    ) {
        self.ctx
            .notify(Notification::new(
                rc.library_id,
                member_id,
                NotificationKind::Reservation,
                title,
                message,
            ))
            .await;
    }

    async fn find_visible(
        &self,
        rc: &RequestContext,
        reservation_id: ReservationId,
    ) -> ServiceResult<Reservation> {
        self.ctx
            .reservation_repo()
            .find_by_id(rc.library_id, reservation_id)
            .await?
            .filter(|r| rc.role.is_staff() || r.member_id == rc.user_id)
            .ok_or_else(|| DomainError::ReservationNotFound(reservation_id).into())
    }
}

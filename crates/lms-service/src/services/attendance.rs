//! Attendance service
//!
//! Daily check-in / check-out toggle for members, run from the front desk.
//! Each member has at most one row per local day; the state machine lives in
//! [`AttendanceState`].

use std::collections::HashMap;

use lms_core::{
    format_clock_time, AttendanceState, CheckInAction, DomainError, Member, MemberQuery,
    Notification, NotificationKind, PageRequest, RequestContext, UserId, UserRole, UserStatus,
};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{
    AttendanceDateQuery, AttendanceResponse, DailyAttendanceEntry, DailyAttendanceResponse,
    HistoryQuery, MessageResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Attendance service
pub struct AttendanceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AttendanceService<'a> {
    /// Create a new AttendanceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record today's arrival for a member
    #[instrument(skip(self))]
    pub async fn check_in(
        &self,
        rc: &RequestContext,
        member_id: UserId,
    ) -> ServiceResult<AttendanceResponse> {
        rc.require_staff()?;
        let member = self.find_active(rc, member_id).await?;

        let today = self.ctx.clock().today();
        let now = self.ctx.clock().time_of_day();
        let repo = self.ctx.attendance_repo();

        let existing = repo.find(rc.library_id, member.id, today).await?;
        let record = match (AttendanceState::from_record(existing.as_ref()).check_in()?, existing) {
            (CheckInAction::SetArrival, Some(row)) => repo.set_arrival(row.id, now).await?,
            _ => repo.insert_arrival(rc.library_id, member.id, today, now).await?,
        };

        info!(user_id = %member.id, date = %today, "Member checked in");
        self.notify(
            rc,
            member.id,
            "Checked in",
            format!("You checked in at {}.", format_clock_time(now)),
        )
        .await;

        Ok(AttendanceResponse::from(&record))
    }

    /// Record today's departure for a checked-in member
    #[instrument(skip(self))]
    pub async fn check_out(
        &self,
        rc: &RequestContext,
        member_id: UserId,
    ) -> ServiceResult<AttendanceResponse> {
        rc.require_staff()?;
        let member = self.find_active(rc, member_id).await?;

        let today = self.ctx.clock().today();
        let now = self.ctx.clock().time_of_day();
        let repo = self.ctx.attendance_repo();

        let existing = repo.find(rc.library_id, member.id, today).await?;
        AttendanceState::from_record(existing.as_ref()).check_out()?;
        let row = existing.ok_or(DomainError::NotCheckedIn)?;
        let record = repo.set_departure(row.id, now).await?;

        info!(user_id = %member.id, date = %today, "Member checked out");
        self.notify(
            rc,
            member.id,
            "Checked out",
            format!("You checked out at {}.", format_clock_time(now)),
        )
        .await;

        Ok(AttendanceResponse::from(&record))
    }

    /// Delete today's row so the member is absent again
    #[instrument(skip(self))]
    pub async fn reset(
        &self,
        rc: &RequestContext,
        member_id: UserId,
    ) -> ServiceResult<MessageResponse> {
        rc.require_staff()?;
        let member = self.find_member(rc, member_id).await?;

        let today = self.ctx.clock().today();
        let row = self
            .ctx
            .attendance_repo()
            .find(rc.library_id, member.id, today)
            .await?
            .ok_or(DomainError::AttendanceNotFound)?;
        self.ctx.attendance_repo().delete(row.id).await?;

        info!(user_id = %member.id, date = %today, "Attendance reset");
        self.notify(
            rc,
            member.id,
            "Attendance reset",
            format!("Your attendance for {} has been reset.", today.format("%Y-%m-%d")),
        )
        .await;

        Ok(MessageResponse::new("Attendance reset"))
    }

    /// Every active member with their state for one day
    #[instrument(skip(self))]
    pub async fn daily(
        &self,
        rc: &RequestContext,
        query: AttendanceDateQuery,
    ) -> ServiceResult<DailyAttendanceResponse> {
        rc.require_staff()?;

        let date = query.date.unwrap_or_else(|| self.ctx.clock().today());
        let mut records: HashMap<UserId, _> = self
            .ctx
            .attendance_repo()
            .list_for_date(rc.library_id, date)
            .await?
            .into_iter()
            .map(|r| (r.user_id, r))
            .collect();

        let members = self.active_members(rc).await?;
        let entries: Vec<DailyAttendanceEntry> = members
            .iter()
            .map(|m| DailyAttendanceEntry::new(m, records.remove(&m.id).as_ref()))
            .collect();
        let present = entries.iter().filter(|e| e.is_present).count();

        Ok(DailyAttendanceResponse {
            date,
            present,
            members: entries,
        })
    }

    /// A member's rows in an inclusive date range, oldest first
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        rc: &RequestContext,
        member_id: UserId,
        query: HistoryQuery,
    ) -> ServiceResult<Vec<AttendanceResponse>> {
        rc.require_self_or_staff(member_id)?;
        query
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;
        let member = self.find_member(rc, member_id).await?;

        let rows = self
            .ctx
            .attendance_repo()
            .history(rc.library_id, member.id, query.from, query.to)
            .await?;
        Ok(rows.iter().map(AttendanceResponse::from).collect())
    }

    async fn find_member(&self, rc: &RequestContext, member_id: UserId) -> ServiceResult<Member> {
        self.ctx
            .member_repo()
            .find_by_id(rc.library_id, member_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(member_id).into())
    }

    async fn find_active(&self, rc: &RequestContext, member_id: UserId) -> ServiceResult<Member> {
        let member = self.find_member(rc, member_id).await?;
        if !member.is_active() {
            return Err(ServiceError::validation(format!(
                "Member account is {}",
                member.status
            )));
        }
        Ok(member)
    }

    /// Walk the directory a page at a time; the sheet lists every active member
    async fn active_members(&self, rc: &RequestContext) -> ServiceResult<Vec<Member>> {
        let mut members = Vec::new();
        let mut page = 1;
        loop {
            let query = MemberQuery {
                search: None,
                role: Some(UserRole::Member),
                status: Some(UserStatus::Active),
                page: PageRequest::new(page, PageRequest::MAX_PER_PAGE),
            };
            let batch = self.ctx.member_repo().list(rc.library_id, &query).await?;
            let done = batch.items.is_empty()
                || i64::try_from(members.len() + batch.items.len()).unwrap_or(i64::MAX)
                    >= batch.total;
            members.extend(batch.items);
            if done {
                return Ok(members);
            }
            page += 1;
        }
    }

    async fn notify(&self, rc: &RequestContext, member_id: UserId, title: &str, message: String) {
        self.ctx
            .notify(Notification::new(
                rc.library_id,
                member_id,
                NotificationKind::Attendance,
                title,
                message,
            ))
            .await;
    }
}

//! Member service
//!
//! Member directory: account creation with an emailed setup link, listing,
//! profile updates and soft deletion.

use lms_common::hash_password;
use lms_core::{
    generate_account_token, generate_temporary_password, DomainError, LibraryId, Member,
    MemberQuery, NewMember, RequestContext, UserId, UserRole, UserStatus,
};
use tracing::{info, instrument};

use crate::dto::{
    CreateMemberRequest, MemberDetailResponse, MemberListQuery, MemberResponse, MessageResponse,
    PageResponse, SearchQuery, UpdateMemberRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::mail::setup_mail;

/// Member service
pub struct MemberService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MemberService<'a> {
    /// Create a new MemberService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a pending account and mail its setup link.
    ///
    /// The stored password is a random throwaway that nobody ever sees; the
    /// member picks a real one through the link.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn create(
        &self,
        rc: &RequestContext,
        request: CreateMemberRequest,
    ) -> ServiceResult<MemberResponse> {
        rc.require_staff()?;

        let email = request.email.trim().to_lowercase();
        let username = request.username.trim().to_string();

        if self.ctx.member_repo().email_exists(&email).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }
        if self.ctx.member_repo().username_exists(&username).await? {
            return Err(DomainError::UsernameAlreadyExists.into());
        }

        let role = request.role.unwrap_or(UserRole::Member);
        let user_code = self
            .ctx
            .member_repo()
            .next_user_code(rc.library_id, role)
            .await?;
        let password_hash = hash_password(&generate_temporary_password())
            .map_err(|e| ServiceError::internal(e.to_string()))?;
        let token = generate_account_token();

        let new_member = NewMember {
            library_id: rc.library_id,
            username,
            email,
            full_name: request.full_name.trim().to_string(),
            phone: request.phone.filter(|p| !p.trim().is_empty()),
            role,
            email_verification_token: token.clone(),
        };
        let member = self
            .ctx
            .member_repo()
            .create(&new_member, &user_code, &password_hash)
            .await?;

        info!(user_id = %member.id, user_code = %member.user_code, role = %member.role, "Account created");

        self.ctx
            .send_mail(setup_mail(&member, &token, &self.ctx.settings().setup_base_url))
            .await;
        self.ctx
            .log_activity(
                rc,
                "member_created",
                format!("Created {} account {} ({})", member.role, member.user_code, member.full_name),
            )
            .await;

        Ok(MemberResponse::from(member))
    }

    /// Paginated directory listing
    #[instrument(skip(self, query))]
    pub async fn list(
        &self,
        rc: &RequestContext,
        query: MemberListQuery,
    ) -> ServiceResult<PageResponse<MemberResponse>> {
        rc.require_staff()?;

        let page = query.page();
        let query = MemberQuery {
            search: query.search,
            role: query.role,
            status: query.status,
            page,
        };
        let members = self.ctx.member_repo().list(rc.library_id, &query).await?;
        Ok(PageResponse::from_page(members, MemberResponse::from))
    }

    /// One account with its number of active loans. Members may look up themselves.
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        rc: &RequestContext,
        member_id: UserId,
    ) -> ServiceResult<MemberDetailResponse> {
        rc.require_self_or_staff(member_id)?;

        let member = self.find(rc.library_id, member_id).await?;
        let active = self
            .ctx
            .member_repo()
            .count_active_borrowings(member.id)
            .await?;
        Ok(MemberDetailResponse::new(&member, active))
    }

    /// Active members matching a term, for the borrow desk lookup
    #[instrument(skip(self))]
    pub async fn search_active(
        &self,
        rc: &RequestContext,
        query: SearchQuery,
    ) -> ServiceResult<Vec<MemberResponse>> {
        rc.require_staff()?;

        let members = self
            .ctx
            .member_repo()
            .search_active(rc.library_id, query.q.trim(), query.limit())
            .await?;
        Ok(members.into_iter().map(MemberResponse::from).collect())
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        rc: &RequestContext,
        member_id: UserId,
        request: UpdateMemberRequest,
    ) -> ServiceResult<MemberResponse> {
        rc.require_staff()?;

        let mut member = self.find(rc.library_id, member_id).await?;

        if let Some(full_name) = request.full_name {
            member.full_name = full_name.trim().to_string();
        }
        if let Some(phone) = request.phone {
            let phone = phone.trim().to_string();
            member.phone = (!phone.is_empty()).then_some(phone);
        }
        if let Some(role) = request.role {
            member.role = role;
        }
        match request.status {
            Some(UserStatus::Pending) => {
                return Err(ServiceError::validation(
                    "Status can only be set to active or inactive",
                ));
            }
            Some(status) => member.status = status,
            None => {}
        }

        self.ctx.member_repo().update(&member).await?;

        info!(user_id = %member.id, "Account updated");
        self.ctx
            .log_activity(
                rc,
                "member_updated",
                format!("Updated account {} ({})", member.user_code, member.full_name),
            )
            .await;

        Ok(MemberResponse::from(member))
    }

    /// Soft delete. Pending accounts and members with books out are refused.
    #[instrument(skip(self))]
    pub async fn delete(&self, rc: &RequestContext, member_id: UserId) -> ServiceResult<()> {
        rc.require_staff()?;

        let member = self.find(rc.library_id, member_id).await?;
        member.ensure_deletable()?;

        let active = self
            .ctx
            .member_repo()
            .count_active_borrowings(member.id)
            .await?;
        if active > 0 {
            return Err(DomainError::HasActiveBorrowings(active).into());
        }

        self.ctx
            .member_repo()
            .deactivate(rc.library_id, member.id)
            .await?;

        info!(user_id = %member.id, "Account deactivated");
        self.ctx
            .log_activity(
                rc,
                "member_deleted",
                format!("Deactivated account {} ({})", member.user_code, member.full_name),
            )
            .await;

        Ok(())
    }

    /// Issue a fresh setup token for a pending account and mail it again
    #[instrument(skip(self))]
    pub async fn resend_setup(
        &self,
        rc: &RequestContext,
        member_id: UserId,
    ) -> ServiceResult<MessageResponse> {
        rc.require_staff()?;

        let member = self.find(rc.library_id, member_id).await?;
        if !member.is_pending() {
            return Err(ServiceError::validation(
                "Setup links can only be sent to pending accounts",
            ));
        }

        let token = generate_account_token();
        self.ctx
            .member_repo()
            .set_verification_token(member.id, &token)
            .await?;
        self.ctx
            .send_mail(setup_mail(&member, &token, &self.ctx.settings().setup_base_url))
            .await;

        info!(user_id = %member.id, "Setup link re-sent");
        Ok(MessageResponse::new("Setup link sent"))
    }

    async fn find(&self, library_id: LibraryId, member_id: UserId) -> ServiceResult<Member> {
        self.ctx
            .member_repo()
            .find_by_id(library_id, member_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(member_id).into())
    }
}

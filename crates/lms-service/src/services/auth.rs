//! Authentication service
//!
//! Handles login, account setup through the emailed link, and password resets.

use chrono::Duration;
use lms_common::{hash_password, validate_password_strength, verify_password, AppError};
use lms_core::{
    generate_account_token, DomainError, Notification, NotificationKind, RequestContext,
    RESET_TOKEN_TTL_HOURS,
};
use tracing::{debug, info, instrument, warn};

use crate::dto::{
    AuthResponse, CompleteSetupRequest, ConfirmPasswordResetRequest, LoginRequest,
    MemberResponse, MessageResponse, PasswordResetRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::mail::password_reset_mail;

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Login with email and password. Only active accounts get a token.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        let member = self
            .ctx
            .member_repo()
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: unknown email");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        let password_hash = self
            .ctx
            .member_repo()
            .get_password_hash(member.id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %member.id, "Login failed: no password hash");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        let is_valid = verify_password(&request.password, &password_hash)
            .map_err(|e| ServiceError::internal(e.to_string()))?;

        if !is_valid {
            warn!(user_id = %member.id, "Login failed: invalid password");
            return Err(ServiceError::App(AppError::InvalidCredentials));
        }

        if !member.is_active() {
            warn!(user_id = %member.id, status = %member.status, "Login refused: account not active");
            return Err(DomainError::AccountNotActive.into());
        }

        let identity = RequestContext::new(member.library_id, member.id, member.role);
        let token = self.ctx.jwt_service().issue(&identity)?;

        info!(user_id = %member.id, role = %member.role, "User logged in");

        Ok(AuthResponse {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
            user: MemberResponse::from(member),
        })
    }

    /// Consume a setup token: set the first password and activate the account
    #[instrument(skip(self, request))]
    pub async fn complete_setup(
        &self,
        request: CompleteSetupRequest,
    ) -> ServiceResult<MessageResponse> {
        validate_password_strength(&request.password)?;

        let member = self
            .ctx
            .member_repo()
            .find_by_verification_token(&request.token)
            .await?
            .filter(|m| m.is_pending())
            .ok_or(DomainError::InvalidToken)?;

        let password_hash =
            hash_password(&request.password).map_err(|e| ServiceError::internal(e.to_string()))?;
        self.ctx
            .member_repo()
            .activate(member.id, &password_hash)
            .await?;

        info!(user_id = %member.id, "Account activated");

        self.ctx
            .notify(Notification::new(
                member.library_id,
                member.id,
                NotificationKind::Account,
                "Welcome",
                "Your account is active. You can now sign in.",
            ))
            .await;

        Ok(MessageResponse::new("Account activated"))
    }

    /// Mail a reset link. Unknown emails get the same answer as known ones.
    #[instrument(skip(self, request))]
    pub async fn request_password_reset(
        &self,
        request: PasswordResetRequest,
    ) -> ServiceResult<MessageResponse> {
        let acknowledged = MessageResponse::new(
            "If an account exists for this email, a reset link has been sent",
        );

        let Some(member) = self
            .ctx
            .member_repo()
            .find_by_email(&request.email)
            .await?
        else {
            debug!("Password reset requested for unknown email");
            return Ok(acknowledged);
        };

        let token = generate_account_token();
        let expires_at = self.ctx.clock().now() + Duration::hours(RESET_TOKEN_TTL_HOURS);
        self.ctx
            .member_repo()
            .set_reset_token(member.id, &token, expires_at)
            .await?;

        self.ctx
            .send_mail(password_reset_mail(
                &member,
                &token,
                &self.ctx.settings().setup_base_url,
            ))
            .await;

        info!(user_id = %member.id, "Password reset token issued");
        Ok(acknowledged)
    }

    /// Consume a reset token and set the new password
    #[instrument(skip(self, request))]
    pub async fn reset_password(
        &self,
        request: ConfirmPasswordResetRequest,
    ) -> ServiceResult<MessageResponse> {
        validate_password_strength(&request.password)?;

        let (member, expires_at) = self
            .ctx
            .member_repo()
            .find_by_reset_token(&request.token)
            .await?
            .ok_or(DomainError::InvalidToken)?;

        if expires_at < self.ctx.clock().now() {
            warn!(user_id = %member.id, "Expired reset token used");
            return Err(DomainError::TokenExpired.into());
        }

        let password_hash =
            hash_password(&request.password).map_err(|e| ServiceError::internal(e.to_string()))?;
        self.ctx
            .member_repo()
            .reset_password(member.id, &password_hash)
            .await?;

        info!(user_id = %member.id, "Password reset");
        Ok(MessageResponse::new("Password updated"))
    }
}

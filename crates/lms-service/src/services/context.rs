//! Service context - dependency container for services
//!
//! Holds the repositories, side-effect ports, clock and circulation settings
//! every service needs.

use std::sync::Arc;

use lms_common::{AppConfig, JwtService};
use lms_core::{
    ActivityLogRepository, AttendanceRepository, BookRepository, BorrowingRepository,
    CategoryRepository, Clock, CoverStore, LibraryRepository, Mailer, MemberRepository,
    MessageRepository, NewActivity, Notification, Notifier, OutgoingMail, RequestContext,
    ReservationRepository, SystemClock,
};
use tracing::warn;

use super::{ServiceError, ServiceResult};

/// Circulation rules and limits the services apply
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub reservation_window_days: u32,
    pub default_loan_days: u32,
    /// Base URL for links in setup and password reset mails
    pub setup_base_url: String,
    pub max_cover_bytes: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            reservation_window_days: 7,
            default_loan_days: 14,
            setup_base_url: "http://localhost:8080".to_string(),
            max_cover_bytes: 5 * 1024 * 1024,
        }
    }
}

impl From<&AppConfig> for ServiceSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            reservation_window_days: config.library.reservation_window_days,
            default_loan_days: config.library.default_loan_days,
            setup_base_url: config.library.setup_base_url.trim_end_matches('/').to_string(),
            max_cover_bytes: config.storage.max_cover_bytes(),
        }
    }
}

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Database repositories
/// - Notification, mail and cover storage ports
/// - JWT service for authentication
/// - The library clock
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    library_repo: Arc<dyn LibraryRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    book_repo: Arc<dyn BookRepository>,
    member_repo: Arc<dyn MemberRepository>,
    borrowing_repo: Arc<dyn BorrowingRepository>,
    reservation_repo: Arc<dyn ReservationRepository>,
    attendance_repo: Arc<dyn AttendanceRepository>,
    message_repo: Arc<dyn MessageRepository>,
    activity_repo: Arc<dyn ActivityLogRepository>,

    // Side effects
    notifier: Arc<dyn Notifier>,
    mailer: Arc<dyn Mailer>,
    covers: Arc<dyn CoverStore>,

    // Services
    jwt_service: Arc<JwtService>,
    clock: Arc<dyn Clock>,
    settings: ServiceSettings,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn library_repo(&self) -> &dyn LibraryRepository {
        self.library_repo.as_ref()
    }

    pub fn category_repo(&self) -> &dyn CategoryRepository {
        self.category_repo.as_ref()
    }

    pub fn book_repo(&self) -> &dyn BookRepository {
        self.book_repo.as_ref()
    }

    pub fn member_repo(&self) -> &dyn MemberRepository {
        self.member_repo.as_ref()
    }

    pub fn borrowing_repo(&self) -> &dyn BorrowingRepository {
        self.borrowing_repo.as_ref()
    }

    pub fn reservation_repo(&self) -> &dyn ReservationRepository {
        self.reservation_repo.as_ref()
    }

    pub fn attendance_repo(&self) -> &dyn AttendanceRepository {
        self.attendance_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn activity_repo(&self) -> &dyn ActivityLogRepository {
        self.activity_repo.as_ref()
    }

    // === Side effects ===

    pub fn covers(&self) -> &dyn CoverStore {
        self.covers.as_ref()
    }

    /// Push a notification to a member's feed. Failures are logged and dropped.
    pub async fn notify(&self, notification: Notification) {
        if let Err(e) = self.notifier.notify(&notification).await {
            warn!(
                user_id = %notification.user_id,
                kind = ?notification.kind,
                error = %e,
                "Failed to deliver notification"
            );
        }
    }

    /// Queue an email. Failures are logged and dropped.
    pub async fn send_mail(&self, mail: OutgoingMail) {
        if let Err(e) = self.mailer.send(&mail).await {
            warn!(to = %mail.to, subject = %mail.subject, error = %e, "Failed to queue mail");
        }
    }

    /// Append to the library's activity log. Failures are logged and dropped.
    pub async fn log_activity(
        &self,
        ctx: &RequestContext,
        action: &str,
        description: impl Into<String>,
    ) {
        let entry = NewActivity::new(ctx.library_id, ctx.user_id, action, description);
        if let Err(e) = self.activity_repo.record(&entry).await {
            warn!(action, error = %e, "Failed to record activity");
        }
    }

    // === Services ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Get the library clock
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("side_effects", &"...")
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    library_repo: Option<Arc<dyn LibraryRepository>>,
    category_repo: Option<Arc<dyn CategoryRepository>>,
    book_repo: Option<Arc<dyn BookRepository>>,
    member_repo: Option<Arc<dyn MemberRepository>>,
    borrowing_repo: Option<Arc<dyn BorrowingRepository>>,
    reservation_repo: Option<Arc<dyn ReservationRepository>>,
    attendance_repo: Option<Arc<dyn AttendanceRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    activity_repo: Option<Arc<dyn ActivityLogRepository>>,
    notifier: Option<Arc<dyn Notifier>>,
    mailer: Option<Arc<dyn Mailer>>,
    covers: Option<Arc<dyn CoverStore>>,
    jwt_service: Option<Arc<JwtService>>,
    clock: Option<Arc<dyn Clock>>,
    settings: Option<ServiceSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn library_repo(mut self, repo: Arc<dyn LibraryRepository>) -> Self {
        self.library_repo = Some(repo);
        self
    }

    pub fn category_repo(mut self, repo: Arc<dyn CategoryRepository>) -> Self {
        self.category_repo = Some(repo);
        self
    }

    pub fn book_repo(mut self, repo: Arc<dyn BookRepository>) -> Self {
        self.book_repo = Some(repo);
        self
    }

    pub fn member_repo(mut self, repo: Arc<dyn MemberRepository>) -> Self {
        self.member_repo = Some(repo);
        self
    }

    pub fn borrowing_repo(mut self, repo: Arc<dyn BorrowingRepository>) -> Self {
        self.borrowing_repo = Some(repo);
        self
    }

    pub fn reservation_repo(mut self, repo: Arc<dyn ReservationRepository>) -> Self {
        self.reservation_repo = Some(repo);
        self
    }

    pub fn attendance_repo(mut self, repo: Arc<dyn AttendanceRepository>) -> Self {
        self.attendance_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn activity_repo(mut self, repo: Arc<dyn ActivityLogRepository>) -> Self {
        self.activity_repo = Some(repo);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn covers(mut self, covers: Arc<dyn CoverStore>) -> Self {
        self.covers = Some(covers);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    /// Defaults to the UTC system clock
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns an error if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            library_repo: self
                .library_repo
                .ok_or_else(|| ServiceError::validation("library_repo is required"))?,
            category_repo: self
                .category_repo
                .ok_or_else(|| ServiceError::validation("category_repo is required"))?,
            book_repo: self
                .book_repo
                .ok_or_else(|| ServiceError::validation("book_repo is required"))?,
            member_repo: self
                .member_repo
                .ok_or_else(|| ServiceError::validation("member_repo is required"))?,
            borrowing_repo: self
                .borrowing_repo
                .ok_or_else(|| ServiceError::validation("borrowing_repo is required"))?,
            reservation_repo: self
                .reservation_repo
                .ok_or_else(|| ServiceError::validation("reservation_repo is required"))?,
            attendance_repo: self
                .attendance_repo
                .ok_or_else(|| ServiceError::validation("attendance_repo is required"))?,
            message_repo: self
                .message_repo
                .ok_or_else(|| ServiceError::validation("message_repo is required"))?,
            activity_repo: self
                .activity_repo
                .ok_or_else(|| ServiceError::validation("activity_repo is required"))?,
            notifier: self
                .notifier
                .ok_or_else(|| ServiceError::validation("notifier is required"))?,
            mailer: self
                .mailer
                .ok_or_else(|| ServiceError::validation("mailer is required"))?,
            covers: self
                .covers
                .ok_or_else(|| ServiceError::validation("covers is required"))?,
            jwt_service: self
                .jwt_service
                .ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock::default())),
            settings: self.settings.unwrap_or_default(),
        })
    }
}

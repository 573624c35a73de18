//! Repository traits (ports) - define the interface for data access
//!
//! Every lookup takes the caller's `LibraryId`; rows belonging to another
//! library are reported as not found.
//!
//! Borrowing and reservation transitions that touch `available_copies` run
//! inside one transaction in the implementation, with the book and
//! reservation rows locked, and apply the entity methods from
//! [`crate::entities`] to decide the outcome.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::entities::{
    ActivityLog, AttendanceRecord, Book, BookStatus, BorrowOrigin, Borrowing, Category,
    ConversationSummary, Library, Member, Message, NewActivity, NewBook, NewBorrowing,
    NewCategory, NewMember, NewMessage, NewReservation, Reservation, ReservationStatus,
    UserStatus,
};
use crate::error::DomainError;
use crate::value_objects::{
    AttendanceId, BookId, BorrowingId, CategoryId, LibraryId, Page, PageRequest, ReservationId,
    UserId, UserRole,
};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Library Repository
// ============================================================================

#[async_trait]
pub trait LibraryRepository: Send + Sync {
    async fn find_by_id(&self, id: LibraryId) -> RepoResult<Option<Library>>;

    /// Recompute `current_book_count` from a live count and return it
    async fn refresh_book_count(&self, id: LibraryId) -> RepoResult<i64>;
}

// ============================================================================
// Category Repository
// ============================================================================

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, library_id: LibraryId, id: CategoryId)
        -> RepoResult<Option<Category>>;

    /// All categories of a library, ordered by name
    async fn list(&self, library_id: LibraryId) -> RepoResult<Vec<Category>>;

    async fn create(&self, category: &NewCategory) -> RepoResult<Category>;
}

// ============================================================================
// Book Repository
// ============================================================================

/// Sort order for the catalog listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookSort {
    #[default]
    Title,
    Author,
}

/// Catalog listing filters
#[derive(Debug, Clone, Default)]
pub struct BookQuery {
    /// Case-insensitive match on title, ISBN or book code
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    pub status: Option<BookStatus>,
    pub sort: BookSort,
    pub page: PageRequest,
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn find_by_id(&self, library_id: LibraryId, id: BookId) -> RepoResult<Option<Book>>;

    /// Check if a library-scoped book code is already taken
    async fn code_exists(&self, library_id: LibraryId, book_code: &str) -> RepoResult<bool>;

    async fn list(&self, library_id: LibraryId, query: &BookQuery) -> RepoResult<Page<Book>>;

    /// Active books with copies on the shelf matching a search term
    async fn search_available(
        &self,
        library_id: LibraryId,
        term: &str,
        limit: i64,
    ) -> RepoResult<Vec<Book>>;

    async fn create(&self, book: &NewBook) -> RepoResult<Book>;

    /// Write the editable fields under a row lock and return the stored row.
    /// `available_copies` is recomputed from the locked row, never copied
    /// from `book`.
    async fn update(&self, book: &Book) -> RepoResult<Book>;

    /// Delete a book in one transaction. Fails with `HasActiveBorrowings`
    /// while copies are out. Returns the deleted row.
    async fn delete(&self, library_id: LibraryId, id: BookId) -> RepoResult<Book>;
}

// ============================================================================
// Member Repository
// ============================================================================

/// Member directory listing filters
#[derive(Debug, Clone, Default)]
pub struct MemberQuery {
    /// Case-insensitive match on name, email or user code
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub page: PageRequest,
}

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_by_id(&self, library_id: LibraryId, id: UserId) -> RepoResult<Option<Member>>;

    /// Find an account by email across all libraries (login, password reset)
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Member>>;

    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    async fn username_exists(&self, username: &str) -> RepoResult<bool>;

    /// Next unused library-scoped user code for a role
    async fn next_user_code(&self, library_id: LibraryId, role: UserRole) -> RepoResult<String>;

    /// Insert a pending account
    async fn create(
        &self,
        member: &NewMember,
        user_code: &str,
        password_hash: &str,
    ) -> RepoResult<Member>;

    /// Overwrite profile fields, role and status (last write wins)
    async fn update(&self, member: &Member) -> RepoResult<()>;

    async fn list(&self, library_id: LibraryId, query: &MemberQuery) -> RepoResult<Page<Member>>;

    /// Active members matching a search term
    async fn search_active(
        &self,
        library_id: LibraryId,
        term: &str,
        limit: i64,
    ) -> RepoResult<Vec<Member>>;

    async fn count_active_borrowings(&self, id: UserId) -> RepoResult<i64>;

    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>>;

    async fn set_verification_token(&self, id: UserId, token: &str) -> RepoResult<()>;

    async fn set_reset_token(
        &self,
        id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<()>;

    async fn find_by_verification_token(&self, token: &str) -> RepoResult<Option<Member>>;

    /// Returns the account and the token's expiry
    async fn find_by_reset_token(
        &self,
        token: &str,
    ) -> RepoResult<Option<(Member, DateTime<Utc>)>>;

    /// Set the password, mark the account active and clear the verification token
    async fn activate(&self, id: UserId, password_hash: &str) -> RepoResult<()>;

    /// Set the password and clear the reset token
    async fn reset_password(&self, id: UserId, password_hash: &str) -> RepoResult<()>;

    /// Soft delete: status -> inactive
    async fn deactivate(&self, library_id: LibraryId, id: UserId) -> RepoResult<()>;
}

// ============================================================================
// Borrowing Repository
// ============================================================================

/// Which loans a listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorrowingFilter {
    #[default]
    All,
    Active,
    Returned,
    /// Active with a due date before today
    Overdue,
}

#[derive(Debug, Clone, Default)]
pub struct BorrowingQuery {
    pub filter: BorrowingFilter,
    pub member_id: Option<UserId>,
    pub book_id: Option<BookId>,
    pub page: PageRequest,
}

#[async_trait]
pub trait BorrowingRepository: Send + Sync {
    async fn find_by_id(&self, library_id: LibraryId, id: BorrowingId)
        -> RepoResult<Option<Borrowing>>;

    async fn list(
        &self,
        library_id: LibraryId,
        query: &BorrowingQuery,
        today: NaiveDate,
    ) -> RepoResult<Page<Borrowing>>;

    /// Lend a copy in one transaction: lock the book, lock the member's
    /// approved reservation for it if any, decide the origin with
    /// [`BorrowOrigin::decide`], then either decrement `available_copies`
    /// (direct) or mark the reservation borrowed, and insert the loan.
    async fn borrow(
        &self,
        borrowing: &NewBorrowing,
        transaction_id: &str,
    ) -> RepoResult<(Borrowing, BorrowOrigin)>;

    /// Extend the due date of an active, not-yet-overdue loan
    async fn renew(
        &self,
        library_id: LibraryId,
        id: BorrowingId,
        new_due_date: NaiveDate,
        today: NaiveDate,
    ) -> RepoResult<Borrowing>;

    /// Close the loan and put its copy back, in one transaction
    async fn mark_returned(
        &self,
        library_id: LibraryId,
        id: BorrowingId,
        today: NaiveDate,
    ) -> RepoResult<Borrowing>;
}

// ============================================================================
// Reservation Repository
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ReservationQuery {
    pub status: Option<ReservationStatus>,
    pub member_id: Option<UserId>,
    pub page: PageRequest,
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn find_by_id(
        &self,
        library_id: LibraryId,
        id: ReservationId,
    ) -> RepoResult<Option<Reservation>>;

    async fn list(
        &self,
        library_id: LibraryId,
        query: &ReservationQuery,
    ) -> RepoResult<Page<Reservation>>;

    /// Check if the member already has a pending or approved reservation for the book
    async fn has_open(&self, member_id: UserId, book_id: BookId) -> RepoResult<bool>;

    async fn create(&self, reservation: &NewReservation) -> RepoResult<Reservation>;

    /// pending -> approved, taking one copy off the locked book row
    async fn approve(
        &self,
        library_id: LibraryId,
        id: ReservationId,
        librarian_id: UserId,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> RepoResult<Reservation>;

    /// pending -> rejected
    async fn reject(
        &self,
        library_id: LibraryId,
        id: ReservationId,
        librarian_id: UserId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> RepoResult<Reservation>;

    /// approved -> fulfilled
    async fn fulfill(&self, library_id: LibraryId, id: ReservationId) -> RepoResult<Reservation>;

    /// Any open state -> cancelled, releasing a held copy
    async fn cancel(&self, library_id: LibraryId, id: ReservationId) -> RepoResult<Reservation>;

    /// Expire every open reservation whose expiry date is before `today`,
    /// releasing held copies. Returns the expired rows.
    async fn expire_stale(
        &self,
        library_id: LibraryId,
        today: NaiveDate,
    ) -> RepoResult<Vec<Reservation>>;
}

// ============================================================================
// Attendance Repository
// ============================================================================

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn find(
        &self,
        library_id: LibraryId,
        user_id: UserId,
        date: NaiveDate,
    ) -> RepoResult<Option<AttendanceRecord>>;

    /// Insert the day's row with an arrival time
    async fn insert_arrival(
        &self,
        library_id: LibraryId,
        user_id: UserId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> RepoResult<AttendanceRecord>;

    async fn set_arrival(&self, id: AttendanceId, time: NaiveTime)
        -> RepoResult<AttendanceRecord>;

    async fn set_departure(
        &self,
        id: AttendanceId,
        time: NaiveTime,
    ) -> RepoResult<AttendanceRecord>;

    async fn delete(&self, id: AttendanceId) -> RepoResult<()>;

    /// Every row of a library for one day
    async fn list_for_date(
        &self,
        library_id: LibraryId,
        date: NaiveDate,
    ) -> RepoResult<Vec<AttendanceRecord>>;

    /// A member's rows in an inclusive date range, oldest first
    async fn history(
        &self,
        library_id: LibraryId,
        user_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<AttendanceRecord>>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: &NewMessage) -> RepoResult<Message>;

    /// Latest message per counterpart with unread counts, newest first
    async fn conversations(
        &self,
        library_id: LibraryId,
        user_id: UserId,
    ) -> RepoResult<Vec<ConversationSummary>>;

    /// Messages exchanged between two users, oldest first
    async fn between(
        &self,
        library_id: LibraryId,
        user_id: UserId,
        other_id: UserId,
    ) -> RepoResult<Vec<Message>>;

    /// Mark everything `sender_id` sent to `recipient_id` as read
    async fn mark_read(
        &self,
        library_id: LibraryId,
        sender_id: UserId,
        recipient_id: UserId,
    ) -> RepoResult<u64>;

    async fn unread_count(&self, library_id: LibraryId, user_id: UserId) -> RepoResult<i64>;
}

// ============================================================================
// Activity Log Repository
// ============================================================================

#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    async fn record(&self, activity: &NewActivity) -> RepoResult<()>;

    /// Most recent entries of a library
    async fn recent(&self, library_id: LibraryId, limit: i64) -> RepoResult<Vec<ActivityLog>>;
}

//! In-memory implementations of the repository ports.
//!
//! One shared state behind a mutex stands in for the database. Multi-row
//! operations run under a single lock, which gives them the same atomicity
//! the Postgres transactions provide.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use lms_core::{
    format_user_code, ActivityId, ActivityLog, ActivityLogRepository, AttendanceId,
    AttendanceRecord, AttendanceRepository, Book, BookId, BookQuery, BookRepository, BookSort,
    BorrowOrigin, Borrowing, BorrowingFilter, BorrowingId, BorrowingQuery, BorrowingRepository,
    BorrowingStatus, Category, CategoryId, CategoryRepository, ConversationSummary, DomainError,
    Library, LibraryId, LibraryRepository, Member, MemberQuery, MemberRepository, Message,
    MessageId, MessageRepository, NewActivity, NewBook, NewBorrowing, NewCategory, NewMember,
    NewMessage, NewReservation, Page, PageRequest, RepoResult, Reservation, ReservationId,
    ReservationQuery, ReservationRepository, ReservationStatus, UserId, UserRole, UserStatus,
};
use parking_lot::Mutex;

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub member: Member,
    pub password_hash: String,
    pub verification_token: Option<String>,
    pub reset_token: Option<(String, DateTime<Utc>)>,
}

#[derive(Debug, Default)]
pub struct State {
    next_id: i64,
    pub libraries: Vec<Library>,
    pub categories: Vec<Category>,
    pub books: Vec<Book>,
    pub users: Vec<StoredUser>,
    pub borrowings: Vec<Borrowing>,
    pub reservations: Vec<Reservation>,
    pub attendance: Vec<AttendanceRecord>,
    pub messages: Vec<Message>,
    pub activities: Vec<ActivityLog>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn book_mut(&mut self, library_id: LibraryId, id: BookId) -> RepoResult<&mut Book> {
        self.books
            .iter_mut()
            .find(|b| b.id == id && b.library_id == library_id)
            .ok_or(DomainError::BookNotFound(Some(id)))
    }

    fn user_mut(&mut self, id: UserId) -> RepoResult<&mut StoredUser> {
        self.users
            .iter_mut()
            .find(|u| u.member.id == id)
            .ok_or(DomainError::UserNotFound(id))
    }

    fn reservation_index(&self, library_id: LibraryId, id: ReservationId) -> RepoResult<usize> {
        self.reservations
            .iter()
            .position(|r| r.id == id && r.library_id == library_id)
            .ok_or(DomainError::ReservationNotFound(id))
    }

    fn active_borrowings_of_book(&self, id: BookId) -> i64 {
        self.borrowings
            .iter()
            .filter(|b| b.book_id == id && b.is_active())
            .count() as i64
    }
}

fn paginate<T: Clone>(rows: &[T], page: PageRequest) -> Page<T> {
    let items = rows
        .iter()
        .skip(usize::try_from(page.offset()).unwrap())
        .take(usize::try_from(page.limit()).unwrap())
        .cloned()
        .collect();
    Page::new(items, rows.len() as i64, page)
}

fn contains_term(haystacks: &[&str], term: Option<&str>) -> bool {
    match term.map(str::trim).filter(|t| !t.is_empty()) {
        None => true,
        Some(term) => {
            let term = term.to_lowercase();
            haystacks.iter().any(|h| h.to_lowercase().contains(&term))
        }
    }
}

/// The whole fake database
#[derive(Debug, Default)]
pub struct MemoryDb {
    pub state: Mutex<State>,
}

impl MemoryDb {
    pub fn add_library(&self, name: &str) -> LibraryId {
        let mut state = self.state.lock();
        let id = LibraryId::new(state.next_id());
        state.libraries.push(Library {
            id,
            name: name.to_string(),
            current_book_count: 0,
            created_at: Utc::now(),
        });
        id
    }

    /// Insert an account directly, bypassing the setup flow
    pub fn add_user(
        &self,
        library_id: LibraryId,
        username: &str,
        role: UserRole,
        status: UserStatus,
        password_hash: &str,
    ) -> Member {
        let mut state = self.state.lock();
        let id = UserId::new(state.next_id());
        let now = Utc::now();
        let member = Member {
            id,
            library_id,
            user_code: format_user_code(role, id.into_inner()),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            full_name: username.to_string(),
            phone: None,
            role,
            status,
            profile_image: None,
            created_at: now,
            updated_at: now,
        };
        state.users.push(StoredUser {
            member: member.clone(),
            password_hash: password_hash.to_string(),
            verification_token: None,
            reset_token: None,
        });
        member
    }

    pub fn book(&self, id: BookId) -> Book {
        self.state
            .lock()
            .books
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .unwrap()
    }

    pub fn user(&self, id: UserId) -> StoredUser {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.member.id == id)
            .cloned()
            .unwrap()
    }

    pub fn reservation(&self, id: ReservationId) -> Reservation {
        self.state
            .lock()
            .reservations
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .unwrap()
    }

    pub fn borrowing_count(&self) -> usize {
        self.state.lock().borrowings.len()
    }

    pub fn attendance_rows(&self, user_id: UserId) -> Vec<AttendanceRecord> {
        self.state
            .lock()
            .attendance
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn insert_attendance(
        &self,
        library_id: LibraryId,
        user_id: UserId,
        date: NaiveDate,
        arrival: Option<NaiveTime>,
        departure: Option<NaiveTime>,
    ) {
        let mut state = self.state.lock();
        let id = AttendanceId::new(state.next_id());
        state.attendance.push(AttendanceRecord {
            id,
            library_id,
            user_id,
            attendance_date: date,
            arrival_time: arrival,
            departure_time: departure,
        });
    }

    /// Overwrite a reservation's expiry, e.g. to make it stale
    pub fn set_reservation_expiry(&self, id: ReservationId, expiry: NaiveDate) {
        let mut state = self.state.lock();
        if let Some(r) = state.reservations.iter_mut().find(|r| r.id == id) {
            r.expiry_date = expiry;
        }
    }

    pub fn activity_actions(&self) -> Vec<String> {
        self.state
            .lock()
            .activities
            .iter()
            .map(|a| a.action.clone())
            .collect()
    }
}

// ============================================================================
// Library / Category
// ============================================================================

#[async_trait]
impl LibraryRepository for MemoryDb {
    async fn find_by_id(&self, id: LibraryId) -> RepoResult<Option<Library>> {
        Ok(self.state.lock().libraries.iter().find(|l| l.id == id).cloned())
    }

    async fn refresh_book_count(&self, id: LibraryId) -> RepoResult<i64> {
        let mut state = self.state.lock();
        let count = state.books.iter().filter(|b| b.library_id == id).count() as i64;
        let library = state
            .libraries
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(DomainError::LibraryNotFound(id))?;
        library.current_book_count = count;
        Ok(count)
    }
}

#[async_trait]
impl CategoryRepository for MemoryDb {
    async fn find_by_id(
        &self,
        library_id: LibraryId,
        id: CategoryId,
    ) -> RepoResult<Option<Category>> {
        Ok(self
            .state
            .lock()
            .categories
            .iter()
            .find(|c| c.id == id && c.library_id == library_id)
            .cloned())
    }

    async fn list(&self, library_id: LibraryId) -> RepoResult<Vec<Category>> {
        let mut rows: Vec<Category> = self
            .state
            .lock()
            .categories
            .iter()
            .filter(|c| c.library_id == library_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn create(&self, category: &NewCategory) -> RepoResult<Category> {
        let mut state = self.state.lock();
        if state
            .categories
            .iter()
            .any(|c| c.library_id == category.library_id && c.name == category.name)
        {
            return Err(DomainError::CategoryExists(category.name.clone()));
        }
        let row = Category {
            id: CategoryId::new(state.next_id()),
            library_id: category.library_id,
            name: category.name.clone(),
            description: category.description.clone(),
            created_at: Utc::now(),
        };
        state.categories.push(row.clone());
        Ok(row)
    }
}

// ============================================================================
// Books
// ============================================================================

#[async_trait]
impl BookRepository for MemoryDb {
    async fn find_by_id(&self, library_id: LibraryId, id: BookId) -> RepoResult<Option<Book>> {
        Ok(self
            .state
            .lock()
            .books
            .iter()
            .find(|b| b.id == id && b.library_id == library_id)
            .cloned())
    }

    async fn code_exists(&self, library_id: LibraryId, book_code: &str) -> RepoResult<bool> {
        Ok(self
            .state
            .lock()
            .books
            .iter()
            .any(|b| b.library_id == library_id && b.book_code == book_code))
    }

    async fn list(&self, library_id: LibraryId, query: &BookQuery) -> RepoResult<Page<Book>> {
        let mut rows: Vec<Book> = self
            .state
            .lock()
            .books
            .iter()
            .filter(|b| b.library_id == library_id)
            .filter(|b| query.category_id.map_or(true, |c| b.category_id == Some(c)))
            .filter(|b| query.status.map_or(true, |s| b.status == s))
            .filter(|b| contains_term(&[&b.title, &b.isbn, &b.book_code], query.search.as_deref()))
            .cloned()
            .collect();
        match query.sort {
            BookSort::Title => rows.sort_by(|a, b| a.title.cmp(&b.title)),
            BookSort::Author => rows.sort_by(|a, b| a.author_name.cmp(&b.author_name)),
        }
        Ok(paginate(&rows, query.page))
    }

    async fn search_available(
        &self,
        library_id: LibraryId,
        term: &str,
        limit: i64,
    ) -> RepoResult<Vec<Book>> {
        Ok(self
            .state
            .lock()
            .books
            .iter()
            .filter(|b| b.library_id == library_id && b.is_available())
            .filter(|b| contains_term(&[&b.title, &b.author_name, &b.isbn, &b.book_code], Some(term)))
            .take(usize::try_from(limit).unwrap())
            .cloned()
            .collect())
    }

    async fn create(&self, book: &NewBook) -> RepoResult<Book> {
        let mut state = self.state.lock();
        if state
            .books
            .iter()
            .any(|b| b.library_id == book.library_id && b.book_code == book.book_code)
        {
            return Err(DomainError::BookCodeExists(book.book_code.clone()));
        }
        let now = Utc::now();
        let row = Book {
            id: BookId::new(state.next_id()),
            library_id: book.library_id,
            book_code: book.book_code.clone(),
            title: book.title.clone(),
            author_name: book.author_name.clone(),
            isbn: book.isbn.clone(),
            category_id: book.category_id,
            total_copies: book.total_copies,
            available_copies: book.total_copies,
            status: book.status,
            cover_image: book.cover_image.clone(),
            created_at: now,
            updated_at: now,
        };
        state.books.push(row.clone());
        Ok(row)
    }

    async fn update(&self, book: &Book) -> RepoResult<Book> {
        let mut state = self.state.lock();
        if state.books.iter().any(|b| {
            b.library_id == book.library_id && b.book_code == book.book_code && b.id != book.id
        }) {
            return Err(DomainError::BookCodeExists(book.book_code.clone()));
        }
        let row = state.book_mut(book.library_id, book.id)?;
        let mut current = row.clone();
        current.apply_edit(book)?;
        *row = current.clone();
        Ok(current)
    }

    async fn delete(&self, library_id: LibraryId, id: BookId) -> RepoResult<Book> {
        let mut state = self.state.lock();
        let book = state.book_mut(library_id, id)?.clone();
        let active = state.active_borrowings_of_book(id);
        if active > 0 {
            return Err(DomainError::HasActiveBorrowings(active));
        }
        state.books.retain(|b| b.id != id);
        Ok(book)
    }
}

// ============================================================================
// Members
// ============================================================================

#[async_trait]
impl MemberRepository for MemoryDb {
    async fn find_by_id(&self, library_id: LibraryId, id: UserId) -> RepoResult<Option<Member>> {
        Ok(self
            .state
            .lock()
            .users
            .iter()
            .map(|u| &u.member)
            .find(|m| m.id == id && m.library_id == library_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Member>> {
        Ok(self
            .state
            .lock()
            .users
            .iter()
            .map(|u| &u.member)
            .find(|m| m.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self
            .state
            .lock()
            .users
            .iter()
            .any(|u| u.member.email.eq_ignore_ascii_case(email)))
    }

    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        Ok(self
            .state
            .lock()
            .users
            .iter()
            .any(|u| u.member.username == username))
    }

    async fn next_user_code(&self, library_id: LibraryId, role: UserRole) -> RepoResult<String> {
        let count = self
            .state
            .lock()
            .users
            .iter()
            .filter(|u| u.member.library_id == library_id && u.member.role == role)
            .count() as i64;
        Ok(format_user_code(role, count + 1))
    }

    async fn create(
        &self,
        member: &NewMember,
        user_code: &str,
        password_hash: &str,
    ) -> RepoResult<Member> {
        let mut state = self.state.lock();
        let now = Utc::now();
        let row = Member {
            id: UserId::new(state.next_id()),
            library_id: member.library_id,
            user_code: user_code.to_string(),
            username: member.username.clone(),
            email: member.email.clone(),
            full_name: member.full_name.clone(),
            phone: member.phone.clone(),
            role: member.role,
            status: UserStatus::Pending,
            profile_image: None,
            created_at: now,
            updated_at: now,
        };
        state.users.push(StoredUser {
            member: row.clone(),
            password_hash: password_hash.to_string(),
            verification_token: Some(member.email_verification_token.clone()),
            reset_token: None,
        });
        Ok(row)
    }

    async fn update(&self, member: &Member) -> RepoResult<()> {
        let mut state = self.state.lock();
        let user = state.user_mut(member.id)?;
        user.member = member.clone();
        Ok(())
    }

    async fn list(&self, library_id: LibraryId, query: &MemberQuery) -> RepoResult<Page<Member>> {
        let mut rows: Vec<Member> = self
            .state
            .lock()
            .users
            .iter()
            .map(|u| &u.member)
            .filter(|m| m.library_id == library_id)
            .filter(|m| query.role.map_or(true, |r| m.role == r))
            .filter(|m| query.status.map_or(true, |s| m.status == s))
            .filter(|m| contains_term(&[&m.full_name, &m.email, &m.user_code], query.search.as_deref()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(paginate(&rows, query.page))
    }

    async fn search_active(
        &self,
        library_id: LibraryId,
        term: &str,
        limit: i64,
    ) -> RepoResult<Vec<Member>> {
        Ok(self
            .state
            .lock()
            .users
            .iter()
            .map(|u| &u.member)
            .filter(|m| m.library_id == library_id && m.is_active())
            .filter(|m| contains_term(&[&m.full_name, &m.email, &m.user_code], Some(term)))
            .take(usize::try_from(limit).unwrap())
            .cloned()
            .collect())
    }

    async fn count_active_borrowings(&self, id: UserId) -> RepoResult<i64> {
        Ok(self
            .state
            .lock()
            .borrowings
            .iter()
            .filter(|b| b.member_id == id && b.is_active())
            .count() as i64)
    }

    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>> {
        Ok(self
            .state
            .lock()
            .users
            .iter()
            .find(|u| u.member.id == id)
            .map(|u| u.password_hash.clone()))
    }

    async fn set_verification_token(&self, id: UserId, token: &str) -> RepoResult<()> {
        self.state.lock().user_mut(id)?.verification_token = Some(token.to_string());
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        self.state.lock().user_mut(id)?.reset_token = Some((token.to_string(), expires_at));
        Ok(())
    }

    async fn find_by_verification_token(&self, token: &str) -> RepoResult<Option<Member>> {
        Ok(self
            .state
            .lock()
            .users
            .iter()
            .find(|u| u.verification_token.as_deref() == Some(token))
            .map(|u| u.member.clone()))
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
    ) -> RepoResult<Option<(Member, DateTime<Utc>)>> {
        Ok(self.state.lock().users.iter().find_map(|u| match &u.reset_token {
            Some((t, expires)) if t == token => Some((u.member.clone(), *expires)),
            _ => None,
        }))
    }

    async fn activate(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        let mut state = self.state.lock();
        let user = state.user_mut(id)?;
        user.password_hash = password_hash.to_string();
        user.member.status = UserStatus::Active;
        user.verification_token = None;
        Ok(())
    }

    async fn reset_password(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        let mut state = self.state.lock();
        let user = state.user_mut(id)?;
        user.password_hash = password_hash.to_string();
        user.reset_token = None;
        Ok(())
    }

    async fn deactivate(&self, library_id: LibraryId, id: UserId) -> RepoResult<()> {
        let mut state = self.state.lock();
        let user = state.user_mut(id)?;
        if user.member.library_id != library_id {
            return Err(DomainError::UserNotFound(id));
        }
        user.member.status = UserStatus::Inactive;
        Ok(())
    }
}

// ============================================================================
// Borrowings
// ============================================================================

#[async_trait]
impl BorrowingRepository for MemoryDb {
    async fn find_by_id(
        &self,
        library_id: LibraryId,
        id: BorrowingId,
    ) -> RepoResult<Option<Borrowing>> {
        Ok(self
            .state
            .lock()
            .borrowings
            .iter()
            .find(|b| b.id == id && b.library_id == library_id)
            .cloned())
    }

    async fn list(
        &self,
        library_id: LibraryId,
        query: &BorrowingQuery,
        today: NaiveDate,
    ) -> RepoResult<Page<Borrowing>> {
        let mut rows: Vec<Borrowing> = self
            .state
            .lock()
            .borrowings
            .iter()
            .filter(|b| b.library_id == library_id)
            .filter(|b| query.member_id.map_or(true, |m| b.member_id == m))
            .filter(|b| query.book_id.map_or(true, |id| b.book_id == id))
            .filter(|b| match query.filter {
                BorrowingFilter::All => true,
                BorrowingFilter::Active => b.is_active(),
                BorrowingFilter::Returned => b.status == BorrowingStatus::Returned,
                BorrowingFilter::Overdue => b.is_overdue(today),
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(paginate(&rows, query.page))
    }

    async fn borrow(
        &self,
        borrowing: &NewBorrowing,
        transaction_id: &str,
    ) -> RepoResult<(Borrowing, BorrowOrigin)> {
        let mut state = self.state.lock();

        let book = state.book_mut(borrowing.library_id, borrowing.book_id)?.clone();
        book.ensure_lendable()?;

        let mut candidates: Vec<usize> = state
            .reservations
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                r.member_id == borrowing.member_id
                    && r.book_id == borrowing.book_id
                    && matches!(
                        r.status,
                        ReservationStatus::Approved | ReservationStatus::Borrowed
                    )
            })
            .map(|(i, _)| i)
            .collect();
        candidates.sort_by_key(|&i| state.reservations[i].status != ReservationStatus::Approved);
        let reservation_index = candidates.first().copied();

        let origin = BorrowOrigin::decide(
            &book,
            reservation_index.map(|i| &state.reservations[i]),
        )?;
        match (origin, reservation_index) {
            (BorrowOrigin::FromReservation(_), Some(i)) => {
                state.reservations[i].mark_borrowed()?;
            }
            _ => {
                state
                    .book_mut(borrowing.library_id, borrowing.book_id)?
                    .take_copy()?;
            }
        }

        let row = Borrowing {
            id: BorrowingId::new(state.next_id()),
            library_id: borrowing.library_id,
            transaction_id: transaction_id.to_string(),
            member_id: borrowing.member_id,
            book_id: borrowing.book_id,
            reservation_id: origin.reservation_id(),
            issued_by: borrowing.issued_by,
            issue_date: borrowing.issue_date,
            due_date: borrowing.due_date,
            return_date: None,
            renewal_count: 0,
            status: BorrowingStatus::Active,
            notes: borrowing.notes.clone(),
            created_at: Utc::now(),
        };
        state.borrowings.push(row.clone());
        Ok((row, origin))
    }

    async fn renew(
        &self,
        library_id: LibraryId,
        id: BorrowingId,
        new_due_date: NaiveDate,
        today: NaiveDate,
    ) -> RepoResult<Borrowing> {
        let mut state = self.state.lock();
        let row = state
            .borrowings
            .iter_mut()
            .find(|b| b.id == id && b.library_id == library_id)
            .ok_or(DomainError::BorrowingNotFound(id))?;
        row.renew(new_due_date, today)?;
        Ok(row.clone())
    }

    async fn mark_returned(
        &self,
        library_id: LibraryId,
        id: BorrowingId,
        today: NaiveDate,
    ) -> RepoResult<Borrowing> {
        let mut state = self.state.lock();
        let index = state
            .borrowings
            .iter()
            .position(|b| b.id == id && b.library_id == library_id)
            .ok_or(DomainError::BorrowingNotFound(id))?;
        let mut row = state.borrowings[index].clone();
        row.mark_returned(today)?;
        state.book_mut(library_id, row.book_id)?.return_copy();
        state.borrowings[index] = row.clone();
        Ok(row)
    }
}

// ============================================================================
// Reservations
// ============================================================================

impl MemoryDb {
    /// Apply a transition under the lock; `Some(true)` takes a copy, `Some(false)` releases one
    fn transition(
        &self,
        library_id: LibraryId,
        id: ReservationId,
        apply: impl FnOnce(&mut Reservation) -> RepoResult<Option<bool>>,
    ) -> RepoResult<Reservation> {
        let mut state = self.state.lock();
        let index = state.reservation_index(library_id, id)?;
        let mut reservation = state.reservations[index].clone();
        let book_id = reservation.book_id;
        match apply(&mut reservation)? {
            Some(true) => {
                let book = state.book_mut(library_id, book_id)?;
                book.ensure_lendable()?;
                book.take_copy()?;
            }
            Some(false) => state.book_mut(library_id, book_id)?.return_copy(),
            None => {}
        }
        state.reservations[index] = reservation.clone();
        Ok(reservation)
    }
}

#[async_trait]
impl ReservationRepository for MemoryDb {
    async fn find_by_id(
        &self,
        library_id: LibraryId,
        id: ReservationId,
    ) -> RepoResult<Option<Reservation>> {
        Ok(self
            .state
            .lock()
            .reservations
            .iter()
            .find(|r| r.id == id && r.library_id == library_id)
            .cloned())
    }

    async fn list(
        &self,
        library_id: LibraryId,
        query: &ReservationQuery,
    ) -> RepoResult<Page<Reservation>> {
        let mut rows: Vec<Reservation> = self
            .state
            .lock()
            .reservations
            .iter()
            .filter(|r| r.library_id == library_id)
            .filter(|r| query.status.map_or(true, |s| r.status == s))
            .filter(|r| query.member_id.map_or(true, |m| r.member_id == m))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(paginate(&rows, query.page))
    }

    async fn has_open(&self, member_id: UserId, book_id: BookId) -> RepoResult<bool> {
        Ok(self.state.lock().reservations.iter().any(|r| {
            r.member_id == member_id && r.book_id == book_id && !r.status.is_terminal()
        }))
    }

    async fn create(&self, reservation: &NewReservation) -> RepoResult<Reservation> {
        let mut state = self.state.lock();
        if state.reservations.iter().any(|r| {
            r.member_id == reservation.member_id
                && r.book_id == reservation.book_id
                && matches!(
                    r.status,
                    ReservationStatus::Pending | ReservationStatus::Approved
                )
        }) {
            return Err(DomainError::DuplicateReservation);
        }
        let row = Reservation {
            id: ReservationId::new(state.next_id()),
            library_id: reservation.library_id,
            member_id: reservation.member_id,
            book_id: reservation.book_id,
            reservation_date: reservation.reservation_date,
            expiry_date: reservation.expiry_date,
            status: ReservationStatus::Pending,
            librarian_notes: reservation.librarian_notes.clone(),
            rejection_reason: None,
            processed_by: None,
            processed_at: None,
            created_at: Utc::now(),
        };
        state.reservations.push(row.clone());
        Ok(row)
    }

    async fn approve(
        &self,
        library_id: LibraryId,
        id: ReservationId,
        librarian_id: UserId,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> RepoResult<Reservation> {
        self.transition(library_id, id, |r| {
            r.approve(librarian_id, notes, at)?;
            Ok(Some(true))
        })
    }

    async fn reject(
        &self,
        library_id: LibraryId,
        id: ReservationId,
        librarian_id: UserId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> RepoResult<Reservation> {
        self.transition(library_id, id, |r| {
            r.reject(librarian_id, reason, at)?;
            Ok(None)
        })
    }

    async fn fulfill(&self, library_id: LibraryId, id: ReservationId) -> RepoResult<Reservation> {
        self.transition(library_id, id, |r| {
            r.fulfill()?;
            Ok(None)
        })
    }

    async fn cancel(&self, library_id: LibraryId, id: ReservationId) -> RepoResult<Reservation> {
        self.transition(library_id, id, |r| {
            Ok(r.cancel()?.then_some(false))
        })
    }

    async fn expire_stale(
        &self,
        library_id: LibraryId,
        today: NaiveDate,
    ) -> RepoResult<Vec<Reservation>> {
        let mut state = self.state.lock();
        let stale: Vec<usize> = state
            .reservations
            .iter()
            .enumerate()
            .filter(|(_, r)| r.library_id == library_id && r.is_stale(today))
            .map(|(i, _)| i)
            .collect();

        let mut expired = Vec::with_capacity(stale.len());
        for i in stale {
            let released = state.reservations[i].expire(today)?;
            let book_id = state.reservations[i].book_id;
            if released {
                state.book_mut(library_id, book_id)?.return_copy();
            }
            expired.push(state.reservations[i].clone());
        }
        Ok(expired)
    }
}

// ============================================================================
// Attendance
// ============================================================================

#[async_trait]
impl AttendanceRepository for MemoryDb {
    async fn find(
        &self,
        library_id: LibraryId,
        user_id: UserId,
        date: NaiveDate,
    ) -> RepoResult<Option<AttendanceRecord>> {
        Ok(self
            .state
            .lock()
            .attendance
            .iter()
            .find(|a| {
                a.library_id == library_id && a.user_id == user_id && a.attendance_date == date
            })
            .cloned())
    }

    async fn insert_arrival(
        &self,
        library_id: LibraryId,
        user_id: UserId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> RepoResult<AttendanceRecord> {
        let mut state = self.state.lock();
        if state
            .attendance
            .iter()
            .any(|a| a.user_id == user_id && a.attendance_date == date)
        {
            return Err(DomainError::AlreadyCheckedIn);
        }
        let row = AttendanceRecord {
            id: AttendanceId::new(state.next_id()),
            library_id,
            user_id,
            attendance_date: date,
            arrival_time: Some(time),
            departure_time: None,
        };
        state.attendance.push(row.clone());
        Ok(row)
    }

    async fn set_arrival(
        &self,
        id: AttendanceId,
        time: NaiveTime,
    ) -> RepoResult<AttendanceRecord> {
        let mut state = self.state.lock();
        let row = state
            .attendance
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(DomainError::AttendanceNotFound)?;
        row.arrival_time = Some(time);
        Ok(row.clone())
    }

    async fn set_departure(
        &self,
        id: AttendanceId,
        time: NaiveTime,
    ) -> RepoResult<AttendanceRecord> {
        let mut state = self.state.lock();
        let row = state
            .attendance
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(DomainError::AttendanceNotFound)?;
        row.departure_time = Some(time);
        Ok(row.clone())
    }

    async fn delete(&self, id: AttendanceId) -> RepoResult<()> {
        let mut state = self.state.lock();
        let before = state.attendance.len();
        state.attendance.retain(|a| a.id != id);
        if state.attendance.len() == before {
            return Err(DomainError::AttendanceNotFound);
        }
        Ok(())
    }

    async fn list_for_date(
        &self,
        library_id: LibraryId,
        date: NaiveDate,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        Ok(self
            .state
            .lock()
            .attendance
            .iter()
            .filter(|a| a.library_id == library_id && a.attendance_date == date)
            .cloned()
            .collect())
    }

    async fn history(
        &self,
        library_id: LibraryId,
        user_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<AttendanceRecord>> {
        let mut rows: Vec<AttendanceRecord> = self
            .state
            .lock()
            .attendance
            .iter()
            .filter(|a| a.library_id == library_id && a.user_id == user_id)
            .filter(|a| a.attendance_date >= from && a.attendance_date <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.attendance_date);
        Ok(rows)
    }
}

// ============================================================================
// Messages / Activity
// ============================================================================

#[async_trait]
impl MessageRepository for MemoryDb {
    async fn create(&self, message: &NewMessage) -> RepoResult<Message> {
        let mut state = self.state.lock();
        let row = Message {
            id: MessageId::new(state.next_id()),
            library_id: message.library_id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            body: message.body.clone(),
            is_read: false,
            created_at: Utc::now(),
        };
        state.messages.push(row.clone());
        Ok(row)
    }

    async fn conversations(
        &self,
        library_id: LibraryId,
        user_id: UserId,
    ) -> RepoResult<Vec<ConversationSummary>> {
        let state = self.state.lock();
        let mut latest: HashMap<UserId, &Message> = HashMap::new();
        for m in state.messages.iter().filter(|m| {
            m.library_id == library_id && (m.sender_id == user_id || m.recipient_id == user_id)
        }) {
            let other = m.counterpart(user_id);
            // Ids grow with time, so the larger id is the newer message
            if latest.get(&other).map_or(true, |prev| prev.id < m.id) {
                latest.insert(other, m);
            }
        }
        let mut summaries: Vec<ConversationSummary> = latest
            .into_iter()
            .map(|(other, last)| ConversationSummary {
                counterpart_id: other,
                counterpart_name: state
                    .users
                    .iter()
                    .find(|u| u.member.id == other)
                    .map(|u| u.member.full_name.clone())
                    .unwrap_or_default(),
                last_message: last.clone(),
                unread_count: state
                    .messages
                    .iter()
                    .filter(|m| m.sender_id == other && m.recipient_id == user_id && !m.is_read)
                    .count() as i64,
            })
            .collect();
        summaries.sort_by(|a, b| b.last_message.id.cmp(&a.last_message.id));
        Ok(summaries)
    }

    async fn between(
        &self,
        library_id: LibraryId,
        user_id: UserId,
        other_id: UserId,
    ) -> RepoResult<Vec<Message>> {
        Ok(self
            .state
            .lock()
            .messages
            .iter()
            .filter(|m| {
                m.library_id == library_id
                    && ((m.sender_id == user_id && m.recipient_id == other_id)
                        || (m.sender_id == other_id && m.recipient_id == user_id))
            })
            .cloned()
            .collect())
    }

    async fn mark_read(
        &self,
        library_id: LibraryId,
        sender_id: UserId,
        recipient_id: UserId,
    ) -> RepoResult<u64> {
        let mut state = self.state.lock();
        let mut marked = 0;
        for m in state.messages.iter_mut().filter(|m| {
            m.library_id == library_id
                && m.sender_id == sender_id
                && m.recipient_id == recipient_id
                && !m.is_read
        }) {
            m.is_read = true;
            marked += 1;
        }
        Ok(marked)
    }

    async fn unread_count(&self, library_id: LibraryId, user_id: UserId) -> RepoResult<i64> {
        Ok(self
            .state
            .lock()
            .messages
            .iter()
            .filter(|m| m.library_id == library_id && m.recipient_id == user_id && !m.is_read)
            .count() as i64)
    }
}

#[async_trait]
impl ActivityLogRepository for MemoryDb {
    async fn record(&self, activity: &NewActivity) -> RepoResult<()> {
        let mut state = self.state.lock();
        let row = ActivityLog {
            id: ActivityId::new(state.next_id()),
            library_id: activity.library_id,
            user_id: activity.user_id,
            action: activity.action.clone(),
            description: activity.description.clone(),
            created_at: Utc::now(),
        };
        state.activities.push(row);
        Ok(())
    }

    async fn recent(&self, library_id: LibraryId, limit: i64) -> RepoResult<Vec<ActivityLog>> {
        Ok(self
            .state
            .lock()
            .activities
            .iter()
            .rev()
            .filter(|a| a.library_id == library_id)
            .take(usize::try_from(limit).unwrap())
            .cloned()
            .collect())
    }
}

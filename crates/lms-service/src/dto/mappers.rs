//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.
//! Borrowings need the library's current date for their overdue fields, so
//! they are built with an explicit constructor instead.

use chrono::NaiveDate;
use lms_core::{
    format_clock_time, ActivityLog, AttendanceRecord, AttendanceState, Book, BorrowOrigin,
    Borrowing, Category, ConversationSummary, Member, Message, Reservation,
};

use super::responses::{
    ActivityResponse, AttendanceResponse, BookResponse, BorrowResponse, BorrowingResponse,
    CategoryResponse, ConversationResponse, DailyAttendanceEntry, DirectMessageResponse,
    MemberDetailResponse, MemberResponse, ReservationResponse,
};

/// Characters of the last message shown in the conversation list
const PREVIEW_CHARS: usize = 100;

// ============================================================================
// Catalog Mappers
// ============================================================================

impl From<&Book> for BookResponse {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            book_code: book.book_code.clone(),
            title: book.title.clone(),
            author_name: book.author_name.clone(),
            isbn: book.isbn.clone(),
            category_id: book.category_id,
            total_copies: book.total_copies,
            available_copies: book.available_copies,
            status: book.status,
            is_available: book.is_available(),
            cover_image: book.cover_image.clone(),
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self::from(&book)
    }
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            created_at: category.created_at,
        }
    }
}

// ============================================================================
// Member Mappers
// ============================================================================

impl From<&Member> for MemberResponse {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            library_id: member.library_id,
            user_code: member.user_code.clone(),
            username: member.username.clone(),
            email: member.email.clone(),
            full_name: member.full_name.clone(),
            phone: member.phone.clone(),
            role: member.role,
            status: member.status,
            profile_image: member.profile_image.clone(),
            created_at: member.created_at,
        }
    }
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self::from(&member)
    }
}

impl MemberDetailResponse {
    pub fn new(member: &Member, active_borrowings: i64) -> Self {
        Self {
            member: MemberResponse::from(member),
            active_borrowings,
        }
    }
}

// ============================================================================
// Circulation Mappers
// ============================================================================

impl BorrowingResponse {
    /// Build the response with overdue fields derived for `today`
    pub fn new(borrowing: &Borrowing, today: NaiveDate) -> Self {
        Self {
            id: borrowing.id,
            transaction_id: borrowing.transaction_id.clone(),
            member_id: borrowing.member_id,
            book_id: borrowing.book_id,
            reservation_id: borrowing.reservation_id,
            issued_by: borrowing.issued_by,
            issue_date: borrowing.issue_date,
            due_date: borrowing.due_date,
            return_date: borrowing.return_date,
            renewal_count: borrowing.renewal_count,
            status: borrowing.status,
            is_overdue: borrowing.is_overdue(today),
            days_overdue: borrowing.days_overdue(today),
            notes: borrowing.notes.clone(),
            created_at: borrowing.created_at,
        }
    }
}

impl BorrowResponse {
    pub fn new(borrowing: &Borrowing, origin: BorrowOrigin, today: NaiveDate) -> Self {
        Self {
            borrowing: BorrowingResponse::new(borrowing, today),
            from_reservation: origin.is_from_reservation(),
        }
    }
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            member_id: r.member_id,
            book_id: r.book_id,
            reservation_date: r.reservation_date,
            expiry_date: r.expiry_date,
            status: r.status,
            librarian_notes: r.librarian_notes,
            rejection_reason: r.rejection_reason,
            processed_by: r.processed_by,
            processed_at: r.processed_at,
            created_at: r.created_at,
        }
    }
}

// ============================================================================
// Attendance Mappers
// ============================================================================

impl From<&AttendanceRecord> for AttendanceResponse {
    fn from(record: &AttendanceRecord) -> Self {
        let state = record.state();
        Self {
            id: record.id,
            user_id: record.user_id,
            attendance_date: record.attendance_date,
            state: state.label(),
            is_present: state.is_present(),
            arrival_time: record.arrival_time.map(format_clock_time),
            departure_time: record.departure_time.map(format_clock_time),
        }
    }
}

impl DailyAttendanceEntry {
    pub fn new(member: &Member, record: Option<&AttendanceRecord>) -> Self {
        let state = AttendanceState::from_record(record);
        Self {
            member_id: member.id,
            user_code: member.user_code.clone(),
            full_name: member.full_name.clone(),
            state: state.label(),
            is_present: state.is_present(),
            arrival_time: record
                .and_then(|r| r.arrival_time)
                .map(format_clock_time),
            departure_time: record
                .and_then(|r| r.departure_time)
                .map(format_clock_time),
        }
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl From<Message> for DirectMessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            message: message.body,
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}

impl From<ConversationSummary> for ConversationResponse {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            user_id: summary.counterpart_id,
            full_name: summary.counterpart_name,
            last_message: summary.last_message.preview(PREVIEW_CHARS),
            last_message_at: summary.last_message.created_at,
            last_sender_id: summary.last_message.sender_id,
            unread_count: summary.unread_count,
        }
    }
}

impl From<ActivityLog> for ActivityResponse {
    fn from(entry: ActivityLog) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            action: entry.action,
            description: entry.description,
            created_at: entry.created_at,
        }
    }
}

//! Shared fixtures for the service tests

#![allow(dead_code)]

pub mod memory;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use lms_common::JwtService;
use lms_core::{
    Book, BookRepository, BookStatus, Clock, CoverStore, CoverUpload, DomainError, LibraryId,
    Mailer, Member, NewBook, Notification, NotificationKind, Notifier, OutgoingMail, RepoResult,
    RequestContext, UserRole, UserStatus,
};
use lms_service::{ServiceContext, ServiceSettings};
use parking_lot::Mutex;

pub use memory::MemoryDb;

pub const JWT_SECRET: &str = "service-test-secret";

/// Clock frozen at a settable instant, in UTC
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }

    fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    pub fn of_kind(&self, kind: NotificationKind) -> Vec<Notification> {
        self.sent
            .lock()
            .iter()
            .filter(|n| n.kind == kind)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> RepoResult<()> {
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().clone()
    }

    /// The 64-character token embedded in the last mail's link
    pub fn last_token(&self) -> String {
        let mail = self.sent.lock().last().cloned().unwrap();
        let start = mail.body.find("token=").unwrap() + "token=".len();
        mail.body[start..start + 64].to_string()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> RepoResult<()> {
        self.sent.lock().push(mail.clone());
        Ok(())
    }
}

/// Cover store that keeps files in a map and can be told to fail removals
#[derive(Debug, Default)]
pub struct MemoryCovers {
    files: Mutex<HashMap<String, Vec<u8>>>,
    fail_removals: Mutex<bool>,
}

impl MemoryCovers {
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn fail_removals(&self) {
        *self.fail_removals.lock() = true;
    }
}

#[async_trait]
impl CoverStore for MemoryCovers {
    async fn save(&self, book_code: &str, upload: &CoverUpload) -> RepoResult<String> {
        let mut files = self.files.lock();
        let path = format!(
            "books/{}_{}.{}",
            files.len() + 1,
            book_code,
            upload.format.extension()
        );
        files.insert(path.clone(), upload.bytes.clone());
        Ok(path)
    }

    async fn remove(&self, path: &str) -> RepoResult<()> {
        if *self.fail_removals.lock() {
            return Err(DomainError::StorageError("disk is read-only".to_string()));
        }
        self.files.lock().remove(path);
        Ok(())
    }
}

/// A library with one librarian, wired to in-memory fakes
pub struct TestEnv {
    pub db: Arc<MemoryDb>,
    pub notifier: Arc<RecordingNotifier>,
    pub mailer: Arc<RecordingMailer>,
    pub covers: Arc<MemoryCovers>,
    pub clock: Arc<FixedClock>,
    pub ctx: ServiceContext,
    pub library_id: LibraryId,
    pub librarian: RequestContext,
}

impl TestEnv {
    pub fn new() -> Self {
        let db = Arc::new(MemoryDb::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let mailer = Arc::new(RecordingMailer::default());
        let covers = Arc::new(MemoryCovers::default());
        let clock = Arc::new(FixedClock::at(
            Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap(),
        ));

        let ctx = ServiceContext::builder()
            .library_repo(db.clone())
            .category_repo(db.clone())
            .book_repo(db.clone())
            .member_repo(db.clone())
            .borrowing_repo(db.clone())
            .reservation_repo(db.clone())
            .attendance_repo(db.clone())
            .message_repo(db.clone())
            .activity_repo(db.clone())
            .notifier(notifier.clone())
            .mailer(mailer.clone())
            .covers(covers.clone())
            .jwt_service(Arc::new(JwtService::new(JWT_SECRET, 3600)))
            .clock(clock.clone())
            .settings(ServiceSettings {
                setup_base_url: "https://library.test".to_string(),
                max_cover_bytes: 1024,
                ..ServiceSettings::default()
            })
            .build()
            .unwrap();

        let library_id = db.add_library("Central");
        let librarian = db.add_user(
            library_id,
            "librarian",
            UserRole::Librarian,
            UserStatus::Active,
            "",
        );

        Self {
            db,
            notifier,
            mailer,
            covers,
            clock,
            ctx,
            library_id,
            librarian: RequestContext::new(library_id, librarian.id, UserRole::Librarian),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Move the clock to a UTC date and time
    pub fn set_time(&self, y: i32, m: u32, d: u32, h: u32, min: u32) {
        self.clock
            .set(Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap());
    }

    /// An active member account and its request context
    pub fn member(&self, username: &str) -> (Member, RequestContext) {
        let member = self.db.add_user(
            self.library_id,
            username,
            UserRole::Member,
            UserStatus::Active,
            "",
        );
        let rc = RequestContext::new(self.library_id, member.id, UserRole::Member);
        (member, rc)
    }

    pub async fn book(&self, code: &str, total_copies: i32) -> Book {
        BookRepository::create(
            self.db.as_ref(),
            &NewBook {
                library_id: self.library_id,
                book_code: code.to_string(),
                title: format!("Title {code}"),
                author_name: "Author".to_string(),
                isbn: "9780000000000".to_string(),
                category_id: None,
                total_copies,
                status: BookStatus::Active,
                cover_image: None,
            },
        )
        .await
        .unwrap()
    }
}

//! Library entity - the tenant every other record is scoped by

use chrono::{DateTime, Utc};

use crate::value_objects::LibraryId;

/// Library (tenant)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub id: LibraryId,
    pub name: String,
    /// Denormalized count of book rows, recomputed after catalog changes
    pub current_book_count: i64,
    pub created_at: DateTime<Utc>,
}

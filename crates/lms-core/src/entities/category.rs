//! Category entity

use chrono::{DateTime, Utc};

use crate::value_objects::{CategoryId, LibraryId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub library_id: LibraryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub library_id: LibraryId,
    pub name: String,
    pub description: Option<String>,
}

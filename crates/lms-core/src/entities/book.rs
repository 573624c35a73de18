//! Book entity - a catalog title with a pool of physical copies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{BookId, CategoryId, LibraryId};

/// Catalog status of a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    #[default]
    Active,
    Inactive,
    Damaged,
    Lost,
}

text_enum!(BookStatus, "book status", {
    Active => "active",
    Inactive => "inactive",
    Damaged => "damaged",
    Lost => "lost",
});

/// Book entity
///
/// `0 <= available_copies <= total_copies` holds for every value produced by
/// the methods below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub library_id: LibraryId,
    /// Library-scoped identifier printed on the spine label
    pub book_code: String,
    pub title: String,
    pub author_name: String,
    pub isbn: String,
    pub category_id: Option<CategoryId>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub status: BookStatus,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// True when the title can be lent right now
    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Active && self.available_copies > 0
    }

    /// Copies currently out on loan or held for approved reservations
    #[inline]
    pub fn copies_in_use(&self) -> i32 {
        self.total_copies - self.available_copies
    }

    /// Take one copy off the shelf (direct borrow or reservation approval)
    pub fn take_copy(&mut self) -> Result<(), DomainError> {
        if self.available_copies <= 0 {
            return Err(DomainError::NoAvailableCopies);
        }
        self.available_copies -= 1;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Put one copy back (return, or release of an approved reservation).
    /// Never exceeds `total_copies`.
    pub fn return_copy(&mut self) {
        if self.available_copies < self.total_copies {
            self.available_copies += 1;
            self.updated_at = Utc::now();
        }
    }

    /// Change the number of owned copies, shifting `available_copies` by the
    /// same delta so copies in use stay accounted for.
    pub fn set_total_copies(&mut self, total: i32) -> Result<(), DomainError> {
        if total < 1 {
            return Err(DomainError::ValidationError(
                "Total copies must be at least 1".to_string(),
            ));
        }
        let in_use = self.copies_in_use();
        if total < in_use {
            return Err(DomainError::ValidationError(format!(
                "Total copies cannot be lower than the {in_use} copies currently in use"
            )));
        }
        self.available_copies = total - in_use;
        self.total_copies = total;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Take the editable fields of `edited` onto this (freshly locked) row.
    /// The copy counter stays this row's own; only a change of
    /// `total_copies` moves it, by the same amount.
    pub fn apply_edit(&mut self, edited: &Book) -> Result<(), DomainError> {
        if edited.total_copies != self.total_copies {
            self.set_total_copies(edited.total_copies)?;
        }
        self.book_code.clone_from(&edited.book_code);
        self.title.clone_from(&edited.title);
        self.author_name.clone_from(&edited.author_name);
        self.isbn.clone_from(&edited.isbn);
        self.category_id = edited.category_id;
        self.status = edited.status;
        self.cover_image.clone_from(&edited.cover_image);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Reject the loan up front when the title is withdrawn from circulation
    pub fn ensure_lendable(&self) -> Result<(), DomainError> {
        if self.status == BookStatus::Active {
            Ok(())
        } else {
            Err(DomainError::ValidationError(format!(
                "Book is {} and cannot be lent",
                self.status
            )))
        }
    }
}

/// Data for inserting a book. `available_copies` starts equal to `total_copies`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub library_id: LibraryId,
    pub book_code: String,
    pub title: String,
    pub author_name: String,
    pub isbn: String,
    pub category_id: Option<CategoryId>,
    pub total_copies: i32,
    pub status: BookStatus,
    pub cover_image: Option<String>,
}

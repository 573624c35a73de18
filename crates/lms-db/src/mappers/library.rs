//! Library model -> entity mapper

use lms_core::{Library, LibraryId};

use crate::models::LibraryModel;

impl From<LibraryModel> for Library {
    fn from(model: LibraryModel) -> Self {
        Library {
            id: LibraryId::new(model.id),
            name: model.name,
            current_book_count: model.current_book_count,
            created_at: model.created_at,
        }
    }
}

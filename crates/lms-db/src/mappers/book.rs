//! Book model -> entity mapper

use lms_core::{Book, BookId, CategoryId, DomainError, LibraryId};

use super::parse_column;
use crate::models::BookModel;

impl TryFrom<BookModel> for Book {
    type Error = DomainError;

    fn try_from(model: BookModel) -> Result<Self, Self::Error> {
        Ok(Book {
            id: BookId::new(model.id),
            library_id: LibraryId::new(model.library_id),
            book_code: model.book_code,
            title: model.title,
            author_name: model.author_name,
            isbn: model.isbn,
            category_id: model.category_id.map(CategoryId::new),
            total_copies: model.total_copies,
            available_copies: model.available_copies,
            status: parse_column(&model.status, "books.status")?,
            cover_image: model.cover_image,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

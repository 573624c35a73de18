//! Category model -> entity mapper

use lms_core::{Category, CategoryId, LibraryId};

use crate::models::CategoryModel;

impl From<CategoryModel> for Category {
    fn from(model: CategoryModel) -> Self {
        Category {
            id: CategoryId::new(model.id),
            library_id: LibraryId::new(model.library_id),
            name: model.name,
            description: model.description,
            created_at: model.created_at,
        }
    }
}

//! User model -> member entity mapper

use lms_core::{DomainError, LibraryId, Member, UserId};

use super::parse_column;
use crate::models::UserModel;

impl TryFrom<UserModel> for Member {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        Ok(Member {
            id: UserId::new(model.id),
            library_id: LibraryId::new(model.library_id),
            user_code: model.user_code,
            username: model.username,
            email: model.email,
            full_name: model.full_name,
            phone: model.phone,
            role: parse_column(&model.role, "users.role")?,
            status: parse_column(&model.status, "users.status")?,
            profile_image: model.profile_image,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

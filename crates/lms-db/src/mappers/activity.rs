//! Activity log model -> entity mapper

use lms_core::{ActivityId, ActivityLog, LibraryId, UserId};

use crate::models::ActivityLogModel;

impl From<ActivityLogModel> for ActivityLog {
    fn from(model: ActivityLogModel) -> Self {
        ActivityLog {
            id: ActivityId::new(model.id),
            library_id: LibraryId::new(model.library_id),
            user_id: UserId::new(model.user_id),
            action: model.action,
            description: model.description,
            created_at: model.created_at,
        }
    }
}

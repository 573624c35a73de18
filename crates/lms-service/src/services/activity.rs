//! Activity log service

use lms_core::RequestContext;
use tracing::instrument;

use crate::dto::{ActivityQuery, ActivityResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Read access to the library's activity log
pub struct ActivityService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ActivityService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Most recent entries, newest first
    #[instrument(skip(self))]
    pub async fn recent(
        &self,
        rc: &RequestContext,
        query: ActivityQuery,
    ) -> ServiceResult<Vec<ActivityResponse>> {
        rc.require_staff()?;

        let entries = self
            .ctx
            .activity_repo()
            .recent(rc.library_id, query.limit())
            .await?;
        Ok(entries.into_iter().map(ActivityResponse::from).collect())
    }
}

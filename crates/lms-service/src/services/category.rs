//! Category service

use lms_core::{DomainError, NewCategory, RequestContext};
use tracing::{info, instrument};

use crate::dto::{CategoryResponse, CreateCategoryRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Category service
pub struct CategoryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CategoryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, rc: &RequestContext) -> ServiceResult<Vec<CategoryResponse>> {
        let categories = self.ctx.category_repo().list(rc.library_id).await?;
        Ok(categories.into_iter().map(CategoryResponse::from).collect())
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        rc: &RequestContext,
        request: CreateCategoryRequest,
    ) -> ServiceResult<CategoryResponse> {
        rc.require_staff()?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::ValidationError("Category name is required".to_string()).into());
        }

        let category = self
            .ctx
            .category_repo()
            .create(&NewCategory {
                library_id: rc.library_id,
                name,
                description: request
                    .description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
            })
            .await?;

        info!(category_id = %category.id, "Category created");
        self.ctx
            .log_activity(rc, "category_created", format!("Added category '{}'", category.name))
            .await;

        Ok(CategoryResponse::from(category))
    }
}

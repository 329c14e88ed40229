use contracts::domain::a001_department::aggregate::Department;

use super::repository;
use crate::shared::error::{ApiError, ApiResult};

pub async fn list_all() -> anyhow::Result<Vec<Department>> {
    repository::list_all().await
}

/// Resolve a department by its URL slug or fail with NotFound.
pub async fn resolve_by_slug(slug: &str) -> ApiResult<Department> {
    repository::get_by_slug(slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("department '{}' not found", slug)))
}
